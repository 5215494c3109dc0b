//! AST normalizer: selector text to the typed, validated [`SelectorList`].
//!
//! Runs the preprocessor, rejects gross structural errors before the grammar
//! sees the text, then converts the generic tree: escapes are decoded,
//! qualified names split, pseudo names resolved against the supported set,
//! structural rules checked and every compound put in canonical order.
//! Whatever goes wrong, the caller gets one [`InvalidSelectorError`] quoting
//! the original text.

use std::str::FromStr;

use crate::ast::{
    AttributeMatcher, AttributeOperator, AttributeSelector, CaseSensitivity, Combinator, Component,
    CompoundSelector, Direction, Identifier, KeywordPseudoClass, NamedPseudoElement,
    NamespaceConstraint, NthExpression, PseudoClass, PseudoElement, QualifiedName, Selector,
    SelectorList, SimpleSelector,
};
use crate::error::InvalidSelectorError;
use crate::escape::{is_whitespace, unescape};
use crate::grammar::{GenericNode, GenericValue, parse_grammar};
use crate::preprocess::{SelectorValue, preprocess};
use crate::sort::sort_compound;

/// Vendor prefixes accepted on pseudo-class and pseudo-element names.
const VENDOR_PREFIXES: [&str; 4] = ["-webkit-", "-moz-", "-ms-", "-o-"];

/// A selector that parsed and passed structural validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    source: String,
    list: SelectorList,
}

impl ParsedSelector {
    /// The selector text as the caller supplied it.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The normalized tree.
    #[must_use]
    pub const fn list(&self) -> &SelectorList {
        &self.list
    }

    /// Take the normalized tree.
    #[must_use]
    pub fn into_list(self) -> SelectorList {
        self.list
    }
}

/// Parse and normalize selector text.
///
/// Identifier validity is not checked here: `#123` parses, and
/// [`walk`](crate::walk::walk) rejects it.
///
/// # Errors
///
/// Returns an [`InvalidSelectorError`] carrying the original text if the
/// selector is malformed or uses an unsupported pseudo-class or pseudo-element.
pub fn parse_selector(value: impl Into<SelectorValue>) -> Result<ParsedSelector, InvalidSelectorError> {
    let value = value.into();
    let source = value.to_string();
    let text = preprocess(&value);
    let invalid = |detail: String| InvalidSelectorError::new(source.clone(), detail);

    prevalidate(&text).map_err(|detail| invalid(detail.to_string()))?;
    let generic = parse_grammar(&text).map_err(|err| invalid(err.to_string()))?;
    let list = Normalizer
        .selector_list(&generic, Context::TOP_LEVEL)
        .map_err(invalid)?;
    Ok(ParsedSelector { source, list })
}

/// Reject malformed selectors the grammar would otherwise recover from or
/// report less precisely.
fn prevalidate(text: &str) -> Result<(), &'static str> {
    let trimmed = text.trim_matches(is_whitespace);
    if trimmed.is_empty() {
        return Err("empty selector");
    }
    if trimmed.starts_with(['>', '+', '~']) {
        return Err("selector starts with a combinator");
    }
    if trimmed.ends_with(',') && !trimmed.ends_with("\\,") {
        return Err("selector ends with a comma");
    }
    if has_split_attribute_operator(trimmed) {
        return Err("whitespace inside an attribute operator");
    }
    Ok(())
}

/// Find `[a~ =b]` style operators, where whitespace separates the operator
/// character from its `=`.
fn has_split_attribute_operator(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    let mut depth = 0usize;
    let mut quote = None;
    let mut index = 0;
    while index < chars.len() {
        let c = chars[index];
        match (quote, c) {
            (_, '\\') => index += 1,
            (Some(open), c) if c == open => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '~' | '|' | '^' | '$' | '*') if depth > 0 => {
                let mut next = index + 1;
                while chars.get(next).copied().is_some_and(is_whitespace) {
                    next += 1;
                }
                if next > index + 1 && chars.get(next) == Some(&'=') {
                    return true;
                }
            }
            _ => {}
        }
        index += 1;
    }
    false
}

/// Where a selector list being converted sits.
#[derive(Debug, Clone, Copy)]
struct Context {
    /// The outermost list; pseudo-elements are allowed here.
    top_level: bool,
    /// Relative selectors (leading combinator) are allowed.
    relative: bool,
    /// Inside a `:has()` argument.
    in_has: bool,
}

impl Context {
    const TOP_LEVEL: Self = Self {
        top_level: true,
        relative: false,
        in_has: false,
    };

    const fn nested(self) -> Self {
        Self {
            top_level: false,
            relative: false,
            in_has: self.in_has,
        }
    }
}

/// Generic tree to typed AST conversion. Errors are detail strings that the
/// caller wraps with the original selector text.
#[derive(Debug, Clone, Copy)]
struct Normalizer;

impl Normalizer {
    fn selector_list(self, node: &GenericNode, context: Context) -> Result<SelectorList, String> {
        let GenericNode::SelectorList {
            selectors,
            forgiving,
        } = node
        else {
            return Err("expected a selector list".to_string());
        };
        let mut list = SelectorList::default();
        for selector in selectors {
            match self.selector(selector, context) {
                Ok(selector) => list.selectors.push(selector),
                // [§ 3.7](https://www.w3.org/TR/selectors-4/#forgiving-selector)
                // "...any items that are invalid ... are removed"
                Err(_) if *forgiving => {}
                Err(detail) => return Err(detail),
            }
        }
        Ok(list)
    }

    fn selector(self, node: &GenericNode, context: Context) -> Result<Selector, String> {
        let GenericNode::Selector { children } = node else {
            return Err("expected a selector".to_string());
        };
        let mut components = Vec::new();
        let mut compound = CompoundSelector::default();
        for child in children {
            if let GenericNode::Combinator { value } = child {
                let combinator = Combinator::from_char(*value)
                    .ok_or_else(|| format!("unknown combinator '{value}'"))?;
                if compound.simple_selectors.is_empty() {
                    if !components.is_empty() || !context.relative {
                        return Err(format!("combinator '{value}' without a left-hand selector"));
                    }
                } else {
                    components.push(Component::Compound(std::mem::take(&mut compound)));
                }
                components.push(Component::Combinator(combinator));
            } else {
                compound.simple_selectors.push(self.simple_selector(child, context)?);
            }
        }
        if compound.simple_selectors.is_empty() {
            return Err("selector ends with a combinator".to_string());
        }
        components.push(Component::Compound(compound));

        let last = components.len() - 1;
        for (index, component) in components.iter_mut().enumerate() {
            if let Component::Compound(compound) = component {
                check_pseudo_elements(compound, context.top_level && index == last)?;
                sort_compound(&mut compound.simple_selectors);
            }
        }
        Ok(Selector { components })
    }

    fn simple_selector(self, node: &GenericNode, context: Context) -> Result<SimpleSelector, String> {
        let simple = match node {
            GenericNode::Type { name } => SimpleSelector::Type(qualified_name(name)?),
            GenericNode::Id { raw } => SimpleSelector::Id(identifier(raw)),
            GenericNode::Class { raw } => SimpleSelector::Class(identifier(raw)),
            GenericNode::Attribute {
                name,
                matcher,
                value,
                flag,
            } => SimpleSelector::Attribute(attribute(name, matcher.as_deref(), value.as_ref(), flag.as_deref())?),
            GenericNode::PseudoClass { name, argument } => {
                SimpleSelector::PseudoClass(self.pseudo_class(name, argument.as_deref(), context)?)
            }
            GenericNode::PseudoElement { name, argument } => {
                SimpleSelector::PseudoElement(self.pseudo_element(name, argument.as_deref(), context)?)
            }
            other => return Err(format!("unexpected node in compound selector: {other:?}")),
        };
        Ok(simple)
    }

    fn pseudo_class(
        self,
        name: &str,
        argument: Option<&GenericNode>,
        context: Context,
    ) -> Result<PseudoClass, String> {
        let lower = unescape(name).to_ascii_lowercase();
        if is_vendor_prefixed(&lower) {
            return Ok(PseudoClass::Vendor(lower));
        }
        let nested = context.nested();
        let pseudo = match (lower.as_str(), argument) {
            ("not", Some(list)) => PseudoClass::Not(self.selector_list(list, nested)?),
            ("is", Some(list)) => PseudoClass::Is(self.selector_list(list, nested)?),
            ("where", Some(list)) => PseudoClass::Where(self.selector_list(list, nested)?),
            ("has", Some(list)) => {
                if context.in_has {
                    return Err(":has() cannot be nested inside :has()".to_string());
                }
                let relative = Context {
                    top_level: false,
                    relative: true,
                    in_has: true,
                };
                PseudoClass::Has(self.selector_list(list, relative)?)
            }
            ("nth-child", Some(nth)) => PseudoClass::NthChild(self.nth(nth, nested)?),
            ("nth-last-child", Some(nth)) => PseudoClass::NthLastChild(self.nth(nth, nested)?),
            ("nth-of-type", Some(nth)) => PseudoClass::NthOfType(self.nth(nth, nested)?),
            ("nth-last-of-type", Some(nth)) => PseudoClass::NthLastOfType(self.nth(nth, nested)?),
            ("dir", Some(GenericNode::Values { values })) => {
                let value = single_identifier(values)?;
                PseudoClass::Dir(Direction::from_str(&value).ok())
            }
            ("lang", Some(GenericNode::Values { values })) => {
                PseudoClass::Lang(values.iter().map(decode_value).collect())
            }
            ("state", Some(GenericNode::Values { values })) => {
                PseudoClass::State(single_identifier(values)?)
            }
            ("host", None) => PseudoClass::Host(None),
            ("host", Some(list)) => PseudoClass::Host(Some(self.compound_argument(list, nested, ":host()")?)),
            ("host-context", Some(list)) => {
                PseudoClass::HostContext(self.compound_argument(list, nested, ":host-context()")?)
            }
            (keyword, None) => PseudoClass::Keyword(
                KeywordPseudoClass::from_str(keyword)
                    .map_err(|_| format!("unknown pseudo-class ':{keyword}'"))?,
            ),
            (function, Some(_)) => return Err(format!("unknown or malformed pseudo-class ':{function}()'")),
        };
        Ok(pseudo)
    }

    fn pseudo_element(
        self,
        name: &str,
        argument: Option<&GenericNode>,
        context: Context,
    ) -> Result<PseudoElement, String> {
        let lower = unescape(name).to_ascii_lowercase();
        if is_vendor_prefixed(&lower) {
            return Ok(PseudoElement::Vendor(lower));
        }
        let pseudo = match (lower.as_str(), argument) {
            ("slotted", Some(list)) => {
                PseudoElement::Slotted(self.compound_argument(list, context.nested(), "::slotted()")?)
            }
            ("part", Some(GenericNode::Values { values })) => {
                PseudoElement::Part(values.iter().map(decode_value).collect())
            }
            (named, None) => PseudoElement::Named(
                NamedPseudoElement::from_str(named)
                    .map_err(|_| format!("unknown pseudo-element '::{named}'"))?,
            ),
            (function, Some(_)) => return Err(format!("unknown or malformed pseudo-element '::{function}()'")),
        };
        Ok(pseudo)
    }

    fn nth(self, node: &GenericNode, context: Context) -> Result<NthExpression, String> {
        let GenericNode::Nth { a, b, of } = node else {
            return Err("malformed An+B argument".to_string());
        };
        let of = match of {
            Some(list) => Some(self.selector_list(list, context)?),
            None => None,
        };
        Ok(NthExpression { a: *a, b: *b, of })
    }

    /// Arguments of `:host()`, `:host-context()` and `::slotted()`:
    /// exactly one compound selector.
    fn compound_argument(self, node: &GenericNode, context: Context, what: &str) -> Result<SelectorList, String> {
        let list = self.selector_list(node, context)?;
        if !list.is_single_compound() {
            return Err(format!("{what} takes exactly one compound selector"));
        }
        Ok(list)
    }
}

/// Pseudo-elements may only close the last compound of a top-level selector;
/// after one, only pseudo-classes may follow.
fn check_pseudo_elements(compound: &CompoundSelector, allowed: bool) -> Result<(), String> {
    let mut seen = false;
    for simple in &compound.simple_selectors {
        let is_pseudo_element = matches!(simple, SimpleSelector::PseudoElement(_));
        if is_pseudo_element && !allowed {
            return Err("pseudo-element not at the end of a top-level selector".to_string());
        }
        if seen && !matches!(simple, SimpleSelector::PseudoClass(_)) {
            return Err("only pseudo-classes may follow a pseudo-element".to_string());
        }
        seen |= is_pseudo_element;
    }
    Ok(())
}

fn is_vendor_prefixed(name: &str) -> bool {
    VENDOR_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

fn identifier(raw: &str) -> Identifier {
    Identifier {
        raw: raw.to_string(),
        value: unescape(raw).into_owned(),
    }
}

fn decode_value(value: &GenericValue) -> String {
    if value.quoted {
        value.text.clone()
    } else {
        unescape(&value.text).into_owned()
    }
}

fn single_identifier(values: &[GenericValue]) -> Result<String, String> {
    match values {
        [value] if !value.quoted => Ok(decode_value(value)),
        _ => Err("expected a single identifier argument".to_string()),
    }
}

/// Split a raw qualified name at its first unescaped `|`.
fn split_qualified(raw: &str) -> (Option<&str>, &str) {
    let mut escaped = false;
    for (index, c) in raw.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '|' => return (Some(&raw[..index]), &raw[index + 1..]),
            _ => {}
        }
    }
    (None, raw)
}

/// [§ 5.3](https://www.w3.org/TR/selectors-4/#type-nmsp)
///
/// `name` and `*|name` match any namespace, `|name` only the null namespace,
/// and `ns|name` the namespace bound to `ns`.
fn qualified_name(raw: &str) -> Result<QualifiedName, String> {
    let (prefix, local) = split_qualified(raw);
    if local.is_empty() {
        return Err(format!("missing local name in '{raw}'"));
    }
    let namespace = match prefix {
        None | Some("*") => NamespaceConstraint::Any,
        Some("") => NamespaceConstraint::None,
        Some(prefix) => NamespaceConstraint::Prefix(unescape(prefix).into_owned()),
    };
    Ok(QualifiedName {
        namespace,
        local_name: unescape(local).into_owned(),
    })
}

fn attribute(
    name: &str,
    operator: Option<&str>,
    value: Option<&GenericValue>,
    flag: Option<&str>,
) -> Result<AttributeSelector, String> {
    let name = qualified_name(name)?;
    if name.is_universal() {
        return Err("attribute name cannot be '*'".to_string());
    }
    let matcher = match (operator, value) {
        (None, None) => None,
        (Some(operator), Some(value)) => {
            let operator = AttributeOperator::from_str(operator)
                .map_err(|_| format!("unknown attribute operator '{operator}'"))?;
            let case = match flag.map(|flag| unescape(flag).to_ascii_lowercase()).as_deref() {
                None => CaseSensitivity::Default,
                Some("i") => CaseSensitivity::AsciiInsensitive,
                Some("s") => CaseSensitivity::Sensitive,
                Some(other) => return Err(format!("unknown attribute modifier '{other}'")),
            };
            Some(AttributeMatcher {
                operator,
                value: decode_value(value),
                case,
            })
        }
        _ => return Err("incomplete attribute selector".to_string()),
    };
    Ok(AttributeSelector { name, matcher })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prevalidate() {
        assert!(prevalidate("  ").is_err());
        assert!(prevalidate(" > a").is_err());
        assert!(prevalidate("a,").is_err());
        assert!(prevalidate("[a~ =b]").is_err());
        assert!(prevalidate(".a\\,").is_ok());
        assert!(prevalidate("[a='~ =']").is_ok());
        assert!(prevalidate("[a *= b]").is_ok());
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("svg|a"), (Some("svg"), "a"));
        assert_eq!(split_qualified("|a"), (Some(""), "a"));
        assert_eq!(split_qualified("a\\|b"), (None, "a\\|b"));
    }
}

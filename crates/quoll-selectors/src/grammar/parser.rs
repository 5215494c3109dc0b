//! Recursive-descent selector parser.
//!
//! [Selectors Level 4 § 18 Grammar](https://www.w3.org/TR/selectors-4/#grammar)
//!
//! ```text
//! <complex-selector> = <compound-selector> [ <combinator>? <compound-selector> ]*
//! <compound-selector> = [ <type-selector>? <subclass-selector>*
//!                         [ <pseudo-element-selector> <pseudo-class-selector>* ]* ]!
//! <relative-selector> = <combinator>? <complex-selector>
//! ```
//!
//! Functional pseudo-class arguments are parsed according to the function
//! name; unknown functions keep their argument as raw text. Brackets and
//! parentheses left open at the end of input are closed implicitly, as CSS
//! Syntax does.

use thiserror::Error;

use super::generic::{GenericNode, GenericValue};
use super::tokenizer::{Token, TokenKind, tokenize};
use crate::escape::unescape;
use crate::nth::parse_an_plus_b;

/// The text does not match the selector grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct GrammarError {
    /// What went wrong.
    pub message: String,
    /// Code point offset where the problem was found.
    pub offset: usize,
}

/// How a functional pseudo's argument is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgumentKind {
    SelectorList,
    ForgivingSelectorList,
    RelativeSelectorList,
    NthOf,
    Nth,
    Identifier,
    ValueList,
    IdentifierSequence,
    Raw,
}

/// Argument grammar for a functional pseudo-class, keyed by lowercase name.
fn pseudo_class_argument(name: &str) -> ArgumentKind {
    match name {
        "not" | "host" | "host-context" => ArgumentKind::SelectorList,
        "is" | "where" => ArgumentKind::ForgivingSelectorList,
        "has" => ArgumentKind::RelativeSelectorList,
        "nth-child" | "nth-last-child" => ArgumentKind::NthOf,
        "nth-of-type" | "nth-last-of-type" => ArgumentKind::Nth,
        "dir" | "state" => ArgumentKind::Identifier,
        "lang" => ArgumentKind::ValueList,
        _ => ArgumentKind::Raw,
    }
}

/// Argument grammar for a functional pseudo-element, keyed by lowercase name.
fn pseudo_element_argument(name: &str) -> ArgumentKind {
    match name {
        "slotted" => ArgumentKind::SelectorList,
        "part" => ArgumentKind::IdentifierSequence,
        _ => ArgumentKind::Raw,
    }
}

/// [§ 3.5 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-element-syntax)
///
/// "For compatibility with existing style sheets, user agents must also
/// accept the previous one-colon notation for pseudo-elements introduced in
/// CSS levels 1 and 2 (namely, :first-line, :first-letter, :before, and :after)."
fn is_legacy_pseudo_element(name: &str) -> bool {
    matches!(name, "before" | "after" | "first-line" | "first-letter")
}

/// Whether a hash body reads as a number: a digit, optionally after a `-`.
fn starts_with_number(raw: &str) -> bool {
    raw.strip_prefix('-')
        .unwrap_or(raw)
        .starts_with(|c: char| c.is_ascii_digit())
}

/// Parse preprocessed selector text into a generic selector list.
///
/// # Errors
///
/// Returns a [`GrammarError`] if the text is not a non-empty selector list.
pub fn parse_grammar(text: &str) -> Result<GenericNode, GrammarError> {
    let source: Vec<char> = text.chars().collect();
    let tokens = tokenize(&source);
    let mut parser = Parser::new(&source, &tokens);
    let selectors = parser.parse_selector_list(false)?;
    if selectors.is_empty() {
        return Err(parser.error("empty selector list"));
    }
    Ok(GenericNode::SelectorList {
        selectors,
        forgiving: false,
    })
}

struct Parser<'a> {
    source: &'a [char],
    tokens: &'a [Token],
    position: usize,
}

impl<'a> Parser<'a> {
    const fn new(source: &'a [char], tokens: &'a [Token]) -> Self {
        Self {
            source,
            tokens,
            position: 0,
        }
    }

    /// `<selector-list>` or `<relative-selector-list>`, consuming every token.
    ///
    /// An argument made only of whitespace yields an empty list.
    fn parse_selector_list(&mut self, relative: bool) -> Result<Vec<GenericNode>, GrammarError> {
        let mut selectors = Vec::new();
        let _ = self.skip_whitespace();
        if self.at_end() {
            return Ok(selectors);
        }
        loop {
            selectors.push(self.parse_complex_selector(relative)?);
            match self.peek() {
                None => return Ok(selectors),
                Some(TokenKind::Comma) => {
                    self.position += 1;
                    let _ = self.skip_whitespace();
                }
                Some(_) => return Err(self.error("unexpected token after selector")),
            }
        }
    }

    /// `<complex-selector>`, or `<relative-selector>` when `relative` is set.
    ///
    /// Stops before a comma or at the end of input, with trailing
    /// whitespace consumed.
    fn parse_complex_selector(&mut self, relative: bool) -> Result<GenericNode, GrammarError> {
        let mut children = Vec::new();
        let _ = self.skip_whitespace();
        if relative && let Some(combinator) = self.peek_combinator() {
            self.position += 1;
            children.push(GenericNode::Combinator { value: combinator });
            let _ = self.skip_whitespace();
        }
        loop {
            if self.parse_compound_selector(&mut children)? == 0 {
                return Err(self.error("expected a compound selector"));
            }
            let had_whitespace = self.skip_whitespace();
            match self.peek() {
                None | Some(TokenKind::Comma) => break,
                Some(_) => {
                    if let Some(combinator) = self.peek_combinator() {
                        self.position += 1;
                        children.push(GenericNode::Combinator { value: combinator });
                        let _ = self.skip_whitespace();
                    } else if had_whitespace {
                        children.push(GenericNode::Combinator { value: ' ' });
                    } else {
                        return Err(self.error("unexpected token in selector"));
                    }
                }
            }
        }
        Ok(GenericNode::Selector { children })
    }

    /// `<compound-selector>`, appending its simple selectors to `children`.
    /// Returns how many were appended.
    fn parse_compound_selector(
        &mut self,
        children: &mut Vec<GenericNode>,
    ) -> Result<usize, GrammarError> {
        let before = children.len();
        if let Some(name) = self.parse_qualified_name(true)? {
            children.push(GenericNode::Type { name });
        }
        loop {
            let Some(kind) = self.peek() else { break };
            let node = match kind {
                // [§ 6.7 ID selectors](https://www.w3.org/TR/selectors-4/#id-selectors)
                // A hash that is not an identifier is kept only when it is
                // number-like (`#123`, `#-1`); identifier validation rejects
                // those once decoded.
                TokenKind::Hash { raw, is_id } => {
                    if !is_id && !starts_with_number(raw) {
                        return Err(self.error("expected an identifier after '#'"));
                    }
                    let raw = raw.clone();
                    self.position += 1;
                    GenericNode::Id { raw }
                }
                // [§ 6.6 Class selectors](https://www.w3.org/TR/selectors-4/#class-html)
                TokenKind::Delim('.') => {
                    self.position += 1;
                    match self.peek() {
                        Some(TokenKind::Ident(raw)) => {
                            let raw = raw.clone();
                            self.position += 1;
                            GenericNode::Class { raw }
                        }
                        _ => return Err(self.error("expected a class name after '.'")),
                    }
                }
                // `.123` tokenizes as a number; keep it so the name is rejected
                // with the rest of the digit-only identifiers.
                TokenKind::Number { .. } => {
                    let Some(raw) = self.digit_class_name() else {
                        break;
                    };
                    self.position += 1;
                    GenericNode::Class { raw }
                }
                TokenKind::LeftBracket => {
                    self.position += 1;
                    self.parse_attribute()?
                }
                TokenKind::Colon => {
                    self.position += 1;
                    self.parse_pseudo()?
                }
                _ => break,
            };
            children.push(node);
        }
        Ok(children.len() - before)
    }

    /// `.digits` read as a number token.
    fn digit_class_name(&self) -> Option<String> {
        let token = self.tokens.get(self.position)?;
        let text = self.text(token.start, token.end);
        let digits = text.strip_prefix('.')?;
        (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .then(|| digits.to_string())
    }

    /// [§ 5.1 Type selectors](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// [§ 5.3 Namespaces in elemental selectors](https://www.w3.org/TR/selectors-4/#type-nmsp)
    ///
    /// `ns|name`, `*|name`, `|name`, `name`, and the same with `*` as the
    /// local name when `allow_universal` is set. Returns the raw qualified text.
    fn parse_qualified_name(&mut self, allow_universal: bool) -> Result<Option<String>, GrammarError> {
        let prefix = match self.peek() {
            Some(TokenKind::Ident(raw)) => Some(raw.clone()),
            Some(TokenKind::Delim('*')) => Some("*".to_string()),
            Some(TokenKind::Delim('|')) => None,
            _ => return Ok(None),
        };
        let local_after_bar = |parser: &Self, offset: usize| match parser.peek_at(offset) {
            Some(TokenKind::Ident(raw)) => Some(raw.clone()),
            Some(TokenKind::Delim('*')) if allow_universal => Some("*".to_string()),
            _ => None,
        };
        if let Some(prefix) = prefix {
            self.position += 1;
            if self.peek() == Some(&TokenKind::Delim('|'))
                && let Some(local) = local_after_bar(self, 1)
            {
                self.position += 2;
                return Ok(Some(format!("{prefix}|{local}")));
            }
            if prefix == "*" && !allow_universal {
                return Err(self.error("universal attribute name"));
            }
            return Ok(Some(prefix));
        }
        match local_after_bar(self, 1) {
            Some(local) => {
                self.position += 2;
                Ok(Some(format!("|{local}")))
            }
            None => Err(self.error("expected a name after '|'")),
        }
    }

    /// [§ 6.1 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// Called after `[`.
    fn parse_attribute(&mut self) -> Result<GenericNode, GrammarError> {
        let _ = self.skip_whitespace();
        let Some(name) = self.parse_qualified_name(false)? else {
            return Err(self.error("expected an attribute name"));
        };
        let _ = self.skip_whitespace();
        let matcher = match self.peek() {
            Some(TokenKind::Delim('=')) => {
                self.position += 1;
                Some("=".to_string())
            }
            Some(TokenKind::Delim(c @ ('~' | '|' | '^' | '$' | '*')))
                if self.peek_at(1) == Some(&TokenKind::Delim('=')) =>
            {
                let operator = format!("{c}=");
                self.position += 2;
                Some(operator)
            }
            None | Some(TokenKind::RightBracket) => None,
            Some(_) => return Err(self.error("expected an attribute matcher")),
        };
        let mut value = None;
        let mut flag = None;
        if matcher.is_some() {
            let _ = self.skip_whitespace();
            value = Some(match self.peek() {
                Some(TokenKind::Ident(raw)) => GenericValue::ident(raw.clone()),
                Some(TokenKind::String(text)) => GenericValue::string(text.clone()),
                _ => return Err(self.error("expected an attribute value")),
            });
            self.position += 1;
            let _ = self.skip_whitespace();
            if let Some(TokenKind::Ident(raw)) = self.peek() {
                flag = Some(raw.clone());
                self.position += 1;
                let _ = self.skip_whitespace();
            }
        }
        match self.peek() {
            None => {}
            Some(TokenKind::RightBracket) => self.position += 1,
            Some(_) => return Err(self.error("expected ']'")),
        }
        Ok(GenericNode::Attribute {
            name,
            matcher,
            value,
            flag,
        })
    }

    /// [§ 3.5 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    /// [§ 3.6 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
    ///
    /// Called after the first `:`.
    fn parse_pseudo(&mut self) -> Result<GenericNode, GrammarError> {
        let is_element = self.peek() == Some(&TokenKind::Colon);
        if is_element {
            self.position += 1;
        }
        let (name, functional) = match self.peek() {
            Some(TokenKind::Ident(raw)) => (raw.clone(), false),
            Some(TokenKind::Function(raw)) => (raw.clone(), true),
            _ if is_element => return Err(self.error("expected a pseudo-element name after '::'")),
            _ => return Err(self.error("expected a pseudo-class name after ':'")),
        };
        self.position += 1;
        let lower = unescape(&name).to_ascii_lowercase();
        let argument = if functional {
            let kind = if is_element {
                pseudo_element_argument(&lower)
            } else {
                pseudo_class_argument(&lower)
            };
            Some(Box::new(self.parse_function_argument(kind)?))
        } else {
            None
        };
        if is_element || (!functional && is_legacy_pseudo_element(&lower)) {
            Ok(GenericNode::PseudoElement { name, argument })
        } else {
            Ok(GenericNode::PseudoClass { name, argument })
        }
    }

    /// Parse the tokens up to the matching `)` with a sub-parser and step
    /// past the parenthesis.
    fn parse_function_argument(&mut self, kind: ArgumentKind) -> Result<GenericNode, GrammarError> {
        let close = self.matching_close();
        let mut inner = Parser::new(self.source, &self.tokens[self.position..close]);
        let offset = self.tokens.get(self.position).map_or(self.end_offset(), |t| t.start);
        self.position = (close + 1).min(self.tokens.len());
        let node = match kind {
            ArgumentKind::SelectorList => GenericNode::SelectorList {
                selectors: inner.parse_selector_list(false)?,
                forgiving: false,
            },
            ArgumentKind::RelativeSelectorList => GenericNode::SelectorList {
                selectors: inner.parse_selector_list(true)?,
                forgiving: false,
            },
            ArgumentKind::ForgivingSelectorList => GenericNode::SelectorList {
                selectors: inner.parse_forgiving_selector_list(),
                forgiving: true,
            },
            ArgumentKind::NthOf => inner.parse_nth(true, offset)?,
            ArgumentKind::Nth => inner.parse_nth(false, offset)?,
            ArgumentKind::Identifier => {
                let _ = inner.skip_whitespace();
                let Some(TokenKind::Ident(raw)) = inner.peek() else {
                    return Err(inner.error("expected an identifier argument"));
                };
                let value = GenericValue::ident(raw.clone());
                inner.position += 1;
                let _ = inner.skip_whitespace();
                inner.expect_end()?;
                GenericNode::Values {
                    values: vec![value],
                }
            }
            ArgumentKind::ValueList => GenericNode::Values {
                values: inner.parse_value_list()?,
            },
            ArgumentKind::IdentifierSequence => GenericNode::Values {
                values: inner.parse_identifier_sequence()?,
            },
            ArgumentKind::Raw => GenericNode::Raw {
                text: inner.remaining_text().trim().to_string(),
            },
        };
        Ok(node)
    }

    /// [§ 3.7 Forgiving selector lists](https://www.w3.org/TR/selectors-4/#forgiving-selector)
    ///
    /// Alternatives that fail to parse are dropped.
    fn parse_forgiving_selector_list(&mut self) -> Vec<GenericNode> {
        let mut selectors = Vec::new();
        for (start, end) in self.top_level_comma_ranges() {
            let mut piece = Parser::new(self.source, &self.tokens[start..end]);
            if let Ok(selector) = piece.parse_complex_selector(false)
                && piece.at_end()
            {
                selectors.push(selector);
            }
        }
        self.position = self.tokens.len();
        selectors
    }

    /// `An+B [of S]?`, `offset` locating the argument for error reports.
    fn parse_nth(&mut self, allow_of: bool, offset: usize) -> Result<GenericNode, GrammarError> {
        let of_index = if allow_of {
            self.tokens.iter().enumerate().position(|(index, token)| {
                index > 0
                    && self.tokens[index - 1].kind == TokenKind::Whitespace
                    && matches!(&token.kind, TokenKind::Ident(raw) if raw.eq_ignore_ascii_case("of"))
            })
        } else {
            None
        };
        let formula_end = of_index.unwrap_or(self.tokens.len());
        // Joined token by token, so comments between tokens drop out.
        let formula: String = self.tokens[..formula_end]
            .iter()
            .map(|token| self.text(token.start, token.end))
            .collect();
        let Some((a, b)) = parse_an_plus_b(&formula) else {
            return Err(GrammarError {
                message: format!("malformed An+B expression '{formula}'"),
                offset,
            });
        };
        let of = match of_index {
            Some(index) => {
                let mut inner = Parser::new(self.source, &self.tokens[index + 1..]);
                let selectors = inner.parse_selector_list(false)?;
                if selectors.is_empty() {
                    return Err(inner.error("expected a selector list after 'of'"));
                }
                Some(Box::new(GenericNode::SelectorList {
                    selectors,
                    forgiving: false,
                }))
            }
            None => None,
        };
        self.position = self.tokens.len();
        Ok(GenericNode::Nth { a, b, of })
    }

    /// Comma-separated identifiers and strings, e.g. `:lang(en, "fr-*")`.
    fn parse_value_list(&mut self) -> Result<Vec<GenericValue>, GrammarError> {
        let mut values = Vec::new();
        loop {
            let _ = self.skip_whitespace();
            let value = match self.peek() {
                Some(TokenKind::Ident(raw)) => GenericValue::ident(raw.clone()),
                Some(TokenKind::String(text)) => GenericValue::string(text.clone()),
                _ => return Err(self.error("expected an identifier or string")),
            };
            values.push(value);
            self.position += 1;
            let _ = self.skip_whitespace();
            match self.peek() {
                None => return Ok(values),
                Some(TokenKind::Comma) => self.position += 1,
                Some(_) => return Err(self.error("expected ','")),
            }
        }
    }

    /// Whitespace-separated identifiers, e.g. `::part(label active)`.
    fn parse_identifier_sequence(&mut self) -> Result<Vec<GenericValue>, GrammarError> {
        let mut values = Vec::new();
        let _ = self.skip_whitespace();
        while let Some(kind) = self.peek() {
            let TokenKind::Ident(raw) = kind else {
                return Err(self.error("expected an identifier"));
            };
            values.push(GenericValue::ident(raw.clone()));
            self.position += 1;
            let _ = self.skip_whitespace();
        }
        if values.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(values)
    }

    /// Index of the `)` closing the function whose arguments start at the
    /// current position, or the token count when it is left open.
    fn matching_close(&self) -> usize {
        let mut depth = 0usize;
        for (index, token) in self.tokens.iter().enumerate().skip(self.position) {
            match token.kind {
                TokenKind::Function(_) | TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen if depth == 0 => return index,
                TokenKind::RightParen => depth -= 1,
                _ => {}
            }
        }
        self.tokens.len()
    }

    /// Token ranges between commas that are not nested in any block.
    fn top_level_comma_ranges(&self) -> Vec<(usize, usize)> {
        let mut ranges = Vec::new();
        let mut depth = 0usize;
        let mut start = self.position;
        for (index, token) in self.tokens.iter().enumerate().skip(self.position) {
            match token.kind {
                TokenKind::Function(_) | TokenKind::LeftParen | TokenKind::LeftBracket => depth += 1,
                TokenKind::RightParen | TokenKind::RightBracket => depth = depth.saturating_sub(1),
                TokenKind::Comma if depth == 0 => {
                    ranges.push((start, index));
                    start = index + 1;
                }
                _ => {}
            }
        }
        ranges.push((start, self.tokens.len()));
        ranges
    }

    /// The combinator at the current position, if any.
    fn peek_combinator(&self) -> Option<char> {
        match self.peek()? {
            TokenKind::Delim(c @ ('>' | '+' | '~')) => Some(*c),
            _ => None,
        }
    }

    /// Skip whitespace tokens; returns true if any were skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.position;
        while self.peek() == Some(&TokenKind::Whitespace) {
            self.position += 1;
        }
        self.position > start
    }

    fn expect_end(&self) -> Result<(), GrammarError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing tokens"))
        }
    }

    fn at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'a TokenKind> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a TokenKind> {
        self.tokens.get(self.position + offset).map(|t| &t.kind)
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.source[start..end].iter().collect()
    }

    fn remaining_text(&self) -> String {
        match (self.tokens.get(self.position), self.tokens.last()) {
            (Some(first), Some(last)) => self.text(first.start, last.end),
            _ => String::new(),
        }
    }

    fn end_offset(&self) -> usize {
        self.tokens.last().map_or(0, |t| t.end)
    }

    fn error(&self, message: &str) -> GrammarError {
        GrammarError {
            message: message.to_string(),
            offset: self
                .tokens
                .get(self.position)
                .map_or(self.end_offset(), |t| t.start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector_children(text: &str) -> Vec<GenericNode> {
        match parse_grammar(text).unwrap() {
            GenericNode::SelectorList { mut selectors, .. } => match selectors.remove(0) {
                GenericNode::Selector { children } => children,
                other => panic!("expected selector, got {other:?}"),
            },
            other => panic!("expected selector list, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_compound_and_combinators() {
        let children = selector_children("ul > li.item + *");
        assert_eq!(
            children,
            vec![
                GenericNode::Type { name: "ul".into() },
                GenericNode::Combinator { value: '>' },
                GenericNode::Type { name: "li".into() },
                GenericNode::Class { raw: "item".into() },
                GenericNode::Combinator { value: '+' },
                GenericNode::Type { name: "*".into() },
            ]
        );
    }

    #[test]
    fn test_parse_namespaced_names() {
        let children = selector_children("svg|rect[xlink|href]");
        assert_eq!(children[0], GenericNode::Type { name: "svg|rect".into() });
        assert!(matches!(
            &children[1],
            GenericNode::Attribute { name, matcher: None, .. } if name == "xlink|href"
        ));
        assert_eq!(selector_children("|a")[0], GenericNode::Type { name: "|a".into() });
    }

    #[test]
    fn test_parse_attribute_dash_match_is_not_namespace() {
        let children = selector_children("[lang|=en i]");
        assert_eq!(
            children[0],
            GenericNode::Attribute {
                name: "lang".into(),
                matcher: Some("|=".into()),
                value: Some(GenericValue::ident("en")),
                flag: Some("i".into()),
            }
        );
    }

    #[test]
    fn test_parse_nth_of() {
        let children = selector_children(":nth-child(odd of .foo)");
        let GenericNode::PseudoClass { argument: Some(argument), .. } = &children[0] else {
            panic!("expected pseudo-class");
        };
        assert!(matches!(
            argument.as_ref(),
            GenericNode::Nth { a: 2, b: 1, of: Some(_) }
        ));
    }

    #[test]
    fn test_forgiving_list_drops_invalid() {
        let children = selector_children(":is(.a, $$, .b)");
        let GenericNode::PseudoClass { argument: Some(argument), .. } = &children[0] else {
            panic!("expected pseudo-class");
        };
        let GenericNode::SelectorList { selectors, forgiving } = argument.as_ref() else {
            panic!("expected selector list");
        };
        assert!(forgiving);
        assert_eq!(selectors.len(), 2);
    }

    #[test]
    fn test_legacy_pseudo_element() {
        assert!(matches!(
            &selector_children("p:before")[1],
            GenericNode::PseudoElement { name, .. } if name == "before"
        ));
    }

    #[test]
    fn test_implicit_close() {
        assert!(parse_grammar("[title=a").is_ok());
        assert!(parse_grammar(":not(.a").is_ok());
    }

    #[test]
    fn test_grammar_errors() {
        for text in ["", "foo<bar", "a >", "::", "a,", ".", "[=a]", "[a=]"] {
            assert!(parse_grammar(text).is_err(), "{text}");
        }
    }
}

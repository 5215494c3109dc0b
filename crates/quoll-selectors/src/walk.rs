//! AST analyzer: branch extraction, feature detection and identifier checks.
//!
//! One pass over the normalized tree yields the match-ready [`Selectors`]:
//! one [`Branch`] per top-level alternative plus a [`FeatureInfo`] summary
//! of the whole tree, nested arguments included.

use serde::Serialize;

use crate::ast::{
    Component, PseudoClass, PseudoElement, Selector, SelectorList, SimpleSelector,
};
use crate::error::InvalidSelectorError;
use crate::normalize::{ParsedSelector, parse_selector};
use crate::preprocess::SelectorValue;

/// Which expensive constructs occur anywhere in a selector list.
///
/// Computed once at analysis time; the matcher uses it to pick fast paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FeatureInfo {
    /// `:has()` occurs.
    pub has_has_pseudo_func: bool,
    /// `:is()`, `:not()` or `:where()` occurs.
    pub has_logical_pseudo_func: bool,
    /// Some pseudo-class or pseudo-element carries a nested selector list,
    /// including the `of S` clause of `:nth-child()`.
    pub has_nested_selector: bool,
    /// `:nth-child()` or `:nth-last-child()` has an `of S` clause.
    pub has_nth_child_of_selector: bool,
    /// `:state()` occurs.
    pub has_state_pseudo_class: bool,
}

impl FeatureInfo {
    /// True when no relational, logical or nested construct is present.
    #[must_use]
    pub const fn is_plain(&self) -> bool {
        !(self.has_has_pseudo_func
            || self.has_logical_pseudo_func
            || self.has_nested_selector
            || self.has_nth_child_of_selector
            || self.has_state_pseudo_class)
    }
}

/// One top-level alternative, flattened into compounds and combinators.
///
/// Nested selector lists stay inside their pseudo-class arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    /// Compounds and combinators, left to right.
    pub components: Vec<Component>,
}

impl Branch {
    /// Number of nodes (compounds plus combinators).
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always false for a branch produced by [`walk`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// True if the branch is a single compound with no nested selectors.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        match self.components.as_slice() {
            [Component::Compound(compound)] => compound
                .simple_selectors
                .iter()
                .all(|simple| !carries_selector_list(simple)),
            _ => false,
        }
    }
}

fn carries_selector_list(simple: &SimpleSelector) -> bool {
    match simple {
        SimpleSelector::PseudoClass(pseudo) => matches!(
            pseudo,
            PseudoClass::Not(_)
                | PseudoClass::Is(_)
                | PseudoClass::Where(_)
                | PseudoClass::Has(_)
                | PseudoClass::HostContext(_)
                | PseudoClass::Host(Some(_))
        ) || nth_of(pseudo).is_some(),
        SimpleSelector::PseudoElement(PseudoElement::Slotted(_)) => true,
        _ => false,
    }
}

/// The `of S` list of an `:nth-*()` pseudo-class.
const fn nth_of(pseudo: &PseudoClass) -> Option<&SelectorList> {
    match pseudo {
        PseudoClass::NthChild(nth)
        | PseudoClass::NthLastChild(nth)
        | PseudoClass::NthOfType(nth)
        | PseudoClass::NthLastOfType(nth) => nth.of.as_ref(),
        _ => None,
    }
}

/// An analyzed selector, ready for matching.
///
/// Immutable and `Send + Sync`; share it freely across threads and queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selectors {
    source: String,
    branches: Vec<Branch>,
    info: FeatureInfo,
}

impl Selectors {
    /// Run the whole pipeline: preprocess, parse, normalize and analyze.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidSelectorError`] carrying the original text.
    pub fn parse(value: impl Into<SelectorValue>) -> Result<Self, InvalidSelectorError> {
        walk(&parse_selector(value)?)
    }

    /// The selector text as the caller supplied it.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// One branch per top-level alternative, in source order.
    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// The feature summary.
    #[must_use]
    pub const fn info(&self) -> &FeatureInfo {
        &self.info
    }
}

/// Analyze a parsed selector.
///
/// # Errors
///
/// Returns an [`InvalidSelectorError`] if an id or class name, anywhere in
/// the tree, is made only of digits once decoded (an optional leading `-`
/// aside). The detail names the offending token as written.
pub fn walk(parsed: &ParsedSelector) -> Result<Selectors, InvalidSelectorError> {
    let mut walker = Walker {
        source: parsed.source(),
        info: FeatureInfo::default(),
    };
    let mut branches = Vec::with_capacity(parsed.list().len());
    for selector in &parsed.list().selectors {
        walker.selector(selector)?;
        branches.push(Branch {
            components: selector.components.clone(),
        });
    }
    Ok(Selectors {
        source: parsed.source().to_string(),
        branches,
        info: walker.info,
    })
}

struct Walker<'a> {
    source: &'a str,
    info: FeatureInfo,
}

impl Walker<'_> {
    fn list(&mut self, list: &SelectorList) -> Result<(), InvalidSelectorError> {
        self.info.has_nested_selector = true;
        for selector in &list.selectors {
            self.selector(selector)?;
        }
        Ok(())
    }

    fn selector(&mut self, selector: &Selector) -> Result<(), InvalidSelectorError> {
        for compound in selector.compounds() {
            for simple in &compound.simple_selectors {
                self.simple(simple)?;
            }
        }
        Ok(())
    }

    fn simple(&mut self, simple: &SimpleSelector) -> Result<(), InvalidSelectorError> {
        match simple {
            SimpleSelector::Id(id) => self.check_identifier('#', &id.raw, &id.value),
            SimpleSelector::Class(class) => self.check_identifier('.', &class.raw, &class.value),
            SimpleSelector::PseudoClass(pseudo) => self.pseudo_class(pseudo),
            SimpleSelector::PseudoElement(PseudoElement::Slotted(list)) => self.list(list),
            SimpleSelector::Type(_)
            | SimpleSelector::Attribute(_)
            | SimpleSelector::PseudoElement(_) => Ok(()),
        }
    }

    fn pseudo_class(&mut self, pseudo: &PseudoClass) -> Result<(), InvalidSelectorError> {
        match pseudo {
            PseudoClass::Not(list) | PseudoClass::Is(list) | PseudoClass::Where(list) => {
                self.info.has_logical_pseudo_func = true;
                self.list(list)
            }
            PseudoClass::Has(list) => {
                self.info.has_has_pseudo_func = true;
                self.list(list)
            }
            PseudoClass::NthChild(nth) | PseudoClass::NthLastChild(nth) => match &nth.of {
                Some(list) => {
                    self.info.has_nth_child_of_selector = true;
                    self.list(list)
                }
                None => Ok(()),
            },
            PseudoClass::Host(Some(list)) | PseudoClass::HostContext(list) => self.list(list),
            PseudoClass::State(_) => {
                self.info.has_state_pseudo_class = true;
                Ok(())
            }
            PseudoClass::NthOfType(_)
            | PseudoClass::NthLastOfType(_)
            | PseudoClass::Dir(_)
            | PseudoClass::Lang(_)
            | PseudoClass::Host(None)
            | PseudoClass::Keyword(_)
            | PseudoClass::Vendor(_) => Ok(()),
        }
    }

    /// [§ 4.3.11](https://www.w3.org/TR/css-syntax-3/#consume-name): an
    /// identifier cannot start with a digit, even if a permissive tokenizer
    /// produced one.
    fn check_identifier(&self, sigil: char, raw: &str, value: &str) -> Result<(), InvalidSelectorError> {
        let digits = value.strip_prefix('-').unwrap_or(value);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidSelectorError::new(
                self.source,
                format!("'{sigil}{raw}' is not a valid identifier"),
            ));
        }
        Ok(())
    }
}

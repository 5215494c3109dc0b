//! CSS selector parsing, analysis and matching against host trees.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector parsing** ([Selectors Level 4 § 18 Grammar](https://www.w3.org/TR/selectors-4/#grammar))
//!   - Input preprocessing per [CSS Syntax § 3.3](https://www.w3.org/TR/css-syntax-3/#input-preprocessing)
//!   - Lazy escape decoding per [CSS Syntax § 4.3.7](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
//!   - Normalization into a closed syntax tree, with canonical compound order
//!
//! - **Selector analysis**
//!   - Branch extraction and feature detection (`:has()`, logical pseudo-classes,
//!     nested selector lists, `:nth-child(... of S)`, `:state()`)
//!   - Identifier validation
//!
//! - **Matching** ([§ 3.3 Evaluating a selector](https://www.w3.org/TR/selectors-4/#evaluating-selectors))
//!   - Type, universal, id, class and attribute selectors with namespaces
//!   - All four combinators, relative selectors in `:has()`
//!   - Logical, structural, linguistic, link, input and focus pseudo-classes
//!   - Shadow tree context: `:host`, `:host()`, `:host-context()`, `::slotted()`, `::part()`
//!
//! - **Query operations** ([DOM § 4.2.6](https://dom.spec.whatwg.org/#scope-match-a-selectors-string))
//!   - `matches`, `closest`, first match and all matches, over any tree that
//!     implements [`TreeAdapter`]
//!
//! # Not Implemented
//!
//! - Specificity and the cascade
//! - User-action and history states (`:hover`, `:visited`, ...), which parse
//!   but never match a static tree

/// Host tree capability and the default resolvers.
pub mod adapter;
/// The normalized selector syntax tree.
pub mod ast;
/// Error types.
pub mod error;
/// Escape decoding and identifier serialization.
pub mod escape;
/// Selector text to generic syntax tree.
pub mod grammar;
/// Selector text to normalized tree.
pub mod normalize;
/// `An+B` microsyntax.
pub mod nth;
/// Input preprocessing.
pub mod preprocess;
/// Query operations.
pub mod query;
/// Canonical order of simple selectors within a compound.
pub mod sort;
/// Branch extraction and feature detection.
pub mod walk;

mod matcher;

// Re-exports for convenience
pub use adapter::{AttrRef, NodeKind, TreeAdapter, first_strong_direction, resolve_direction, resolve_language};
pub use ast::{
    AttributeMatcher, AttributeOperator, AttributeSelector, CaseSensitivity, Combinator, Component,
    CompoundSelector, Direction, Identifier, KeywordPseudoClass, NamedPseudoElement, NamespaceConstraint,
    NthExpression, PseudoClass, PseudoElement, QualifiedName, Selector, SelectorList, SimpleSelector,
};
pub use error::{Error, HostError, InvalidSelectorError, Result};
pub use escape::{escape_ident, unescape};
pub use grammar::{GenericNode, GrammarError, parse_grammar};
pub use normalize::{ParsedSelector, parse_selector};
pub use nth::parse_an_plus_b;
pub use preprocess::{SelectorValue, preprocess};
pub use query::{AllMatches, Query, QueryOptions, closest, matches, query_selector, query_selector_all};
pub use sort::{priority, sort_compound};
pub use walk::{Branch, FeatureInfo, Selectors, walk};

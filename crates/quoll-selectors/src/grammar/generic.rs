//! Generic selector syntax tree produced by the grammar parser.
//!
//! The tree mirrors the source closely: identifiers are raw (escapes intact),
//! qualified names are unsplit, and a selector is a flat run of simple
//! selectors and combinators. The normalizer turns it into the typed AST.

/// A node of the generic selector syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum GenericNode {
    /// Comma-separated selectors.
    SelectorList {
        /// The alternatives, each a [`GenericNode::Selector`].
        selectors: Vec<GenericNode>,
        /// Set for `:is()`/`:where()` arguments, from which unparsable
        /// alternatives have already been dropped.
        forgiving: bool,
    },
    /// Simple selectors and combinators in source order.
    Selector {
        /// Flat child list.
        children: Vec<GenericNode>,
    },
    /// Type or universal selector, e.g. `div`, `*`, `svg|rect`, `|a`.
    Type {
        /// Raw qualified name.
        name: String,
    },
    /// `#name`
    Id {
        /// Raw name without the `#`.
        raw: String,
    },
    /// `.name`
    Class {
        /// Raw name without the `.`.
        raw: String,
    },
    /// `[name]` or `[name op value flag]`
    Attribute {
        /// Raw qualified name.
        name: String,
        /// Operator text such as `=` or `~=`.
        matcher: Option<String>,
        /// Value, when an operator is present.
        value: Option<GenericValue>,
        /// Raw modifier identifier (`i`, `s`).
        flag: Option<String>,
    },
    /// `:name` or `:name(argument)`
    PseudoClass {
        /// Raw name.
        name: String,
        /// Parsed argument for functional notation.
        argument: Option<Box<GenericNode>>,
    },
    /// `::name` or `::name(argument)`, and the legacy single-colon forms.
    PseudoElement {
        /// Raw name.
        name: String,
        /// Parsed argument for functional notation.
        argument: Option<Box<GenericNode>>,
    },
    /// One of ` `, `>`, `+`, `~`.
    Combinator {
        /// The combinator character; a space for the descendant combinator.
        value: char,
    },
    /// `An+B [of S]`
    Nth {
        /// Step.
        a: i64,
        /// Offset.
        b: i64,
        /// The `of S` selector list.
        of: Option<Box<GenericNode>>,
    },
    /// Identifiers or strings, e.g. the arguments of `:lang()`.
    Values {
        /// The values in order.
        values: Vec<GenericValue>,
    },
    /// Unparsed argument text.
    Raw {
        /// Source text between the parentheses.
        text: String,
    },
}

/// An identifier or string argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericValue {
    /// Raw identifier text, or the decoded contents of a string.
    pub text: String,
    /// True for strings.
    pub quoted: bool,
}

impl GenericValue {
    /// Identifier value.
    pub fn ident(raw: impl Into<String>) -> Self {
        Self {
            text: raw.into(),
            quoted: false,
        }
    }

    /// String value.
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            text: value.into(),
            quoted: true,
        }
    }
}

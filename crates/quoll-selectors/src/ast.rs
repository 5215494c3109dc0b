//! The normalized selector syntax tree.
//!
//! Built once by [`parse_selector`](crate::parse_selector) and never mutated
//! afterwards; matching only reads it. Names are already escape-decoded and
//! split into namespace and local parts, pseudo-class names are resolved to
//! closed enumerations, and every compound is in canonical order.

use serde::Serialize;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
///
/// "A comma-separated list of selectors represents the union of all elements
/// selected by each of the individual selectors in the selector list."
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SelectorList {
    /// The alternatives, in source order.
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    /// True for the argument-less form such as `:is()`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Number of alternatives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// True if this list has exactly one alternative made of one compound.
    #[must_use]
    pub fn is_single_compound(&self) -> bool {
        matches!(self.selectors.as_slice(), [selector] if selector.compound_count() == 1 && !selector.is_relative())
    }
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// "A complex selector is a sequence of one or more compound selectors
/// separated by combinators."
///
/// Stored flat, alternating compounds and combinators. A relative selector
/// (inside `:has()`) may start with a combinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selector {
    /// Compounds and combinators, left to right.
    pub components: Vec<Component>,
}

impl Selector {
    /// True if the selector starts with a combinator.
    #[must_use]
    pub fn is_relative(&self) -> bool {
        matches!(self.components.first(), Some(Component::Combinator(_)))
    }

    /// Number of compound selectors.
    #[must_use]
    pub fn compound_count(&self) -> usize {
        self.components
            .iter()
            .filter(|c| matches!(c, Component::Compound(_)))
            .count()
    }

    /// The compound selectors, left to right.
    pub fn compounds(&self) -> impl Iterator<Item = &CompoundSelector> {
        self.components.iter().filter_map(|component| match component {
            Component::Compound(compound) => Some(compound),
            Component::Combinator(_) => None,
        })
    }
}

/// One element of a [`Selector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    /// A compound selector.
    Compound(CompoundSelector),
    /// A combinator relating the compounds on either side.
    Combinator(Combinator),
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CompoundSelector {
    /// The simple selectors, in canonical match order.
    pub simple_selectors: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// The pseudo-element this compound targets, if any.
    #[must_use]
    pub fn pseudo_element(&self) -> Option<&PseudoElement> {
        self.simple_selectors.iter().find_map(|simple| match simple {
            SimpleSelector::PseudoElement(pseudo) => Some(pseudo),
            _ => None,
        })
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
pub enum Combinator {
    /// [§ 16.1](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// "A selector of the form 'A B' represents an element B that is an
    /// arbitrary descendant of some ancestor element A."
    #[strum(serialize = " ")]
    Descendant,
    /// [§ 16.2](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// "A selector of the form 'A > B' represents an element B that is a
    /// child of some element A."
    #[strum(serialize = ">")]
    Child,
    /// [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    /// "The elements represented by the two compound selectors share the same
    /// parent in the document tree and the element represented by the first
    /// compound selector immediately precedes the element represented by the
    /// second one."
    #[strum(serialize = "+")]
    NextSibling,
    /// [§ 16.4](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// "The elements represented by the two compound selectors share the same
    /// parent in the document tree and the element represented by the first
    /// compound selector precedes (not necessarily immediately) the element
    /// represented by the second one."
    #[strum(serialize = "~")]
    SubsequentSibling,
}

impl Combinator {
    /// Map a combinator character from the grammar.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            ' ' => Some(Self::Descendant),
            '>' => Some(Self::Child),
            '+' => Some(Self::NextSibling),
            '~' => Some(Self::SubsequentSibling),
            _ => None,
        }
    }
}

/// [§ 5.3 Namespaces in elemental selectors](https://www.w3.org/TR/selectors-4/#type-nmsp)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamespaceConstraint {
    /// `*|name`, or no `|` at all: any namespace.
    Any,
    /// `|name`: only elements or attributes without a namespace.
    None,
    /// `ns|name`: the namespace bound to the prefix.
    Prefix(String),
}

/// A namespace constraint plus a local name; `*` as the local name matches any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualifiedName {
    /// The namespace part.
    pub namespace: NamespaceConstraint,
    /// The decoded local name.
    pub local_name: String,
}

impl QualifiedName {
    /// True for `*`, `ns|*` and friends.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.local_name == "*"
    }
}

/// An identifier as written and as decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    /// Source text, escapes intact.
    pub raw: String,
    /// Escape-decoded value.
    pub value: String,
}

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors),
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
/// and pseudo-classes/elements.
///
/// A single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// or [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#the-universal-selector).
    ///
    /// Examples: `div`, `*`, `svg|circle`, `|p`
    Type(QualifiedName),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Example: `#main`
    Id(Identifier),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Example: `.highlight`
    Class(Identifier),

    /// [§ 6.1 Attribute presence and value selectors](https://www.w3.org/TR/selectors-4/#attribute-representation)
    ///
    /// Examples: `[href]`, `[type=text i]`, `[xlink|href^="#"]`
    Attribute(AttributeSelector),

    /// [§ 3.5 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    PseudoClass(PseudoClass),

    /// [§ 3.6 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
    PseudoElement(PseudoElement),
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSelector {
    /// The attribute's qualified name.
    pub name: QualifiedName,
    /// The value condition; `None` tests presence only.
    pub matcher: Option<AttributeMatcher>,
}

/// Operator, value and case flag of an attribute selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeMatcher {
    /// The operator.
    pub operator: AttributeOperator,
    /// The decoded value to compare against.
    pub value: String,
    /// The `i`/`s` modifier.
    pub case: CaseSensitivity,
}

/// [§ 6.1](https://www.w3.org/TR/selectors-4/#attribute-representation) and
/// [§ 6.2](https://www.w3.org/TR/selectors-4/#attribute-substrings) operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeOperator {
    /// `[att=val]`: "exactly 'val'"
    #[strum(serialize = "=")]
    Equals,
    /// `[att~=val]`: "a whitespace-separated list of words, one of which is exactly 'val'"
    #[strum(serialize = "~=")]
    Includes,
    /// `[att|=val]`: "either being exactly 'val' or beginning with 'val'
    /// immediately followed by '-'"
    #[strum(serialize = "|=")]
    DashMatch,
    /// `[att^=val]`: "begins with the prefix 'val'"
    #[strum(serialize = "^=")]
    Prefix,
    /// `[att$=val]`: "ends with the suffix 'val'"
    #[strum(serialize = "$=")]
    Suffix,
    /// `[att*=val]`: "contains at least one instance of the substring 'val'"
    #[strum(serialize = "*=")]
    Substring,
}

/// [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseSensitivity {
    /// No modifier: document language rules apply.
    #[default]
    Default,
    /// `i`: ASCII case-insensitive.
    AsciiInsensitive,
    /// `s`: case-sensitive even where the document language says otherwise.
    Sensitive,
}

/// [§ 7.1 The directionality pseudo-class](https://www.w3.org/TR/selectors-4/#the-dir-pseudo)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    /// Left to right.
    Ltr,
    /// Right to left.
    Rtl,
}

/// `An+B [of S]` from `:nth-child()` and friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NthExpression {
    /// Step.
    pub a: i64,
    /// Offset.
    pub b: i64,
    /// Restricts which siblings are counted.
    pub of: Option<SelectorList>,
}

impl NthExpression {
    /// True if the 1-based `position` is `an+b` for some `n >= 0`.
    #[must_use]
    pub const fn matches_position(&self, position: i64) -> bool {
        crate::nth::nth_matches(self.a, self.b, position)
    }
}

/// Pseudo-classes, each variant carrying its parsed argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PseudoClass {
    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    /// "represents an element that is not represented by its argument"
    Not(SelectorList),
    /// [§ 4.2 :is()](https://www.w3.org/TR/selectors-4/#matches)
    /// "represents an element that is represented by its argument"
    Is(SelectorList),
    /// [§ 4.4 :where()](https://www.w3.org/TR/selectors-4/#zero-matches)
    /// Same as `:is()` with zero specificity.
    Where(SelectorList),
    /// [§ 4.5 :has()](https://www.w3.org/TR/selectors-4/#relational)
    /// "represents an element if any of the relative selectors ... would match
    /// at least one element when anchored against this element"
    Has(SelectorList),
    /// [§ 14.1 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    NthChild(NthExpression),
    /// [§ 14.2 :nth-last-child()](https://www.w3.org/TR/selectors-4/#the-nth-last-child-pseudo)
    NthLastChild(NthExpression),
    /// [§ 14.6 :nth-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-of-type-pseudo)
    NthOfType(NthExpression),
    /// [§ 14.7 :nth-last-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-last-of-type-pseudo)
    NthLastOfType(NthExpression),
    /// [§ 7.1 :dir()](https://www.w3.org/TR/selectors-4/#the-dir-pseudo)
    /// `None` for `auto` and unknown values, which never match.
    Dir(Option<Direction>),
    /// [§ 7.2 :lang()](https://www.w3.org/TR/selectors-4/#the-lang-pseudo)
    /// Decoded language ranges.
    Lang(Vec<String>),
    /// [CSS Custom State § :state()](https://html.spec.whatwg.org/multipage/custom-elements.html#custom-state-pseudo-class)
    State(String),
    /// [CSS Scoping § 3.2.1 :host](https://drafts.csswg.org/css-scoping/#host-selector)
    /// Bare `:host`, or `:host(<compound-selector>)`.
    Host(Option<SelectorList>),
    /// [CSS Scoping § 3.2.1 :host-context()](https://drafts.csswg.org/css-scoping/#host-selector)
    HostContext(SelectorList),
    /// A pseudo-class without arguments.
    Keyword(KeywordPseudoClass),
    /// A vendor-prefixed pseudo-class, accepted but never matching.
    Vendor(String),
}

/// Pseudo-classes without arguments.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum KeywordPseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    Root,
    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    Empty,
    /// [§ 8.2 :scope](https://www.w3.org/TR/selectors-4/#the-scope-pseudo)
    Scope,
    /// [§ 14.3.3 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,
    /// [§ 14.3.4 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,
    /// [§ 14.3.5 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,
    /// [§ 14.4.3 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,
    /// [§ 14.4.4 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,
    /// [§ 14.4.5 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    OnlyOfType,
    /// [§ 13.1 :defined](https://www.w3.org/TR/selectors-4/#the-defined-pseudo)
    Defined,
    /// [§ 8.1 :link](https://www.w3.org/TR/selectors-4/#link)
    Link,
    /// [§ 8.1 :any-link](https://www.w3.org/TR/selectors-4/#the-any-link-pseudo)
    AnyLink,
    /// [§ 13.3.2 :checked](https://www.w3.org/TR/selectors-4/#checked)
    Checked,
    /// [§ 13.1.2 :disabled](https://www.w3.org/TR/selectors-4/#disabled-pseudo)
    Disabled,
    /// [§ 13.1.1 :enabled](https://www.w3.org/TR/selectors-4/#enabled-pseudo)
    Enabled,
    /// [§ 13.4.4 :required](https://www.w3.org/TR/selectors-4/#required-pseudo)
    Required,
    /// [§ 13.4.4 :optional](https://www.w3.org/TR/selectors-4/#optional-pseudo)
    Optional,
    /// [§ 13.2.1 :read-only](https://www.w3.org/TR/selectors-4/#read-only-pseudo)
    ReadOnly,
    /// [§ 13.2.1 :read-write](https://www.w3.org/TR/selectors-4/#read-write-pseudo)
    ReadWrite,
    /// [§ 13.2.2 :placeholder-shown](https://www.w3.org/TR/selectors-4/#placeholder)
    PlaceholderShown,
    /// [§ 13.3.4 :indeterminate](https://www.w3.org/TR/selectors-4/#indeterminate)
    Indeterminate,
    /// [§ 8.3 :target](https://www.w3.org/TR/selectors-4/#the-target-pseudo)
    Target,
    /// [§ 9.2 :focus](https://www.w3.org/TR/selectors-4/#focus-pseudo)
    Focus,
    /// [§ 9.3 :focus-visible](https://www.w3.org/TR/selectors-4/#the-focus-visible-pseudo)
    FocusVisible,
    /// [§ 9.4 :focus-within](https://www.w3.org/TR/selectors-4/#the-focus-within-pseudo)
    FocusWithin,
    /// [§ 9.1 :hover](https://www.w3.org/TR/selectors-4/#the-hover-pseudo)
    Hover,
    /// [§ 9.2 :active](https://www.w3.org/TR/selectors-4/#the-active-pseudo)
    Active,
    /// [§ 8.1 :visited](https://www.w3.org/TR/selectors-4/#link)
    Visited,
    /// [§ 8.2 :local-link](https://www.w3.org/TR/selectors-4/#the-local-link-pseudo)
    LocalLink,
    /// [§ 8.4 :target-within](https://www.w3.org/TR/selectors-4/#the-target-within-pseudo)
    TargetWithin,
    /// [§ 12.1 :current](https://www.w3.org/TR/selectors-4/#the-current-pseudo)
    Current,
    /// [§ 12.2 :past](https://www.w3.org/TR/selectors-4/#the-past-pseudo)
    Past,
    /// [§ 12.3 :future](https://www.w3.org/TR/selectors-4/#the-future-pseudo)
    Future,
    /// [§ 11.1 :playing](https://www.w3.org/TR/selectors-4/#video-state)
    Playing,
    /// [§ 11.1 :paused](https://www.w3.org/TR/selectors-4/#video-state)
    Paused,
    /// [§ 13.3.3 :default](https://www.w3.org/TR/selectors-4/#the-default-pseudo)
    Default,
    /// [§ 13.4.1 :valid](https://www.w3.org/TR/selectors-4/#validity-pseudos)
    Valid,
    /// [§ 13.4.1 :invalid](https://www.w3.org/TR/selectors-4/#validity-pseudos)
    Invalid,
    /// [§ 13.4.2 :in-range](https://www.w3.org/TR/selectors-4/#range-pseudos)
    InRange,
    /// [§ 13.4.2 :out-of-range](https://www.w3.org/TR/selectors-4/#range-pseudos)
    OutOfRange,
    /// [§ 13.4.5 :user-valid](https://www.w3.org/TR/selectors-4/#user-pseudos)
    UserValid,
    /// [§ 13.4.5 :user-invalid](https://www.w3.org/TR/selectors-4/#user-pseudos)
    UserInvalid,
    /// [§ 13.2.3 :autofill](https://www.w3.org/TR/selectors-4/#autofill)
    Autofill,
    /// [§ 13.4.3 :blank](https://www.w3.org/TR/selectors-4/#blank)
    Blank,
    /// [Fullscreen § :fullscreen](https://fullscreen.spec.whatwg.org/#:fullscreen-pseudo-class)
    Fullscreen,
    /// [HTML § :modal](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-modal)
    Modal,
    /// [HTML § :popover-open](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-popover-open)
    PopoverOpen,
}

impl KeywordPseudoClass {
    /// Pseudo-classes that depend on user interaction, history, media
    /// playback or form validation state a static tree cannot provide.
    /// They are accepted but never match.
    #[must_use]
    pub const fn never_matches(self) -> bool {
        matches!(
            self,
            Self::Hover
                | Self::Active
                | Self::Visited
                | Self::LocalLink
                | Self::TargetWithin
                | Self::Current
                | Self::Past
                | Self::Future
                | Self::Playing
                | Self::Paused
                | Self::Default
                | Self::Valid
                | Self::Invalid
                | Self::InRange
                | Self::OutOfRange
                | Self::UserValid
                | Self::UserInvalid
                | Self::Autofill
                | Self::Blank
                | Self::Fullscreen
                | Self::Modal
                | Self::PopoverOpen
        )
    }
}

/// Pseudo-elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PseudoElement {
    /// [CSS Scoping § 3.2.2 ::slotted()](https://drafts.csswg.org/css-scoping/#slotted-pseudo)
    Slotted(SelectorList),
    /// [CSS Shadow Parts § ::part()](https://drafts.csswg.org/css-shadow-parts/#part)
    Part(Vec<String>),
    /// A pseudo-element without arguments.
    Named(NamedPseudoElement),
    /// A vendor-prefixed pseudo-element, accepted but never matching.
    Vendor(String),
}

/// Pseudo-elements without arguments.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum NamedPseudoElement {
    /// `::before`
    Before,
    /// `::after`
    After,
    /// `::first-line`
    FirstLine,
    /// `::first-letter`
    FirstLetter,
    /// `::marker`
    Marker,
    /// `::placeholder`
    Placeholder,
    /// `::selection`
    Selection,
    /// `::backdrop`
    Backdrop,
    /// `::file-selector-button`
    FileSelectorButton,
    /// `::target-text`
    TargetText,
    /// `::spelling-error`
    SpellingError,
    /// `::grammar-error`
    GrammarError,
    /// `::cue`
    Cue,
}

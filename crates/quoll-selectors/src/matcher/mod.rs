//! The matching engine.
//!
//! [§ 3.3 Evaluating a selector](https://www.w3.org/TR/selectors-4/#evaluating-selectors)
//!
//! Each branch is evaluated right to left. The rightmost compound must match
//! the candidate itself; every combinator to its left names the node (or, for
//! the descendant and subsequent-sibling combinators, the nodes, tried nearest
//! first) that the next compound must match. Nested selector lists inside
//! pseudo-classes are evaluated by plain recursion, so the recursion depth is
//! bounded by selector nesting, and only the ancestor and sibling walks
//! depend on the size of the tree.
//!
//! A [`Matcher`] is built per query. It carries the adapter, the query
//! options and the shadow-tree context:
//! when the query is scoped to a shadow root, the parent of each top-level
//! shadow element is that root's host, which is *featureless*: only `:host`,
//! `:host-context()` and the logical pseudo-classes can match it.

mod axis;
mod dom_state;
mod pseudo;
mod simple;
mod structural;

#[cfg(feature = "match-trace")]
use std::cell::Cell;

use quoll_common::warn_once;

pub(crate) use axis::Descendants;

use crate::adapter::{NodeKind, TreeAdapter};
use crate::ast::{Combinator, Component, CompoundSelector, NamedPseudoElement, SelectorList, SimpleSelector};
use crate::error::{Error, InvalidSelectorError, Result};
use crate::query::QueryOptions;
use crate::walk::Branch;

#[cfg(feature = "match-trace")]
thread_local! {
    static MATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Component tag for diagnostics.
const COMPONENT: &str = "selectors";

/// Outcome of matching the part of a complex selector left of a node.
///
/// The failure kinds tell the enclosing combinator walk how far to back off.
/// For `d1 d2 a`, when no ancestor matches `d1`, no higher candidate for `d2`
/// can do better, so matching stops ([`NotMatchedGlobally`]). When a sibling
/// chain such as `b1 + b2 ~` cannot find its element, only the closest
/// descendant combinator to its right may try another ancestor
/// ([`NotMatchedAndRestartFromClosestDescendant`]). A compound that simply
/// fails on the element lets the closest subsequent-sibling combinator try
/// the next sibling ([`NotMatchedAndRestartFromClosestLaterSibling`]).
///
/// [`NotMatchedGlobally`]: SelectorMatchingResult::NotMatchedGlobally
/// [`NotMatchedAndRestartFromClosestDescendant`]: SelectorMatchingResult::NotMatchedAndRestartFromClosestDescendant
/// [`NotMatchedAndRestartFromClosestLaterSibling`]: SelectorMatchingResult::NotMatchedAndRestartFromClosestLaterSibling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectorMatchingResult {
    Matched,
    NotMatchedAndRestartFromClosestLaterSibling,
    NotMatchedAndRestartFromClosestDescendant,
    NotMatchedGlobally,
}

impl SelectorMatchingResult {
    const fn from_matched(matched: bool) -> Self {
        if matched {
            Self::Matched
        } else {
            Self::NotMatchedAndRestartFromClosestLaterSibling
        }
    }
}

/// Evaluates selectors against one host tree for one query.
pub(crate) struct Matcher<'q, A: TreeAdapter> {
    adapter: &'q A,
    options: &'q QueryOptions<A::Handle>,
    /// Selector text, for errors raised while matching.
    source: &'q str,
    /// The `:scope` element, or the scoping root.
    scope: Option<A::Handle>,
    /// Host of the shadow root the query is scoped to.
    shadow_host: Option<A::Handle>,
    /// Pseudo-element a boolean query targets; always `None` during traversal.
    pseudo_target: Option<NamedPseudoElement>,
}

impl<A: TreeAdapter> Clone for Matcher<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: TreeAdapter> Copy for Matcher<'_, A> {}

impl<'q, A: TreeAdapter> Matcher<'q, A> {
    /// Build a matcher. `default_scope` is used when the options name no
    /// scope; `traversal` disables pseudo-element targeting.
    pub(crate) fn new(
        adapter: &'q A,
        options: &'q QueryOptions<A::Handle>,
        source: &'q str,
        default_scope: Option<A::Handle>,
        traversal: bool,
    ) -> Self {
        let scope = options.scope.or(default_scope);
        let shadow_host = scope
            .filter(|&scope| adapter.node_kind(scope) == NodeKind::ShadowRoot)
            .and_then(|root| adapter.shadow_host(root));
        Self {
            adapter,
            options,
            source,
            scope,
            shadow_host,
            pseudo_target: if traversal { None } else { options.pseudo_element },
        }
    }

    /// A copy that matches in the host's own tree: no featureless host, no
    /// shadow parent mapping. Used for the arguments of `:host()` and
    /// `:host-context()`.
    const fn light(self) -> Self {
        Self {
            shadow_host: None,
            ..self
        }
    }

    /// True if `node` satisfies any branch.
    pub(crate) fn matches_branches(&self, branches: &[Branch], node: A::Handle) -> Result<bool> {
        if self.adapter.node_kind(node) != NodeKind::Element {
            return Ok(false);
        }
        for branch in branches {
            if self.match_complex(&branch.components, node, None)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Fast path for a branch that is one compound without nested lists.
    pub(crate) fn matches_simple_branch(&self, branch: &Branch, node: A::Handle) -> Result<bool> {
        match branch.components.as_slice() {
            [Component::Compound(compound)] => Ok(self.match_compound(compound, node)?.is_some()),
            components => self.match_complex(components, node, None),
        }
    }

    /// The parent element `closest` steps to, with the shadow mapping applied.
    pub(crate) fn parent_of(&self, node: A::Handle) -> Option<A::Handle> {
        self.parent_element(node)
    }

    /// True if `node` matches any selector of a nested list.
    fn match_list(&self, list: &SelectorList, node: A::Handle) -> Result<bool> {
        #[cfg(feature = "match-trace")]
        let _trace = TraceScope::enter(list, node);

        for selector in &list.selectors {
            if self.match_complex(&selector.components, node, None)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Right-to-left evaluation of `components` with `node` as the subject of
    /// the rightmost compound.
    ///
    /// `anchor` is set while evaluating a relative selector for `:has()`: the
    /// leftmost compound must then relate to the anchor through the
    /// selector's leading combinator (descendant when it has none).
    fn match_complex(
        &self,
        components: &[Component],
        node: A::Handle,
        anchor: Option<A::Handle>,
    ) -> Result<bool> {
        Ok(self.match_components(components, node, anchor)? == SelectorMatchingResult::Matched)
    }

    fn match_components(
        &self,
        components: &[Component],
        node: A::Handle,
        anchor: Option<A::Handle>,
    ) -> Result<SelectorMatchingResult> {
        let Some((Component::Compound(compound), rest)) = components.split_last() else {
            return Ok(SelectorMatchingResult::NotMatchedAndRestartFromClosestLaterSibling);
        };
        let Some(subject) = self.match_compound(compound, node)? else {
            return Ok(SelectorMatchingResult::NotMatchedAndRestartFromClosestLaterSibling);
        };

        let (combinator, left) = match rest.split_last() {
            None => {
                let related = anchor.is_none_or(|anchor| self.is_related(anchor, Combinator::Descendant, subject));
                return Ok(SelectorMatchingResult::from_matched(related));
            }
            Some((Component::Combinator(combinator), left)) => (*combinator, left),
            Some((Component::Compound(_), _)) => {
                return Ok(SelectorMatchingResult::NotMatchedAndRestartFromClosestLaterSibling);
            }
        };
        if left.is_empty() {
            let related = anchor.is_some_and(|anchor| self.is_related(anchor, combinator, subject));
            return Ok(SelectorMatchingResult::from_matched(related));
        }

        let candidate_not_found = match combinator {
            Combinator::NextSibling | Combinator::SubsequentSibling => {
                SelectorMatchingResult::NotMatchedAndRestartFromClosestDescendant
            }
            Combinator::Child | Combinator::Descendant => SelectorMatchingResult::NotMatchedGlobally,
        };

        let mut candidate = subject;
        loop {
            let next = match combinator {
                Combinator::Child => self.parent_element(candidate),
                // Below the anchor or nowhere.
                Combinator::Descendant => self.parent_element(candidate).filter(|&parent| anchor != Some(parent)),
                Combinator::NextSibling | Combinator::SubsequentSibling => self.prev_element_sibling(candidate),
            };
            let Some(next) = next else {
                return Ok(candidate_not_found);
            };
            candidate = next;

            let result = self.match_components(left, candidate, anchor)?;
            match (result, combinator) {
                (SelectorMatchingResult::Matched | SelectorMatchingResult::NotMatchedGlobally, _)
                | (_, Combinator::NextSibling) => return Ok(result),
                (_, Combinator::Child) => {
                    return Ok(SelectorMatchingResult::NotMatchedAndRestartFromClosestDescendant);
                }
                (SelectorMatchingResult::NotMatchedAndRestartFromClosestDescendant, Combinator::SubsequentSibling) => {
                    return Ok(result);
                }
                // A higher ancestor or an earlier sibling may still match.
                _ => {}
            }
        }
    }

    /// Match every simple selector of `compound` against `node`.
    ///
    /// Returns the node the compound finally applies to, which the
    /// combinator to the left starts from. That is `node` itself, except after
    /// `::slotted()` (the assigned slot) and `::part()` (the shadow host).
    fn match_compound(&self, compound: &CompoundSelector, node: A::Handle) -> Result<Option<A::Handle>> {
        let mut subject = node;
        for simple in &compound.simple_selectors {
            if let SimpleSelector::PseudoElement(pseudo) = simple {
                match self.pseudo_element(pseudo, subject)? {
                    Some(next) => subject = next,
                    None => return Ok(None),
                }
            } else if !self.simple(simple, subject)? {
                return Ok(None);
            }
        }
        Ok(Some(subject))
    }

    fn simple(&self, simple: &SimpleSelector, node: A::Handle) -> Result<bool> {
        if self.is_featureless(node) && !matches!(simple, SimpleSelector::PseudoClass(_)) {
            return Ok(false);
        }
        match simple {
            SimpleSelector::Type(name) => self.match_type(name, node),
            SimpleSelector::Id(id) => Ok(self.adapter.id(node) == Some(id.value.as_str())),
            SimpleSelector::Class(class) => Ok(self.adapter.has_class(node, &class.value)),
            SimpleSelector::Attribute(attribute) => self.match_attribute(attribute, node),
            SimpleSelector::PseudoClass(pseudo) => self.pseudo_class(pseudo, node),
            SimpleSelector::PseudoElement(_) => Ok(false),
        }
    }

    /// True for the host of the shadow root the query is scoped to.
    fn is_featureless(&self, node: A::Handle) -> bool {
        self.shadow_host == Some(node)
    }

    /// True if `subject` stands in `combinator` relation to `anchor`, with
    /// `anchor` on the left.
    fn is_related(&self, anchor: A::Handle, combinator: Combinator, subject: A::Handle) -> bool {
        match combinator {
            Combinator::Descendant => self.ancestors(subject).any(|ancestor| ancestor == anchor),
            Combinator::Child => self.parent_element(subject) == Some(anchor),
            Combinator::NextSibling => self.prev_element_sibling(subject) == Some(anchor),
            Combinator::SubsequentSibling => self.preceding_siblings(subject).any(|sibling| sibling == anchor),
        }
    }

    /// Resolve a namespace prefix: query bindings first, then the document.
    fn namespace_for(&self, prefix: &str) -> Result<&'q str> {
        self.options
            .namespaces
            .get(prefix)
            .map(String::as_str)
            .or_else(|| self.adapter.lookup_namespace_uri(prefix))
            .ok_or_else(|| {
                Error::InvalidSelector(InvalidSelectorError::new(
                    self.source,
                    format!("undeclared namespace prefix '{prefix}'"),
                ))
            })
    }

    /// Emit a diagnostic once, if the query asked for them.
    fn warn(&self, message: impl FnOnce() -> String) {
        if self.options.warn {
            let _ = warn_once(COMPONENT, &message());
        }
    }
}

/// Nesting depth bookkeeping for `match-trace` builds.
#[cfg(feature = "match-trace")]
struct TraceScope;

#[cfg(feature = "match-trace")]
impl TraceScope {
    fn enter<H: std::fmt::Debug>(list: &SelectorList, node: H) -> Self {
        let depth = MATCH_DEPTH.with(|d| {
            let current = d.get();
            d.set(current + 1);
            current
        });
        quoll_common::diagnostics::trace(
            COMPONENT,
            depth,
            &format!("[MATCH DEPTH] depth={depth} node={node:?} alternatives={}", list.len()),
        );
        Self
    }
}

#[cfg(feature = "match-trace")]
impl Drop for TraceScope {
    fn drop(&mut self) {
        MATCH_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

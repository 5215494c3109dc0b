//! Pseudo-class and pseudo-element dispatch.
//!
//! The logical and relational pseudo-classes recurse into the matcher; the
//! shadow-tree ones consult the query's shadow context; everything else is
//! delegated to the structural and element-state modules.

use crate::adapter::{NodeKind, TreeAdapter};
use crate::ast::{Combinator, Component, KeywordPseudoClass, PseudoClass, PseudoElement, Selector, SelectorList};
use crate::error::{Error, Result};

use super::Matcher;

impl<A: TreeAdapter> Matcher<'_, A> {
    pub(super) fn pseudo_class(&self, pseudo: &PseudoClass, node: A::Handle) -> Result<bool> {
        if self.is_featureless(node)
            && !matches!(
                pseudo,
                PseudoClass::Host(_)
                    | PseudoClass::HostContext(_)
                    | PseudoClass::Is(_)
                    | PseudoClass::Where(_)
                    | PseudoClass::Not(_)
            )
        {
            return Ok(false);
        }
        match pseudo {
            // [§ 4.3](https://www.w3.org/TR/selectors-4/#negation)
            // An empty list matches nothing, so its negation matches everything.
            PseudoClass::Not(list) => Ok(!self.match_list(list, node)?),
            // [§ 4.2](https://www.w3.org/TR/selectors-4/#matches)
            PseudoClass::Is(list) | PseudoClass::Where(list) => self.match_list(list, node),
            PseudoClass::Has(list) => self.match_has(list, node),
            PseudoClass::NthChild(nth) => self.match_nth_child(nth, node, false),
            PseudoClass::NthLastChild(nth) => self.match_nth_child(nth, node, true),
            PseudoClass::NthOfType(nth) => Ok(self.match_nth_of_type(nth, node, false)),
            PseudoClass::NthLastOfType(nth) => Ok(self.match_nth_of_type(nth, node, true)),
            PseudoClass::Dir(direction) => match direction {
                Some(direction) => Ok(self.adapter.direction(node).map_err(Error::Host)? == *direction),
                None => Ok(false),
            },
            PseudoClass::Lang(ranges) => self.match_lang(ranges, node),
            PseudoClass::State(state) => self.adapter.has_custom_state(node, state).map_err(Error::Host),
            PseudoClass::Host(argument) => self.match_host(argument.as_ref(), node),
            PseudoClass::HostContext(list) => self.match_host_context(list, node),
            PseudoClass::Keyword(keyword) => self.keyword(*keyword, node),
            PseudoClass::Vendor(name) => {
                self.warn(|| format!("vendor-prefixed pseudo-class ':{name}' never matches"));
                Ok(false)
            }
        }
    }

    fn keyword(&self, keyword: KeywordPseudoClass, node: A::Handle) -> Result<bool> {
        if keyword.never_matches() {
            self.warn(|| format!("pseudo-class ':{keyword}' never matches a static tree"));
            return Ok(false);
        }
        let matched = match keyword {
            KeywordPseudoClass::Root => self.is_root(node),
            KeywordPseudoClass::Empty => self.is_empty(node),
            KeywordPseudoClass::Scope => self.is_scope(node),
            KeywordPseudoClass::FirstChild => self.prev_element_sibling(node).is_none(),
            KeywordPseudoClass::LastChild => self.next_element_sibling(node).is_none(),
            KeywordPseudoClass::OnlyChild => {
                self.prev_element_sibling(node).is_none() && self.next_element_sibling(node).is_none()
            }
            KeywordPseudoClass::FirstOfType => self.type_position(node, false) == 1,
            KeywordPseudoClass::LastOfType => self.type_position(node, true) == 1,
            KeywordPseudoClass::OnlyOfType => {
                self.type_position(node, false) == 1 && self.type_position(node, true) == 1
            }
            KeywordPseudoClass::Defined => self.adapter.is_defined(node),
            KeywordPseudoClass::Link | KeywordPseudoClass::AnyLink => self.is_link(node),
            KeywordPseudoClass::Checked => self.is_checked(node),
            KeywordPseudoClass::Disabled => self.supports_disabled(node) && self.is_disabled(node),
            KeywordPseudoClass::Enabled => self.supports_disabled(node) && !self.is_disabled(node),
            KeywordPseudoClass::Required => self.is_required(node),
            KeywordPseudoClass::Optional => self.supports_required(node) && !self.is_required(node),
            KeywordPseudoClass::ReadWrite => self.is_read_write(node),
            KeywordPseudoClass::ReadOnly => !self.is_read_write(node),
            KeywordPseudoClass::PlaceholderShown => self.is_placeholder_shown(node),
            KeywordPseudoClass::Indeterminate => self.is_indeterminate(node),
            KeywordPseudoClass::Target => self.options.target == Some(node),
            KeywordPseudoClass::Focus | KeywordPseudoClass::FocusVisible => self.options.focus == Some(node),
            KeywordPseudoClass::FocusWithin => self.is_focus_within(node),
            // Filtered out by `never_matches` above.
            _ => false,
        };
        Ok(matched)
    }

    /// [§ 8.2 :scope](https://www.w3.org/TR/selectors-4/#the-scope-pseudo)
    ///
    /// The scoping element itself; with a document as the scoping root,
    /// the document element.
    fn is_scope(&self, node: A::Handle) -> bool {
        match self.scope {
            Some(scope) => match self.adapter.node_kind(scope) {
                NodeKind::Element => scope == node,
                NodeKind::Document => self.is_root(node),
                _ => false,
            },
            None => self.is_root(node),
        }
    }

    /// [§ 4.5 :has()](https://www.w3.org/TR/selectors-4/#relational)
    ///
    /// Each relative selector is anchored at `node`. Candidates for its
    /// rightmost compound are the descendants of `node` for a leading
    /// descendant or child combinator; for a leading sibling combinator they
    /// are the following siblings and, when the selector goes deeper, their
    /// descendants. The leftmost compound is checked against the anchor at
    /// the end of the right-to-left walk.
    fn match_has(&self, list: &SelectorList, node: A::Handle) -> Result<bool> {
        for selector in &list.selectors {
            if self.match_relative(selector, node)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn match_relative(&self, selector: &Selector, anchor: A::Handle) -> Result<bool> {
        let leading = match selector.components.first() {
            Some(Component::Combinator(combinator)) => *combinator,
            _ => Combinator::Descendant,
        };
        let components = selector.components.as_slice();
        match leading {
            Combinator::Descendant | Combinator::Child => {
                for candidate in super::Descendants::new(self.adapter, anchor) {
                    if self.match_complex(components, candidate, Some(anchor))? {
                        return Ok(true);
                    }
                }
            }
            Combinator::NextSibling | Combinator::SubsequentSibling => {
                let goes_deeper = selector.components.iter().skip(1).any(|component| {
                    matches!(
                        component,
                        Component::Combinator(Combinator::Descendant | Combinator::Child)
                    )
                });
                for sibling in self.following_siblings(anchor) {
                    if self.match_complex(components, sibling, Some(anchor))? {
                        return Ok(true);
                    }
                    if goes_deeper {
                        for candidate in super::Descendants::new(self.adapter, sibling) {
                            if self.match_complex(components, candidate, Some(anchor))? {
                                return Ok(true);
                            }
                        }
                    }
                    if leading == Combinator::NextSibling && selector.compound_count() == 1 {
                        break;
                    }
                }
            }
        }
        Ok(false)
    }

    /// [CSS Scoping § :host](https://drafts.csswg.org/css-scoping/#host-selector)
    ///
    /// "The :host pseudo-class, when evaluated in the context of a shadow tree,
    /// matches the shadow tree's shadow host. In any other context, it matches
    /// nothing. The :host() function pseudo-class ... matches the shadow host
    /// only if the shadow host, in its normal context, matches the selector
    /// argument."
    fn match_host(&self, argument: Option<&SelectorList>, node: A::Handle) -> Result<bool> {
        if !self.is_featureless(node) {
            return Ok(false);
        }
        match argument {
            Some(list) => self.light().match_list(list, node),
            None => Ok(true),
        }
    }

    /// [CSS Scoping § :host-context()](https://drafts.csswg.org/css-scoping/#host-selector)
    ///
    /// "...matches the shadow host only if the shadow host or one of its
    /// shadow-including ancestors matches the selector argument."
    fn match_host_context(&self, list: &SelectorList, node: A::Handle) -> Result<bool> {
        if !self.is_featureless(node) {
            return Ok(false);
        }
        let light = self.light();
        let mut current = Some(node);
        while let Some(element) = current {
            if light.match_list(list, element)? {
                return Ok(true);
            }
            current = self.adapter.parent(element).and_then(|parent| match self.adapter.node_kind(parent) {
                NodeKind::Element => Some(parent),
                NodeKind::ShadowRoot => self.adapter.shadow_host(parent),
                _ => None,
            });
        }
        Ok(false)
    }

    /// Match a pseudo-element against `node`.
    ///
    /// Returns the node the rest of the compound applies to: the assigned
    /// slot for `::slotted()`, the shadow host for `::part()`, and `node`
    /// itself for a targeted named pseudo-element.
    pub(super) fn pseudo_element(&self, pseudo: &PseudoElement, node: A::Handle) -> Result<Option<A::Handle>> {
        match pseudo {
            // [CSS Scoping § ::slotted()](https://drafts.csswg.org/css-scoping/#slotted-pseudo)
            // "...represents the elements assigned, after flattening, to a slot."
            PseudoElement::Slotted(list) => {
                let Some(host) = self.shadow_host else {
                    return Ok(None);
                };
                let Some(slot) = self.adapter.assigned_slot(node) else {
                    return Ok(None);
                };
                if self.adapter.parent(node) != Some(host) {
                    return Ok(None);
                }
                Ok(self.light().match_list(list, node)?.then_some(slot))
            }
            // [CSS Shadow Parts § ::part()](https://drafts.csswg.org/css-shadow-parts/#part)
            PseudoElement::Part(names) => {
                let Some(host) = self.containing_shadow_host(node) else {
                    return Ok(None);
                };
                let parts = self.adapter.attribute(node, "part").unwrap_or_default();
                let all_named = names
                    .iter()
                    .all(|name| parts.split_ascii_whitespace().any(|part| part == name));
                Ok(all_named.then_some(host))
            }
            PseudoElement::Named(named) => {
                if self.pseudo_target == Some(*named) {
                    return Ok(Some(node));
                }
                self.warn(|| format!("pseudo-element '::{named}' only matches when targeted"));
                Ok(None)
            }
            PseudoElement::Vendor(name) => {
                self.warn(|| format!("vendor-prefixed pseudo-element '::{name}' never matches"));
                Ok(None)
            }
        }
    }

    /// The host of the shadow tree `node` lives in.
    fn containing_shadow_host(&self, node: A::Handle) -> Option<A::Handle> {
        let mut current = node;
        while let Some(parent) = self.adapter.parent(current) {
            current = parent;
        }
        if self.adapter.node_kind(current) == NodeKind::ShadowRoot {
            self.adapter.shadow_host(current)
        } else {
            None
        }
    }
}

//! [§ 14 Tree-structural pseudo-classes](https://www.w3.org/TR/selectors-4/#structural-pseudos)

use crate::adapter::{NodeKind, TreeAdapter};
use crate::ast::NthExpression;
use crate::error::Result;

use super::Matcher;

impl<A: TreeAdapter> Matcher<'_, A> {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    ///
    /// "The :root pseudo-class represents an element that is the root of the
    /// document."
    pub(super) fn is_root(&self, node: A::Handle) -> bool {
        self.adapter
            .parent(node)
            .is_some_and(|parent| self.adapter.node_kind(parent) == NodeKind::Document)
    }

    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    ///
    /// "The :empty pseudo-class represents an element that has no children
    /// except, optionally, document white space characters." Comments and
    /// empty text nodes do not count; any other text does.
    pub(super) fn is_empty(&self, node: A::Handle) -> bool {
        let mut child = self.adapter.first_child(node);
        while let Some(current) = child {
            match self.adapter.node_kind(current) {
                NodeKind::Element => return false,
                NodeKind::Text if self.adapter.text(current).is_some_and(|text| !text.is_empty()) => {
                    return false;
                }
                _ => {}
            }
            child = self.adapter.next_sibling(current);
        }
        true
    }

    /// [§ 14.4.1 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    ///
    /// "The :nth-child(An+B [of S]? ) pseudo-class notation represents elements
    /// that are among An+Bth elements from the list composed of their
    /// inclusive siblings that match the selector list S. If S is omitted, it
    /// defaults to *|*."
    ///
    /// An element that does not match S itself is not in the list and never
    /// matches.
    pub(super) fn match_nth_child(&self, nth: &NthExpression, node: A::Handle, from_end: bool) -> Result<bool> {
        let Some(of) = &nth.of else {
            let siblings = if from_end {
                self.following_siblings(node).count()
            } else {
                self.preceding_siblings(node).count()
            };
            return Ok(nth.matches_position(position(siblings)));
        };
        if !self.match_list(of, node)? {
            return Ok(false);
        }
        let mut siblings = 0usize;
        let candidates = if from_end {
            self.following_siblings(node)
        } else {
            self.preceding_siblings(node)
        };
        for sibling in candidates {
            if self.match_list(of, sibling)? {
                siblings += 1;
            }
        }
        Ok(nth.matches_position(position(siblings)))
    }

    /// [§ 14.4.3 :nth-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-of-type-pseudo)
    pub(super) fn match_nth_of_type(&self, nth: &NthExpression, node: A::Handle, from_end: bool) -> bool {
        nth.matches_position(position(self.type_position(node, from_end) - 1))
    }

    /// 1-based position of `node` among its siblings of the same type
    /// (same local name and namespace).
    pub(super) fn type_position(&self, node: A::Handle, from_end: bool) -> usize {
        let local_name = self.adapter.local_name(node);
        let namespace = self.adapter.namespace_uri(node);
        let same_type = |sibling: &A::Handle| {
            self.adapter.local_name(*sibling) == local_name && self.adapter.namespace_uri(*sibling) == namespace
        };
        let siblings = if from_end {
            self.following_siblings(node).filter(same_type).count()
        } else {
            self.preceding_siblings(node).filter(same_type).count()
        };
        siblings + 1
    }
}

/// 1-based position after `siblings` counted siblings.
fn position(siblings: usize) -> i64 {
    i64::try_from(siblings).map_or(i64::MAX, |count| count.saturating_add(1))
}

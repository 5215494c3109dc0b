//! Lazy element axes for the right-to-left matcher.
//!
//! Combinators step one element at a time through `parent_element`
//! and `prev_element_sibling`; relation checks, `:has()` and the
//! positional pseudo-classes consume the iterators nearest-first, so the full
//! ancestor or sibling list is never materialized.

use crate::adapter::{NodeKind, TreeAdapter};

use super::Matcher;

impl<A: TreeAdapter> Matcher<'_, A> {
    fn is_element(&self, node: A::Handle) -> bool {
        self.adapter.node_kind(node) == NodeKind::Element
    }

    /// The parent element of `node`.
    ///
    /// In a shadow-scoped query the parent of a top-level shadow element is
    /// the featureless host, which itself has no parent.
    pub(super) fn parent_element(&self, node: A::Handle) -> Option<A::Handle> {
        if self.is_featureless(node) {
            return None;
        }
        let parent = self.adapter.parent(node)?;
        match self.adapter.node_kind(parent) {
            NodeKind::Element => Some(parent),
            NodeKind::ShadowRoot => self
                .shadow_host
                .filter(|&host| self.adapter.shadow_host(parent) == Some(host)),
            _ => None,
        }
    }

    /// The element sibling immediately before `node`.
    pub(super) fn prev_element_sibling(&self, node: A::Handle) -> Option<A::Handle> {
        if self.is_featureless(node) {
            return None;
        }
        let mut current = self.adapter.prev_sibling(node);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.adapter.prev_sibling(sibling);
        }
        None
    }

    /// The element sibling immediately after `node`.
    pub(super) fn next_element_sibling(&self, node: A::Handle) -> Option<A::Handle> {
        if self.is_featureless(node) {
            return None;
        }
        let mut current = self.adapter.next_sibling(node);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.adapter.next_sibling(sibling);
        }
        None
    }

    /// Ancestor elements of `node`, nearest first.
    pub(super) fn ancestors(&self, node: A::Handle) -> Ancestors<'_, A> {
        Ancestors {
            matcher: self,
            current: self.parent_element(node),
        }
    }

    /// Element siblings before `node`, nearest first.
    pub(super) fn preceding_siblings(&self, node: A::Handle) -> Siblings<'_, A> {
        Siblings {
            matcher: self,
            current: self.prev_element_sibling(node),
            forward: false,
        }
    }

    /// Element siblings after `node`, nearest first.
    pub(super) fn following_siblings(&self, node: A::Handle) -> Siblings<'_, A> {
        Siblings {
            matcher: self,
            current: self.next_element_sibling(node),
            forward: true,
        }
    }

    /// Element children of `node`, in order.
    pub(super) fn element_children(&self, node: A::Handle) -> Siblings<'_, A> {
        let first = self
            .adapter
            .first_child(node)
            .and_then(|child| if self.is_element(child) { Some(child) } else { self.next_element_sibling(child) });
        Siblings {
            matcher: self,
            current: first,
            forward: true,
        }
    }
}

/// Iterator over ancestor elements.
pub(super) struct Ancestors<'m, A: TreeAdapter> {
    matcher: &'m Matcher<'m, A>,
    current: Option<A::Handle>,
}

impl<A: TreeAdapter> Iterator for Ancestors<'_, A> {
    type Item = A::Handle;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = self.matcher.parent_element(node);
        Some(node)
    }
}

/// Iterator over element siblings in one direction.
pub(super) struct Siblings<'m, A: TreeAdapter> {
    matcher: &'m Matcher<'m, A>,
    current: Option<A::Handle>,
    forward: bool,
}

impl<A: TreeAdapter> Iterator for Siblings<'_, A> {
    type Item = A::Handle;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = if self.forward {
            self.matcher.next_element_sibling(node)
        } else {
            self.matcher.prev_element_sibling(node)
        };
        Some(node)
    }
}

/// Pre-order iterator over the element descendants of a root, excluding the
/// root. Shadow trees are not entered.
pub(crate) struct Descendants<'a, A: TreeAdapter> {
    adapter: &'a A,
    root: A::Handle,
    next: Option<A::Handle>,
}

impl<'a, A: TreeAdapter> Descendants<'a, A> {
    pub(crate) fn new(adapter: &'a A, root: A::Handle) -> Self {
        Self {
            adapter,
            root,
            next: adapter.first_child(root),
        }
    }

    fn advance(&self, node: A::Handle) -> Option<A::Handle> {
        if let Some(child) = self.adapter.first_child(node) {
            return Some(child);
        }
        let mut current = node;
        loop {
            if current == self.root {
                return None;
            }
            if let Some(sibling) = self.adapter.next_sibling(current) {
                return Some(sibling);
            }
            current = self.adapter.parent(current)?;
        }
    }
}

impl<A: TreeAdapter> Iterator for Descendants<'_, A> {
    type Item = A::Handle;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.next?;
            self.next = self.advance(node);
            if self.adapter.node_kind(node) == NodeKind::Element {
                return Some(node);
            }
        }
    }
}

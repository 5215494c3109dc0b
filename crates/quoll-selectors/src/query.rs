//! Public query operations.
//!
//! [§ 4.2.6 Scope-match a selectors string](https://dom.spec.whatwg.org/#scope-match-a-selectors-string)
//!
//! A [`Query`] pairs an analyzed [`Selectors`] with a host tree and the
//! per-query [`QueryOptions`]. It answers the four questions the DOM asks of
//! a selector: does a node match, which inclusive ancestor is closest, which
//! descendant comes first, and which descendants match at all. Nothing here
//! holds global state; every setting travels in the options.

use std::collections::HashMap;

use crate::adapter::{NodeKind, TreeAdapter};
use crate::ast::NamedPseudoElement;
use crate::error::Result;
use crate::matcher::{Descendants, Matcher};
use crate::preprocess::SelectorValue;
use crate::walk::Selectors;

/// Per-query configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions<H> {
    /// The `:scope` element or scoping root. When it is a shadow root, the
    /// query runs in that shadow tree's context: `:host` and friends apply
    /// and the host is featureless. Defaults to the queried node for
    /// [`Query::matches`] and [`Query::closest`] and to the root for
    /// [`Query::first_match`] and [`Query::all_matches`].
    pub scope: Option<H>,
    /// Prefix to namespace URI bindings for `ns|name` selectors. Prefixes
    /// not bound here are looked up in the document.
    pub namespaces: HashMap<String, String>,
    /// The pseudo-element a boolean query targets, such as `::before`.
    pub pseudo_element: Option<NamedPseudoElement>,
    /// The `:target` element.
    pub target: Option<H>,
    /// The focused element, for `:focus`, `:focus-visible` and `:focus-within`.
    pub focus: Option<H>,
    /// Report constructs that can never match through
    /// [`quoll_common::warn_once`].
    pub warn: bool,
}

impl<H> Default for QueryOptions<H> {
    fn default() -> Self {
        Self {
            scope: None,
            namespaces: HashMap::new(),
            pseudo_element: None,
            target: None,
            focus: None,
            warn: false,
        }
    }
}

/// A selector bound to a host tree.
///
/// # Example
/// ```ignore
/// let selectors = Selectors::parse("ul > li:nth-child(odd)")?;
/// let query = Query::new(&tree, &selectors);
/// for item in query.all_matches(tree.root()) {
///     println!("{:?}", item?);
/// }
/// ```
pub struct Query<'a, A: TreeAdapter> {
    adapter: &'a A,
    selectors: &'a Selectors,
    options: QueryOptions<A::Handle>,
}

impl<'a, A: TreeAdapter> Query<'a, A> {
    /// Bind `selectors` to `adapter` with default options.
    #[must_use]
    pub fn new(adapter: &'a A, selectors: &'a Selectors) -> Self {
        Self {
            adapter,
            selectors,
            options: QueryOptions::default(),
        }
    }

    /// Replace all options.
    #[must_use]
    pub fn with_options(mut self, options: QueryOptions<A::Handle>) -> Self {
        self.options = options;
        self
    }

    /// Set the `:scope` element or scoping root.
    #[must_use]
    pub fn scope(mut self, scope: A::Handle) -> Self {
        self.options.scope = Some(scope);
        self
    }

    /// Bind a namespace prefix.
    #[must_use]
    pub fn namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let _ = self.options.namespaces.insert(prefix.into(), uri.into());
        self
    }

    /// Target a pseudo-element in boolean queries.
    #[must_use]
    pub fn pseudo_element(mut self, pseudo_element: NamedPseudoElement) -> Self {
        self.options.pseudo_element = Some(pseudo_element);
        self
    }

    /// Set the `:target` element.
    #[must_use]
    pub fn target(mut self, target: A::Handle) -> Self {
        self.options.target = Some(target);
        self
    }

    /// Set the focused element.
    #[must_use]
    pub fn focus(mut self, focus: A::Handle) -> Self {
        self.options.focus = Some(focus);
        self
    }

    /// Emit diagnostics for constructs that never match.
    #[must_use]
    pub fn warn(mut self, warn: bool) -> Self {
        self.options.warn = warn;
        self
    }

    /// The options in effect.
    #[must_use]
    pub const fn options(&self) -> &QueryOptions<A::Handle> {
        &self.options
    }

    fn matcher(&self, default_scope: A::Handle, traversal: bool) -> Matcher<'_, A> {
        Matcher::new(
            self.adapter,
            &self.options,
            self.selectors.source(),
            Some(default_scope),
            traversal,
        )
    }

    /// [§ 4.9 matches()](https://dom.spec.whatwg.org/#dom-element-matches)
    ///
    /// True if `node` satisfies any branch. Non-elements never match.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSelector`](crate::Error::InvalidSelector) for an undeclared namespace prefix;
    /// [`Error::Host`](crate::Error::Host) if a host resolver fails.
    pub fn matches(&self, node: A::Handle) -> Result<bool> {
        self.matcher(node, false)
            .matches_branches(self.selectors.branches(), node)
    }

    /// [§ 4.9 closest()](https://dom.spec.whatwg.org/#dom-element-closest)
    ///
    /// "...returns the first (starting at element) inclusive ancestor that
    /// matches selectors, and null otherwise."
    ///
    /// The walk follows element parents. In a query scoped to a shadow root
    /// it steps from the top of the shadow tree to the featureless host, so
    /// `:host` can be found, and stops there.
    ///
    /// # Errors
    ///
    /// As [`Query::matches`].
    pub fn closest(&self, node: A::Handle) -> Result<Option<A::Handle>> {
        let matcher = self.matcher(node, false);
        let branches = self.selectors.branches();
        let mut current = if self.adapter.node_kind(node) == NodeKind::Element {
            Some(node)
        } else {
            matcher.parent_of(node)
        };
        while let Some(element) = current {
            if matcher.matches_branches(branches, element)? {
                return Ok(Some(element));
            }
            current = matcher.parent_of(element);
        }
        Ok(None)
    }

    /// [§ 4.2.6 querySelector()](https://dom.spec.whatwg.org/#dom-parentnode-queryselector)
    ///
    /// The first element in tree order below `root`, excluding `root`, that
    /// matches. Shadow trees below `root` are not entered.
    ///
    /// # Errors
    ///
    /// As [`Query::matches`].
    pub fn first_match(&self, root: A::Handle) -> Result<Option<A::Handle>> {
        self.all_matches(root).next().transpose()
    }

    /// [§ 4.2.6 querySelectorAll()](https://dom.spec.whatwg.org/#dom-parentnode-queryselectorall)
    ///
    /// A lazy iterator over every matching element below `root`, in tree
    /// order. Each call starts a fresh, independent traversal. The first
    /// error ends the iteration.
    #[must_use]
    pub fn all_matches(&self, root: A::Handle) -> AllMatches<'_, A> {
        AllMatches {
            matcher: self.matcher(root, true),
            selectors: self.selectors,
            descendants: Descendants::new(self.adapter, root),
            done: false,
        }
    }
}

/// Iterator returned by [`Query::all_matches`].
pub struct AllMatches<'q, A: TreeAdapter> {
    matcher: Matcher<'q, A>,
    selectors: &'q Selectors,
    descendants: Descendants<'q, A>,
    done: bool,
}

impl<A: TreeAdapter> AllMatches<'_, A> {
    fn test(&self, node: A::Handle) -> Result<bool> {
        let branches = self.selectors.branches();
        if self.selectors.info().is_plain() && branches.iter().all(|branch| branch.is_simple()) {
            for branch in branches {
                if self.matcher.matches_simple_branch(branch, node)? {
                    return Ok(true);
                }
            }
            return Ok(false);
        }
        self.matcher.matches_branches(branches, node)
    }
}

impl<A: TreeAdapter> Iterator for AllMatches<'_, A> {
    type Item = Result<A::Handle>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let node = self.descendants.next()?;
            match self.test(node) {
                Ok(true) => return Some(Ok(node)),
                Ok(false) => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl Selectors {
    /// See [`Query::matches`].
    ///
    /// # Errors
    ///
    /// As [`Query::matches`].
    pub fn matches<A: TreeAdapter>(&self, adapter: &A, node: A::Handle) -> Result<bool> {
        Query::new(adapter, self).matches(node)
    }

    /// See [`Query::closest`].
    ///
    /// # Errors
    ///
    /// As [`Query::matches`].
    pub fn closest<A: TreeAdapter>(&self, adapter: &A, node: A::Handle) -> Result<Option<A::Handle>> {
        Query::new(adapter, self).closest(node)
    }

    /// See [`Query::first_match`].
    ///
    /// # Errors
    ///
    /// As [`Query::matches`].
    pub fn first_match<A: TreeAdapter>(&self, adapter: &A, root: A::Handle) -> Result<Option<A::Handle>> {
        Query::new(adapter, self).first_match(root)
    }

    /// See [`Query::all_matches`]; the results are collected.
    ///
    /// # Errors
    ///
    /// As [`Query::matches`].
    pub fn all_matches<A: TreeAdapter>(&self, adapter: &A, root: A::Handle) -> Result<Vec<A::Handle>> {
        Query::new(adapter, self).all_matches(root).collect()
    }
}

/// Parse `selector` and test `node`.
///
/// # Errors
///
/// [`Error::InvalidSelector`](crate::Error::InvalidSelector) if the selector does not parse, otherwise as
/// [`Query::matches`].
pub fn matches<A: TreeAdapter>(selector: impl Into<SelectorValue>, adapter: &A, node: A::Handle) -> Result<bool> {
    Selectors::parse(selector)?.matches(adapter, node)
}

/// Parse `selector` and find the closest inclusive ancestor of `node`.
///
/// # Errors
///
/// As [`matches`].
pub fn closest<A: TreeAdapter>(
    selector: impl Into<SelectorValue>,
    adapter: &A,
    node: A::Handle,
) -> Result<Option<A::Handle>> {
    Selectors::parse(selector)?.closest(adapter, node)
}

/// Parse `selector` and find the first match below `root`.
///
/// # Errors
///
/// As [`matches`].
pub fn query_selector<A: TreeAdapter>(
    selector: impl Into<SelectorValue>,
    adapter: &A,
    root: A::Handle,
) -> Result<Option<A::Handle>> {
    Selectors::parse(selector)?.first_match(adapter, root)
}

/// Parse `selector` and collect every match below `root`.
///
/// # Errors
///
/// As [`matches`].
pub fn query_selector_all<A: TreeAdapter>(
    selector: impl Into<SelectorValue>,
    adapter: &A,
    root: A::Handle,
) -> Result<Vec<A::Handle>> {
    Selectors::parse(selector)?.all_matches(adapter, root)
}

//! The host tree capability the matcher runs against.
//!
//! Matching never touches a concrete DOM. It asks a [`TreeAdapter`] for
//! structure (parent, siblings, children), element data (names, namespaces,
//! attributes), shadow-tree linkage and a few resolvers whose answers depend
//! on the host: directionality, language and custom states. The resolvers are
//! fallible so a host can report its own failures, which the engine passes
//! through untouched.
//!
//! [`quoll_dom::DomTree`] implements the trait and serves as the reference host.

use std::fmt::Debug;
use std::hash::Hash;

use quoll_dom::{DomTree, NodeId, NodeType, XML_NAMESPACE, XMLNS_NAMESPACE};
use unicode_bidi::{BidiClass, bidi_class};

use crate::ast::Direction;
use crate::error::HostError;

/// What kind of node a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An element; the only kind selectors can match.
    Element,
    /// The document node.
    Document,
    /// A document fragment that is not a shadow root.
    DocumentFragment,
    /// A shadow root attached to a host element.
    ShadowRoot,
    /// A text node.
    Text,
    /// A comment.
    Comment,
    /// Anything else the host knows about (processing instructions, doctypes).
    Other,
}

/// A borrowed view of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrRef<'a> {
    /// Namespace URI, `None` for the null namespace.
    pub namespace: Option<&'a str>,
    /// Prefix as written in the document.
    pub prefix: Option<&'a str>,
    /// Local name.
    pub local_name: &'a str,
    /// Value.
    pub value: &'a str,
}

impl AttrRef<'_> {
    /// True if the attribute's qualified name (`prefix:local` or `local`) is `name`.
    #[must_use]
    pub fn has_qualified_name(&self, name: &str) -> bool {
        match self.prefix {
            Some(prefix) => name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|local| local == self.local_name),
            None => name == self.local_name,
        }
    }
}

/// Read-only access to a host tree.
///
/// Handles are small copyable identifiers. The engine never mutates the tree
/// and assumes it stays stable for the duration of one query.
pub trait TreeAdapter {
    /// A node identifier.
    type Handle: Copy + Eq + Hash + Debug;

    /// The kind of `node`.
    fn node_kind(&self, node: Self::Handle) -> NodeKind;

    /// The parent of `node`. A shadow root has no parent; see [`TreeAdapter::shadow_host`].
    fn parent(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The previous sibling of `node`, of any kind.
    fn prev_sibling(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The next sibling of `node`, of any kind.
    fn next_sibling(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The first child of `node`, of any kind.
    fn first_child(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The last child of `node`, of any kind.
    fn last_child(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The local name of an element; `None` for other nodes.
    fn local_name(&self, node: Self::Handle) -> Option<&str>;

    /// The namespace URI of an element; `None` for the null namespace and for
    /// non-elements.
    fn namespace_uri(&self, node: Self::Handle) -> Option<&str>;

    /// The attributes of an element, in document order. Empty for other nodes.
    fn attributes(&self, node: Self::Handle) -> impl Iterator<Item = AttrRef<'_>>;

    /// [§ 4.9 getAttribute](https://dom.spec.whatwg.org/#dom-element-getattribute)
    ///
    /// The value of the first attribute whose qualified name is `name`.
    fn attribute(&self, node: Self::Handle, name: &str) -> Option<&str> {
        self.attributes(node)
            .find(|attr| attr.has_qualified_name(name))
            .map(|attr| attr.value)
    }

    /// The element's ID.
    fn id(&self, node: Self::Handle) -> Option<&str> {
        self.attribute(node, "id")
    }

    /// True if `class_name` is one of the element's classes.
    fn has_class(&self, node: Self::Handle, class_name: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|class| class == class_name))
    }

    /// The data of a text node; `None` for other nodes.
    fn text(&self, node: Self::Handle) -> Option<&str>;

    /// The shadow root attached to an element.
    fn shadow_root(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The host of a shadow root.
    fn shadow_host(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The slot a light-tree element is assigned to, if any.
    fn assigned_slot(&self, _node: Self::Handle) -> Option<Self::Handle> {
        None
    }

    /// Resolve a namespace prefix declared by the document, for `ns|name`
    /// selectors whose prefix the query did not bind.
    fn lookup_namespace_uri(&self, _prefix: &str) -> Option<&str> {
        None
    }

    /// True for HTML documents, where HTML element and attribute names
    /// compare ASCII case-insensitively.
    fn is_html_document(&self) -> bool {
        true
    }

    /// [HTML § :defined](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-defined)
    fn is_defined(&self, _node: Self::Handle) -> bool {
        true
    }

    /// [HTML § The directionality](https://html.spec.whatwg.org/multipage/dom.html#the-directionality)
    ///
    /// # Errors
    ///
    /// Hosts may report failures; the default never fails.
    fn direction(&self, node: Self::Handle) -> Result<Direction, HostError> {
        Ok(resolve_direction(self, node))
    }

    /// [HTML § The lang attribute](https://html.spec.whatwg.org/multipage/dom.html#the-lang-and-xml:lang-attributes)
    ///
    /// The language of `node`, `None` when unknown. An explicitly empty
    /// language is `Some("")`.
    ///
    /// # Errors
    ///
    /// Hosts may report failures; the default never fails.
    fn language(&self, node: Self::Handle) -> Result<Option<String>, HostError> {
        Ok(resolve_language(self, node))
    }

    /// [HTML § :state()](https://html.spec.whatwg.org/multipage/custom-elements.html#custom-state-pseudo-class)
    ///
    /// # Errors
    ///
    /// Hosts may report failures; the default never fails.
    fn has_custom_state(&self, _node: Self::Handle, _state: &str) -> Result<bool, HostError> {
        Ok(false)
    }

    /// True if `node` is an element in the HTML namespace.
    fn is_html_element(&self, node: Self::Handle) -> bool {
        self.namespace_uri(node) == Some(quoll_dom::HTML_NAMESPACE)
    }
}

/// The parent to inherit from, stepping from a shadow root to its host.
fn inheritance_parent<A: TreeAdapter + ?Sized>(adapter: &A, node: A::Handle) -> Option<A::Handle> {
    let parent = adapter.parent(node)?;
    match adapter.node_kind(parent) {
        NodeKind::Element => Some(parent),
        NodeKind::ShadowRoot => adapter.shadow_host(parent),
        _ => None,
    }
}

fn is_html_named<A: TreeAdapter + ?Sized>(adapter: &A, node: A::Handle, names: &[&str]) -> bool {
    adapter.is_html_element(node)
        && adapter
            .local_name(node)
            .is_some_and(|local| names.iter().any(|name| local.eq_ignore_ascii_case(name)))
}

/// [HTML § The directionality](https://html.spec.whatwg.org/multipage/dom.html#the-directionality)
///
/// "The directionality of an element ... is either 'ltr' or 'rtl'":
/// - `dir=ltr` / `dir=rtl` decide directly;
/// - `dir=auto`, and `<bdi>` without a valid `dir`, use the first character
///   with a strong direction in the element's text (the `value` of text
///   inputs, the text of `<textarea>`), falling back to ltr;
/// - otherwise the element inherits from its parent, crossing from a shadow
///   root to its host; the document element defaults to ltr.
#[must_use]
pub fn resolve_direction<A: TreeAdapter + ?Sized>(adapter: &A, node: A::Handle) -> Direction {
    let mut current = node;
    loop {
        if adapter.node_kind(current) == NodeKind::Element {
            let dir = adapter.attribute(current, "dir").map(str::to_ascii_lowercase);
            match dir.as_deref() {
                Some("ltr") => return Direction::Ltr,
                Some("rtl") => return Direction::Rtl,
                Some("auto") => return auto_direction(adapter, current).unwrap_or(Direction::Ltr),
                _ if is_html_named(adapter, current, &["bdi"]) => {
                    return auto_direction(adapter, current).unwrap_or(Direction::Ltr);
                }
                _ => {}
            }
        }
        match inheritance_parent(adapter, current) {
            Some(parent) => current = parent,
            None => return Direction::Ltr,
        }
    }
}

/// [HTML § auto directionality](https://html.spec.whatwg.org/multipage/dom.html#auto-directionality)
fn auto_direction<A: TreeAdapter + ?Sized>(adapter: &A, element: A::Handle) -> Option<Direction> {
    if is_html_named(adapter, element, &["input"]) {
        return adapter.attribute(element, "value").and_then(first_strong_direction);
    }
    if is_html_named(adapter, element, &["textarea"]) {
        return child_text(adapter, element).and_then(|text| first_strong_direction(&text));
    }

    // Pre-order walk that skips subtrees whose text does not contribute.
    let mut stack: Vec<A::Handle> = Vec::new();
    let mut child = adapter.last_child(element);
    while let Some(node) = child {
        stack.push(node);
        child = adapter.prev_sibling(node);
    }
    while let Some(node) = stack.pop() {
        match adapter.node_kind(node) {
            NodeKind::Text => {
                if let Some(direction) = adapter.text(node).and_then(first_strong_direction) {
                    return Some(direction);
                }
            }
            NodeKind::Element => {
                let skip = is_html_named(adapter, node, &["script", "style", "textarea", "bdi"])
                    || adapter.attribute(node, "dir").is_some_and(|dir| {
                        ["ltr", "rtl", "auto"]
                            .iter()
                            .any(|valid| dir.eq_ignore_ascii_case(valid))
                    });
                if skip {
                    continue;
                }
                let mut child = adapter.last_child(node);
                while let Some(grandchild) = child {
                    stack.push(grandchild);
                    child = adapter.prev_sibling(grandchild);
                }
            }
            _ => {}
        }
    }
    None
}

fn child_text<A: TreeAdapter + ?Sized>(adapter: &A, element: A::Handle) -> Option<String> {
    let mut text = String::new();
    let mut child = adapter.first_child(element);
    while let Some(node) = child {
        if let Some(data) = adapter.text(node) {
            text.push_str(data);
        }
        child = adapter.next_sibling(node);
    }
    (!text.is_empty()).then_some(text)
}

/// The direction of the first character whose bidi class is L, R or AL.
#[must_use]
pub fn first_strong_direction(text: &str) -> Option<Direction> {
    text.chars().find_map(|c| match bidi_class(c) {
        BidiClass::L => Some(Direction::Ltr),
        BidiClass::R | BidiClass::AL => Some(Direction::Rtl),
        _ => None,
    })
}

/// [HTML § The lang attribute](https://html.spec.whatwg.org/multipage/dom.html#the-lang-and-xml:lang-attributes)
///
/// "If the node is an element that has a lang attribute in the XML namespace
/// set, ... that attribute. If the node is an HTML element or an element in
/// the SVG namespace, and it has a lang in no namespace attribute set, ...
/// that attribute. If neither ... the language of the node's parent element."
///
/// Shadow roots inherit from their host.
#[must_use]
pub fn resolve_language<A: TreeAdapter + ?Sized>(adapter: &A, node: A::Handle) -> Option<String> {
    let mut current = if adapter.node_kind(node) == NodeKind::Element {
        Some(node)
    } else {
        inheritance_parent(adapter, node)
    };
    while let Some(element) = current {
        let mut lang = None;
        for attr in adapter.attributes(element) {
            if attr.local_name != "lang" {
                continue;
            }
            match attr.namespace {
                Some(XML_NAMESPACE) => return Some(attr.value.to_string()),
                None if lang.is_none() => lang = Some(attr.value),
                _ => {}
            }
        }
        if let Some(lang) = lang {
            return Some(lang.to_string());
        }
        current = inheritance_parent(adapter, element);
    }
    None
}

impl TreeAdapter for DomTree {
    type Handle = NodeId;

    fn node_kind(&self, node: NodeId) -> NodeKind {
        match self.get(node).map(|n| &n.node_type) {
            Some(NodeType::Element(_)) => NodeKind::Element,
            Some(NodeType::Document) => NodeKind::Document,
            Some(NodeType::DocumentFragment) => NodeKind::DocumentFragment,
            Some(NodeType::ShadowRoot { .. }) => NodeKind::ShadowRoot,
            Some(NodeType::Text(_)) => NodeKind::Text,
            Some(NodeType::Comment(_)) => NodeKind::Comment,
            None => NodeKind::Other,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Self::parent(self, node)
    }

    fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        Self::prev_sibling(self, node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        Self::next_sibling(self, node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        Self::first_child(self, node)
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        Self::last_child(self, node)
    }

    fn local_name(&self, node: NodeId) -> Option<&str> {
        self.as_element(node).map(|e| e.local_name.as_str())
    }

    fn namespace_uri(&self, node: NodeId) -> Option<&str> {
        self.as_element(node).and_then(|e| e.namespace.as_deref())
    }

    fn attributes(&self, node: NodeId) -> impl Iterator<Item = AttrRef<'_>> {
        self.as_element(node)
            .into_iter()
            .flat_map(|e| e.attrs.iter())
            .map(|attr| AttrRef {
                namespace: attr.namespace.as_deref(),
                prefix: attr.prefix.as_deref(),
                local_name: &attr.local_name,
                value: &attr.value,
            })
    }

    fn id(&self, node: NodeId) -> Option<&str> {
        self.as_element(node).and_then(|e| e.id())
    }

    fn has_class(&self, node: NodeId, class_name: &str) -> bool {
        self.as_element(node).is_some_and(|e| e.has_class(class_name))
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.as_text(node)
    }

    fn shadow_root(&self, node: NodeId) -> Option<NodeId> {
        Self::shadow_root(self, node)
    }

    fn shadow_host(&self, node: NodeId) -> Option<NodeId> {
        Self::shadow_host(self, node)
    }

    fn assigned_slot(&self, node: NodeId) -> Option<NodeId> {
        Self::assigned_slot(self, node)
    }

    /// `xml` and `xmlns` are always bound; other prefixes come from
    /// `xmlns:prefix` declarations on the document element.
    fn lookup_namespace_uri(&self, prefix: &str) -> Option<&str> {
        match prefix {
            "xml" => Some(XML_NAMESPACE),
            "xmlns" => Some(XMLNS_NAMESPACE),
            _ => self
                .as_element(self.document_element()?)?
                .attrs
                .iter()
                .find(|attr| {
                    attr.namespace.as_deref() == Some(XMLNS_NAMESPACE)
                        && attr.prefix.as_deref() == Some("xmlns")
                        && attr.local_name == prefix
                })
                .map(|attr| attr.value.as_str()),
        }
    }

    fn is_html_document(&self) -> bool {
        Self::is_html_document(self)
    }

    fn is_defined(&self, node: NodeId) -> bool {
        self.as_element(node).is_none_or(|e| e.defined)
    }

    fn has_custom_state(&self, node: NodeId, state: &str) -> Result<bool, HostError> {
        Ok(self.as_element(node).is_some_and(|e| e.states.contains(state)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quoll_dom::ElementData;

    #[test]
    fn test_qualified_name_match() {
        let attr = AttrRef {
            namespace: Some(XML_NAMESPACE),
            prefix: Some("xml"),
            local_name: "lang",
            value: "en",
        };
        assert!(attr.has_qualified_name("xml:lang"));
        assert!(!attr.has_qualified_name("lang"));
        assert!(!attr.has_qualified_name("xml:langx"));
    }

    #[test]
    fn test_first_strong_direction() {
        assert_eq!(first_strong_direction("123 abc"), Some(Direction::Ltr));
        assert_eq!(first_strong_direction("  \u{05D0}bc"), Some(Direction::Rtl));
        assert_eq!(first_strong_direction("1234"), None);
    }

    #[test]
    fn test_auto_direction_skips_script() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let div = tree.append_element(root, ElementData::new("div").with_attr("dir", "auto"));
        let script = tree.append_element(div, ElementData::new("script"));
        let _ = tree.append_text(script, "abc");
        let _ = tree.append_text(div, "\u{0627}");
        assert_eq!(resolve_direction(&tree, div), Direction::Rtl);
    }

    #[test]
    fn test_language_prefers_xml_lang() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let div = tree.append_element(
            root,
            ElementData::new("div")
                .with_attr("lang", "en")
                .with_attr_ns(Some(XML_NAMESPACE), "xml:lang", "fr"),
        );
        let span = tree.append_element(div, ElementData::new("span"));
        assert_eq!(resolve_language(&tree, span).as_deref(), Some("fr"));
    }
}

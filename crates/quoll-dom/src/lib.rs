//! DOM tree implementation for the Quoll selector engine.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), including the parts
//! selector matching depends on: element namespaces, namespaced attributes,
//! shadow roots, slot assignment and custom element states.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues.

use std::collections::BTreeSet;

/// The HTML namespace.
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
/// The SVG namespace.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
/// The MathML namespace.
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
/// The XML namespace, bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
/// The XMLNS namespace, bound to the `xmlns` prefix.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// NodeId provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,
}

/// [§ 4.8 Interface ShadowRoot](https://dom.spec.whatwg.org/#interface-shadowroot)
///
/// "A shadow root's mode is either "open" or "closed"."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowRootMode {
    /// Reachable from script through the host.
    Open,
    /// Hidden from script; still part of the composed tree.
    Closed,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    DocumentFragment,
    /// [§ 4.8 Interface ShadowRoot](https://dom.spec.whatwg.org/#interface-shadowroot)
    /// "A shadow root is always attached to its host."
    ShadowRoot {
        /// The element this shadow root is attached to.
        host: NodeId,
        /// Open or closed.
        mode: ShadowRootMode,
    },
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
///
/// "Attr nodes are simply known as attributes. ... Attributes have a namespace
/// (null or a non-empty string), namespace prefix (null or a non-empty string),
/// local name (a non-empty string), value (a string)."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute namespace, `None` for ordinary HTML attributes.
    pub namespace: Option<String>,
    /// Namespace prefix as written, e.g. `xlink`.
    pub prefix: Option<String>,
    /// Local name.
    pub local_name: String,
    /// Attribute value.
    pub value: String,
}

impl Attribute {
    /// "An attribute's qualified name is its local name if its namespace prefix
    /// is null, and its namespace prefix, followed by ":", followed by its local
    /// name, otherwise."
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "Elements have an associated namespace, namespace prefix, local name, custom
/// element state, custom element definition, is value."
#[derive(Debug, Clone)]
pub struct ElementData {
    /// "An element's local name"
    pub local_name: String,
    /// "An element's namespace", `None` for the null namespace.
    pub namespace: Option<String>,
    /// "An element's namespace prefix"
    pub prefix: Option<String>,
    /// "An element has an associated attribute list", in insertion order.
    pub attrs: Vec<Attribute>,
    /// [§ 4.2.2 Shadow tree](https://dom.spec.whatwg.org/#concept-element-shadow-root)
    /// "An element has an associated shadow root (null or a shadow root)."
    pub shadow_root: Option<NodeId>,
    /// [HTML § 4.13.6 Custom state pseudo-class](https://html.spec.whatwg.org/multipage/custom-elements.html#custom-state-pseudo-class)
    /// The element's custom state set, exposed to `:state()`.
    pub states: BTreeSet<String>,
    /// Whether a custom element definition is attached (`:defined`).
    /// Built-in elements are always defined.
    pub defined: bool,
}

impl ElementData {
    /// Create an HTML element with no attributes.
    #[must_use]
    pub fn new(local_name: &str) -> Self {
        Self::new_ns(Some(HTML_NAMESPACE), local_name)
    }

    /// Create an element in `namespace` from a possibly prefixed qualified name
    /// such as `svg:rect`.
    #[must_use]
    pub fn new_ns(namespace: Option<&str>, qualified_name: &str) -> Self {
        let (prefix, local_name) = split_qualified_name(qualified_name);
        Self {
            local_name: local_name.to_string(),
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            attrs: Vec::new(),
            shadow_root: None,
            states: BTreeSet::new(),
            defined: !local_name.contains('-'),
        }
    }

    /// Builder form of [`ElementData::set_attribute`].
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`ElementData::set_attribute_ns`].
    #[must_use]
    pub fn with_attr_ns(mut self, namespace: Option<&str>, qualified_name: &str, value: &str) -> Self {
        self.set_attribute_ns(namespace, qualified_name, value);
        self
    }

    /// Builder that adds a custom state to the element's state set.
    #[must_use]
    pub fn with_state(mut self, state: &str) -> Self {
        let _ = self.states.insert(state.to_string());
        self
    }

    /// [§ 4.9 setAttribute](https://dom.spec.whatwg.org/#dom-element-setattribute)
    ///
    /// Sets a null-namespace attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        if let Some(existing) = self
            .attrs
            .iter_mut()
            .find(|attr| attr.namespace.is_none() && attr.qualified_name() == name)
        {
            existing.value = value.to_string();
            return;
        }
        self.attrs.push(Attribute {
            namespace: None,
            prefix: None,
            local_name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// [§ 4.9 setAttributeNS](https://dom.spec.whatwg.org/#dom-element-setattributens)
    pub fn set_attribute_ns(&mut self, namespace: Option<&str>, qualified_name: &str, value: &str) {
        let (prefix, local_name) = split_qualified_name(qualified_name);
        if let Some(existing) = self
            .attrs
            .iter_mut()
            .find(|attr| attr.namespace.as_deref() == namespace && attr.local_name == local_name)
        {
            existing.value = value.to_string();
            return;
        }
        self.attrs.push(Attribute {
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
            value: value.to_string(),
        });
    }

    /// [§ 4.9 getAttribute](https://dom.spec.whatwg.org/#dom-element-getattribute)
    ///
    /// "get an attribute by name": the first attribute whose qualified name is `name`.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.qualified_name() == name)
            .map(|attr| attr.value.as_str())
    }

    /// Returns true if an attribute with the given qualified name exists.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Iterate over the class names from the class attribute.
    ///
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens representing the various classes that the element belongs to."
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get_attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    /// Returns true if `class_name` is one of the element's classes.
    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes().any(|class| class == class_name)
    }

    /// Returns true if this element is in the HTML namespace.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.namespace.as_deref() == Some(HTML_NAMESPACE)
    }
}

/// Split `prefix:local` into its parts.
fn split_qualified_name(qualified_name: &str) -> (Option<&str>, &str) {
    match qualified_name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, qualified_name),
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// Shadow roots live in the same arena. They are not children of their host;
/// the host refers to them through [`ElementData::shadow_root`] and the shadow
/// root refers back through [`NodeType::ShadowRoot`].
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by NodeId.
    /// The Document node is always at index 0 (NodeId::ROOT).
    nodes: Vec<Node>,
    /// [§ 4.5](https://dom.spec.whatwg.org/#html-document)
    /// "A document is said to be an XML document if its type is "xml";
    /// otherwise an HTML document."
    html_document: bool,
}

impl DomTree {
    /// Create a new HTML document tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_document_type(true)
    }

    /// Create a new XML document tree. Names compare case-sensitively everywhere.
    #[must_use]
    pub fn new_xml() -> Self {
        Self::with_document_type(false)
    }

    fn with_document_type(html_document: bool) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            html_document,
        };
        let _ = tree.alloc(NodeType::Document);
        tree
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// True for HTML documents, false for XML documents.
    #[must_use]
    pub const fn is_html_document(&self) -> bool {
        self.html_document
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the arena, including detached ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty (it always holds at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`, updating all relationships.
    /// Ids that are not in the arena are ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return;
        }
        let prev_last_child = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// Allocate an element and append it to `parent` in one step.
    pub fn append_element(&mut self, parent: NodeId, element: ElementData) -> NodeId {
        let id = self.alloc(NodeType::Element(element));
        self.append_child(parent, id);
        id
    }

    /// Allocate a text node and append it to `parent` in one step.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(NodeType::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    /// [§ 4.9 attachShadow](https://dom.spec.whatwg.org/#dom-element-attachshadow)
    ///
    /// Attach a shadow root to `host` and return it. If the host already has a
    /// shadow root, that root is returned unchanged. Returns `None` when `host`
    /// is not an element.
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> Option<NodeId> {
        if let Some(existing) = self.as_element(host)?.shadow_root {
            return Some(existing);
        }
        let root = self.alloc(NodeType::ShadowRoot { host, mode });
        if let Some(NodeType::Element(data)) = self.get_mut(host).map(|n| &mut n.node_type) {
            data.shadow_root = Some(root);
        }
        Some(root)
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// Check if `descendant` is a descendant of `ancestor` (light tree only).
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// [§ 4.2.1 Root](https://dom.spec.whatwg.org/#concept-tree-root)
    ///
    /// "The root of an object is itself, if its parent is null, or else it is
    /// the root of its parent."
    #[must_use]
    pub fn tree_root(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Get the host of a shadow root.
    #[must_use]
    pub fn shadow_host(&self, id: NodeId) -> Option<NodeId> {
        match self.get(id).map(|n| &n.node_type) {
            Some(NodeType::ShadowRoot { host, .. }) => Some(*host),
            _ => None,
        }
    }

    /// Get the shadow root attached to an element.
    #[must_use]
    pub fn shadow_root(&self, id: NodeId) -> Option<NodeId> {
        self.as_element(id).and_then(|e| e.shadow_root)
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// [§ 4.2.2.3 Finding slots](https://dom.spec.whatwg.org/#find-a-slot)
    ///
    /// "To find a slot for a given slottable slottable ...:
    /// 1. If slottable's parent is null, then return null.
    /// 2. Let shadow be slottable's parent's shadow root.
    /// 3. If shadow is null, then return null.
    /// ...
    /// 6. Return the first slot in tree order in shadow's descendants whose name
    ///    is slottable's name, if any; otherwise null."
    #[must_use]
    pub fn assigned_slot(&self, id: NodeId) -> Option<NodeId> {
        let shadow = self.shadow_root(self.parent(id)?)?;
        let name = self
            .as_element(id)
            .and_then(|e| e.get_attribute("slot"))
            .unwrap_or_default();
        self.descendants(shadow).find(|&candidate| {
            self.as_element(candidate).is_some_and(|e| {
                e.is_html()
                    && e.local_name == "slot"
                    && e.get_attribute("name").unwrap_or_default() == name
            })
        })
    }

    /// [§ 4.2.2.3 Finding slottables](https://dom.spec.whatwg.org/#find-slottables)
    ///
    /// The element children of the slot's host that are assigned to `slot`.
    #[must_use]
    pub fn assigned_nodes(&self, slot: NodeId) -> Vec<NodeId> {
        let Some(root) = self.ancestors(slot).last() else {
            return Vec::new();
        };
        let Some(host) = self.shadow_host(root) else {
            return Vec::new();
        };
        self.children(host)
            .iter()
            .copied()
            .filter(|&child| self.assigned_slot(child) == Some(slot))
            .collect()
    }

    /// Iterate over the descendants of `id` in tree order, excluding `id` itself.
    /// Shadow trees are not entered.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            root: id,
            next: self.first_child(id),
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.first_child(id).or_else(|| {
            let mut current = id;
            loop {
                if current == self.root {
                    return None;
                }
                if let Some(sibling) = self.tree.next_sibling(current) {
                    return Some(sibling);
                }
                current = self.tree.parent(current)?;
            }
        });
        Some(id)
    }
}

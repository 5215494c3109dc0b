//! JSON tree fixtures and element paths.
//!
//! A fixture describes a document as nested objects:
//!
//! ```json
//! {
//!   "xml": false,
//!   "children": [
//!     { "tag": "html", "attrs": { "lang": "en" }, "children": [
//!       { "tag": "body", "children": [
//!         { "text": "hello" },
//!         { "tag": "x-card", "states": ["open"],
//!           "shadow": { "mode": "open", "children": [ { "tag": "slot" } ] } }
//!       ] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Paths address elements from the document by element child index, so `/0/1`
//! is the second element child of the document element. The `#shadow` segment
//! steps from a host into its shadow root.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use quoll_dom::{DomTree, ElementData, NodeId, NodeType, ShadowRootMode};
use quoll_selectors::escape_ident;
use serde::Deserialize;

/// Path segment that enters a shadow root.
const SHADOW_SEGMENT: &str = "#shadow";

/// The top-level fixture object.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentFixture {
    /// Build an XML document instead of an HTML one.
    #[serde(default)]
    xml: bool,
    #[serde(default)]
    children: Vec<NodeFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeFixture {
    Element(Box<ElementFixture>),
    Text { text: String },
    Comment { comment: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ElementFixture {
    /// Qualified name, e.g. `div` or `svg:rect`.
    tag: String,
    /// Element namespace. Absent means HTML; an empty string means null.
    namespace: Option<String>,
    #[serde(default)]
    attrs: BTreeMap<String, String>,
    #[serde(default)]
    attrs_ns: Vec<NamespacedAttrFixture>,
    #[serde(default)]
    states: Vec<String>,
    /// Overrides the custom element definition flag.
    defined: Option<bool>,
    #[serde(default)]
    children: Vec<NodeFixture>,
    shadow: Option<ShadowFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NamespacedAttrFixture {
    namespace: Option<String>,
    /// Qualified name, e.g. `xlink:href`.
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShadowFixture {
    #[serde(default)]
    mode: ModeFixture,
    #[serde(default)]
    children: Vec<NodeFixture>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ModeFixture {
    #[default]
    Open,
    Closed,
}

impl From<ModeFixture> for ShadowRootMode {
    fn from(mode: ModeFixture) -> Self {
        match mode {
            ModeFixture::Open => Self::Open,
            ModeFixture::Closed => Self::Closed,
        }
    }
}

/// Read and build a fixture file.
pub fn load(path: &Path) -> Result<DomTree> {
    let source = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse(&source).with_context(|| format!("invalid tree fixture {}", path.display()))
}

/// Build a tree from fixture JSON.
pub fn parse(source: &str) -> Result<DomTree> {
    let fixture: DocumentFixture = serde_json::from_str(source)?;
    let mut tree = if fixture.xml { DomTree::new_xml() } else { DomTree::new() };
    build_children(&mut tree, NodeId::ROOT, fixture.children)?;
    Ok(tree)
}

fn build_children(tree: &mut DomTree, parent: NodeId, children: Vec<NodeFixture>) -> Result<()> {
    for child in children {
        match child {
            NodeFixture::Text { text } => {
                let _ = tree.append_text(parent, &text);
            }
            NodeFixture::Comment { comment } => {
                let id = tree.alloc(NodeType::Comment(comment));
                tree.append_child(parent, id);
            }
            NodeFixture::Element(element) => build_element(tree, parent, *element)?,
        }
    }
    Ok(())
}

fn build_element(tree: &mut DomTree, parent: NodeId, fixture: ElementFixture) -> Result<()> {
    let mut data = match fixture.namespace.as_deref() {
        None => ElementData::new(&fixture.tag),
        Some("") => ElementData::new_ns(None, &fixture.tag),
        Some(namespace) => ElementData::new_ns(Some(namespace), &fixture.tag),
    };
    for (name, value) in &fixture.attrs {
        data.set_attribute(name, value);
    }
    for attr in &fixture.attrs_ns {
        let namespace = attr.namespace.as_deref().filter(|ns| !ns.is_empty());
        data.set_attribute_ns(namespace, &attr.name, &attr.value);
    }
    for state in &fixture.states {
        data = data.with_state(state);
    }
    if let Some(defined) = fixture.defined {
        data.defined = defined;
    }

    let id = tree.append_element(parent, data);
    build_children(tree, id, fixture.children)?;
    if let Some(shadow) = fixture.shadow {
        let Some(root) = tree.attach_shadow(id, shadow.mode.into()) else {
            bail!("cannot attach a shadow root to <{}>", fixture.tag);
        };
        build_children(tree, root, shadow.children)?;
    }
    Ok(())
}

fn element_children(tree: &DomTree, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.children(parent)
        .iter()
        .copied()
        .filter(|&child| tree.as_element(child).is_some())
}

/// Resolve a `/`-separated element path, starting at the document.
pub fn resolve(tree: &DomTree, path: &str) -> Result<NodeId> {
    let mut node = NodeId::ROOT;
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        node = if segment == SHADOW_SEGMENT {
            tree.shadow_root(node)
                .with_context(|| format!("no shadow root at '{path}'"))?
        } else {
            let index: usize = segment
                .parse()
                .with_context(|| format!("invalid path segment '{segment}'"))?;
            element_children(tree, node)
                .nth(index)
                .with_context(|| format!("no element child {index} in '{path}'"))?
        };
    }
    Ok(node)
}

/// The path that [`resolve`] maps back to `node`.
pub fn path_of(tree: &DomTree, node: NodeId) -> String {
    let mut segments = Vec::new();
    let mut current = node;
    loop {
        if let Some(host) = tree.shadow_host(current) {
            segments.push(SHADOW_SEGMENT.to_string());
            current = host;
            continue;
        }
        let Some(parent) = tree.parent(current) else {
            break;
        };
        if let Some(index) = element_children(tree, parent).position(|child| child == current) {
            segments.push(index.to_string());
        }
        current = parent;
    }
    segments.reverse();
    format!("/{}", segments.join("/"))
}

/// A short `tag#id.class` label for an element, with the id and classes
/// serialized as identifiers.
pub fn label(tree: &DomTree, node: NodeId) -> String {
    let Some(element) = tree.as_element(node) else {
        return "#document".to_string();
    };
    let mut label = element.local_name.clone();
    if let Some(id) = element.id() {
        label.push('#');
        label.push_str(&escape_ident(id));
    }
    for class in element.classes() {
        label.push('.');
        label.push_str(&escape_ident(class));
    }
    label
}

//! Tests for DOM tree construction, traversal, namespaces and shadow trees.

use quoll_dom::{DomTree, ElementData, HTML_NAMESPACE, NodeId, NodeType, SVG_NAMESPACE, ShadowRootMode, XML_NAMESPACE};

/// Helper to build `<html><body>` and return the body.
fn body(tree: &mut DomTree) -> NodeId {
    let html = tree.append_element(NodeId::ROOT, ElementData::new("html"));
    tree.append_element(html, ElementData::new("body"))
}

// ========== construction and traversal ==========

#[test]
fn test_append_links_siblings() {
    let mut tree = DomTree::new();
    let parent = body(&mut tree);
    let a = tree.append_element(parent, ElementData::new("a"));
    let b = tree.append_element(parent, ElementData::new("b"));
    let c = tree.append_element(parent, ElementData::new("c"));

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.first_child(parent), Some(a));
    assert_eq!(tree.last_child(parent), Some(c));
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.preceding_siblings(c).collect::<Vec<_>>(), vec![b, a]);
}

#[test]
fn test_descendants_in_tree_order_excluding_root() {
    let mut tree = DomTree::new();
    let parent = body(&mut tree);
    let ul = tree.append_element(parent, ElementData::new("ul"));
    let li1 = tree.append_element(ul, ElementData::new("li"));
    let text = tree.append_text(li1, "one");
    let li2 = tree.append_element(ul, ElementData::new("li"));
    let p = tree.append_element(parent, ElementData::new("p"));

    let order: Vec<NodeId> = tree.descendants(parent).collect();
    assert_eq!(order, vec![ul, li1, text, li2, p]);
    assert!(tree.descendants(li2).next().is_none());
}

#[test]
fn test_document_element_and_tree_root() {
    let mut tree = DomTree::new();
    let comment = tree.alloc(NodeType::Comment("doctype-ish".to_string()));
    tree.append_child(NodeId::ROOT, comment);
    let html = tree.append_element(NodeId::ROOT, ElementData::new("html"));
    let head = tree.append_element(html, ElementData::new("head"));

    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.tree_root(head), NodeId::ROOT);
    assert!(tree.is_descendant_of(head, NodeId::ROOT));
    assert!(!tree.is_descendant_of(html, head));
}

#[test]
fn test_append_ignores_unknown_ids() {
    let mut tree = DomTree::new();
    tree.append_child(NodeId::ROOT, NodeId(99));
    assert!(tree.children(NodeId::ROOT).is_empty());
    assert_eq!(tree.len(), 1);
}

// ========== elements and attributes ==========

#[test]
fn test_html_element_defaults() {
    let element = ElementData::new("div");
    assert!(element.is_html());
    assert_eq!(element.namespace.as_deref(), Some(HTML_NAMESPACE));
    assert!(element.defined);
    assert!(!ElementData::new("x-widget").defined);
}

#[test]
fn test_set_attribute_replaces_value() {
    let mut element = ElementData::new("input").with_attr("type", "text");
    element.set_attribute("type", "checkbox");
    assert_eq!(element.attrs.len(), 1);
    assert_eq!(element.get_attribute("type"), Some("checkbox"));
}

#[test]
fn test_class_and_id_helpers() {
    let element = ElementData::new("p")
        .with_attr("id", "intro")
        .with_attr("class", "  lead\tlarge ");
    assert_eq!(element.id(), Some("intro"));
    assert_eq!(element.classes().collect::<Vec<_>>(), vec!["lead", "large"]);
    assert!(element.has_class("large"));
    assert!(!element.has_class("lea"));
}

#[test]
fn test_namespaced_elements_and_attributes() {
    let element = ElementData::new_ns(Some(SVG_NAMESPACE), "svg:rect")
        .with_attr_ns(Some(XML_NAMESPACE), "xml:lang", "fr")
        .with_attr("lang", "de");

    assert_eq!(element.local_name, "rect");
    assert_eq!(element.prefix.as_deref(), Some("svg"));
    assert!(!element.is_html());
    assert_eq!(element.get_attribute("xml:lang"), Some("fr"));
    assert_eq!(element.get_attribute("lang"), Some("de"));
    assert_eq!(element.attrs[0].qualified_name(), "xml:lang");
    assert_eq!(element.attrs[0].local_name, "lang");
}

#[test]
fn test_custom_states() {
    let element = ElementData::new("x-toggle").with_state("checked");
    assert!(element.states.contains("checked"));
    assert!(!element.states.contains("pressed"));
}

#[test]
fn test_xml_document_flag() {
    assert!(DomTree::new().is_html_document());
    assert!(!DomTree::new_xml().is_html_document());
}

// ========== shadow trees ==========

#[test]
fn test_attach_shadow_links_host_and_root() {
    let mut tree = DomTree::new();
    let parent = body(&mut tree);
    let host = tree.append_element(parent, ElementData::new("x-card"));

    let root = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
    assert_eq!(tree.shadow_root(host), Some(root));
    assert_eq!(tree.shadow_host(root), Some(host));
    assert_eq!(tree.attach_shadow(host, ShadowRootMode::Closed), Some(root));
    // The shadow root is not a child of its host.
    assert!(tree.children(host).is_empty());
    assert_eq!(tree.parent(root), None);
}

#[test]
fn test_attach_shadow_requires_element() {
    let mut tree = DomTree::new();
    let text = tree.append_text(NodeId::ROOT, "x");
    assert_eq!(tree.attach_shadow(text, ShadowRootMode::Open), None);
}

#[test]
fn test_slot_assignment_by_name() {
    let mut tree = DomTree::new();
    let parent = body(&mut tree);
    let host = tree.append_element(parent, ElementData::new("x-card"));
    let title = tree.append_element(host, ElementData::new("h2").with_attr("slot", "title"));
    let content = tree.append_element(host, ElementData::new("p"));
    let orphan = tree.append_element(host, ElementData::new("p").with_attr("slot", "missing"));

    let root = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let header = tree.append_element(root, ElementData::new("header"));
    let named = tree.append_element(header, ElementData::new("slot").with_attr("name", "title"));
    let default = tree.append_element(root, ElementData::new("slot"));

    assert_eq!(tree.assigned_slot(title), Some(named));
    assert_eq!(tree.assigned_slot(content), Some(default));
    assert_eq!(tree.assigned_slot(orphan), None);
    assert_eq!(tree.assigned_slot(header), None);
    assert_eq!(tree.assigned_nodes(named), vec![title]);
    assert_eq!(tree.assigned_nodes(default), vec![content]);
}

//! Tests for matching in shadow tree context: `:host`, `:host-context()`,
//! `::slotted()` and `::part()`.

use quoll_dom::{DomTree, ElementData, NodeId, ShadowRootMode};
use quoll_selectors::{Query, Selectors};

/// A `<x-card>` host with light children and an attached shadow tree.
struct Card {
    tree: DomTree,
    body: NodeId,
    host: NodeId,
    light_title: NodeId,
    light_text: NodeId,
    shadow: NodeId,
    header: NodeId,
    title_slot: NodeId,
    default_slot: NodeId,
    label: NodeId,
}

/// Helper to build:
///
/// ```text
/// <body>
///   <x-card id=card class=dark lang=fr>
///     #shadow-root
///       <header><slot name=title></header>
///       <div class=content><slot></div>
///       <span part="label icon">
///     <h2 slot=title>
///     <p>
/// ```
fn card() -> Card {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, ElementData::new("html"));
    let body = tree.append_element(html, ElementData::new("body"));
    let host = tree.append_element(
        body,
        ElementData::new("x-card")
            .with_attr("id", "card")
            .with_attr("class", "dark")
            .with_attr("lang", "fr"),
    );
    let light_title = tree.append_element(host, ElementData::new("h2").with_attr("slot", "title"));
    let light_text = tree.append_element(host, ElementData::new("p"));

    let shadow = tree.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let header = tree.append_element(shadow, ElementData::new("header"));
    let title_slot = tree.append_element(header, ElementData::new("slot").with_attr("name", "title"));
    let content = tree.append_element(shadow, ElementData::new("div").with_attr("class", "content"));
    let default_slot = tree.append_element(content, ElementData::new("slot"));
    let label = tree.append_element(shadow, ElementData::new("span").with_attr("part", "label icon"));

    Card {
        tree,
        body,
        host,
        light_title,
        light_text,
        shadow,
        header,
        title_slot,
        default_slot,
        label,
    }
}

/// Helper to test `node` with the query scoped to the card's shadow root.
fn in_shadow(card: &Card, selector: &str, node: NodeId) -> bool {
    let selectors = Selectors::parse(selector).unwrap();
    Query::new(&card.tree, &selectors)
        .scope(card.shadow)
        .matches(node)
        .unwrap()
}

/// Helper to test `node` without a shadow scope.
fn in_light(card: &Card, selector: &str, node: NodeId) -> bool {
    Selectors::parse(selector).unwrap().matches(&card.tree, node).unwrap()
}

// ========== :host ==========

#[test]
fn test_host_matches_only_in_shadow_context() {
    let card = card();
    assert!(in_shadow(&card, ":host", card.host));
    assert!(in_shadow(&card, ":host(.dark)", card.host));
    assert!(in_shadow(&card, ":host(x-card#card)", card.host));
    assert!(!in_shadow(&card, ":host(.light)", card.host));
    assert!(!in_light(&card, ":host", card.host));
    assert!(!in_shadow(&card, ":host", card.header));
}

#[test]
fn test_host_is_featureless() {
    let card = card();
    assert!(!in_shadow(&card, "x-card", card.host));
    assert!(!in_shadow(&card, ".dark", card.host));
    assert!(!in_shadow(&card, ":first-child", card.host));
    // Logical pseudo-classes still apply.
    assert!(in_shadow(&card, ":is(:host, div)", card.host));
    assert!(in_shadow(&card, ":not(:host(.light))", card.host));
    // In its own tree the host is an ordinary element.
    assert!(in_light(&card, "body > x-card.dark", card.host));
}

#[test]
fn test_host_context_checks_ancestors() {
    let card = card();
    assert!(in_shadow(&card, ":host-context(body)", card.host));
    assert!(in_shadow(&card, ":host-context(.dark)", card.host));
    assert!(!in_shadow(&card, ":host-context(section)", card.host));
    assert!(!in_light(&card, ":host-context(body)", card.host));
}

#[test]
fn test_combinators_reach_the_host() {
    let card = card();
    assert!(in_shadow(&card, ":host > header", card.header));
    assert!(in_shadow(&card, ":host(.dark) slot", card.title_slot));
    assert!(in_shadow(&card, ":host-context(body) .content > slot", card.default_slot));
    // The shadow boundary stops every other ancestor walk.
    assert!(!in_shadow(&card, "body header", card.header));
    assert!(!in_shadow(&card, "x-card header", card.header));
    assert!(!in_light(&card, ":host > header", card.header));
}

#[test]
fn test_queries_in_shadow_tree() {
    let card = card();
    let selectors = Selectors::parse(":host > *").unwrap();
    let query = Query::new(&card.tree, &selectors).scope(card.shadow);
    let found: Vec<NodeId> = query.all_matches(card.shadow).map(Result::unwrap).collect();
    assert_eq!(found.len(), 3);
    assert_eq!(found[0], card.header);
    assert_eq!(found[2], card.label);

    // Light-tree traversal does not enter the shadow tree.
    let spans = Selectors::parse("span").unwrap();
    assert_eq!(spans.first_match(&card.tree, NodeId::ROOT).unwrap(), None);
    assert!(!in_light(&card, "x-card:has(span)", card.host));
    assert!(in_light(&card, "x-card:has(> h2)", card.host));
}

#[test]
fn test_closest_steps_to_host() {
    let card = card();
    let selectors = Selectors::parse(":host").unwrap();
    let query = Query::new(&card.tree, &selectors).scope(card.shadow);
    assert_eq!(query.closest(card.title_slot).unwrap(), Some(card.host));

    let body = Selectors::parse("body").unwrap();
    let query = Query::new(&card.tree, &body).scope(card.shadow);
    assert_eq!(query.closest(card.title_slot).unwrap(), None);
    assert_eq!(body.closest(&card.tree, card.light_text).unwrap(), Some(card.body));
}

// ========== ::slotted() ==========

#[test]
fn test_slotted_matches_assigned_light_children() {
    let card = card();
    assert!(in_shadow(&card, "::slotted(h2)", card.light_title));
    assert!(in_shadow(&card, "::slotted(*)", card.light_text));
    assert!(!in_shadow(&card, "::slotted(p)", card.light_title));
    assert!(!in_light(&card, "::slotted(h2)", card.light_title));
}

#[test]
fn test_slotted_compound_applies_to_the_slot() {
    let card = card();
    assert!(in_shadow(&card, "slot[name=title]::slotted(h2)", card.light_title));
    assert!(!in_shadow(&card, "slot[name=title]::slotted(p)", card.light_text));
    assert!(in_shadow(&card, "header > ::slotted(h2)", card.light_title));
    assert!(in_shadow(&card, ".content ::slotted(p)", card.light_text));
    assert!(in_shadow(&card, ":host .content ::slotted(p)", card.light_text));
    assert!(!in_shadow(&card, "header ::slotted(p)", card.light_text));
}

// ========== ::part() ==========

#[test]
fn test_part_matches_exposed_shadow_elements() {
    let card = card();
    assert!(in_light(&card, "x-card::part(label)", card.label));
    assert!(in_light(&card, "#card::part(icon label)", card.label));
    assert!(in_light(&card, "body > .dark::part(icon)", card.label));
    assert!(!in_light(&card, "x-card::part(missing)", card.label));
    assert!(!in_light(&card, "div::part(label)", card.label));
    assert!(!in_light(&card, "x-card::part(label)", card.header));
}

// ========== inherited state across the boundary ==========

#[test]
fn test_language_and_focus_cross_the_boundary() {
    let card = card();
    assert!(in_shadow(&card, ":lang(fr)", card.label));

    let selectors = Selectors::parse("x-card:focus-within").unwrap();
    let query = Query::new(&card.tree, &selectors).focus(card.label);
    assert!(query.matches(card.host).unwrap());
}

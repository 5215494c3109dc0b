//! Tests for selector matching against a DOM tree.

use quoll_dom::{DomTree, ElementData, NodeId, NodeType, SVG_NAMESPACE, XMLNS_NAMESPACE};
use quoll_selectors::{
    Error, NamedPseudoElement, Query, Selectors, closest, matches, query_selector, query_selector_all,
};

/// Helper to append an HTML element.
fn element(tree: &mut DomTree, parent: NodeId, name: &str) -> NodeId {
    tree.append_element(parent, ElementData::new(name))
}

/// Helper to append an HTML element with attributes.
fn element_with(tree: &mut DomTree, parent: NodeId, name: &str, attrs: &[(&str, &str)]) -> NodeId {
    let data = attrs
        .iter()
        .fold(ElementData::new(name), |data, (name, value)| data.with_attr(name, value));
    tree.append_element(parent, data)
}

/// Helper to build `<html><body>` and return both.
fn document() -> (DomTree, NodeId, NodeId) {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, "html");
    let body = element(&mut tree, html, "body");
    (tree, html, body)
}

/// Helper to parse and test one node.
fn is_match(tree: &DomTree, selector: &str, node: NodeId) -> bool {
    Selectors::parse(selector).unwrap().matches(tree, node).unwrap()
}

/// Helper to collect every match under the document.
fn select_all(tree: &DomTree, selector: &str) -> Vec<NodeId> {
    query_selector_all(selector, tree, NodeId::ROOT).unwrap()
}

// ========== combinators ==========

#[test]
fn test_child_combinator_and_closest() {
    let (mut tree, _, body) = document();
    let div = element(&mut tree, body, "div");
    let ul = element(&mut tree, div, "ul");
    let li = element(&mut tree, ul, "li");

    assert!(matches("ul > li", &tree, li).unwrap());
    assert!(!matches("div > li", &tree, li).unwrap());
    assert_eq!(closest("ul", &tree, li).unwrap(), Some(ul));
    assert_eq!(closest("li", &tree, li).unwrap(), Some(li));
    assert_eq!(closest("table", &tree, li).unwrap(), None);
}

#[test]
fn test_descendant_backtracks_over_ancestors() {
    let (mut tree, _, body) = document();
    let outer = element_with(&mut tree, body, "div", &[("class", "a")]);
    let inner = element(&mut tree, outer, "div");
    let section = element(&mut tree, inner, "section");
    let p = element(&mut tree, section, "p");

    // The nearest div is not `.a`; the farther one is.
    assert!(is_match(&tree, "div.a section p", p));
    assert!(is_match(&tree, "div.a > div p", p));
    assert!(!is_match(&tree, "div.a > section p", p));
    assert!(is_match(&tree, "html p", p));
}

#[test]
fn test_sibling_combinators_skip_non_elements() {
    let (mut tree, _, body) = document();
    let h1 = element(&mut tree, body, "h1");
    let _ = tree.append_text(body, "text between");
    let comment = tree.alloc(NodeType::Comment("note".to_string()));
    tree.append_child(body, comment);
    let p1 = element(&mut tree, body, "p");
    let p2 = element(&mut tree, body, "p");

    assert!(is_match(&tree, "h1 + p", p1));
    assert!(!is_match(&tree, "h1 + p", p2));
    assert!(is_match(&tree, "h1 ~ p", p2));
    assert!(is_match(&tree, "p + p", p2));
    assert!(!is_match(&tree, "p ~ h1", h1));
}

#[test]
fn test_mixed_combinator_chain() {
    let (mut tree, _, body) = document();
    let nav = element(&mut tree, body, "nav");
    let ul = element(&mut tree, nav, "ul");
    let first = element_with(&mut tree, ul, "li", &[("class", "first")]);
    let _ = element(&mut tree, ul, "li");
    let last = element(&mut tree, ul, "li");
    let a = element(&mut tree, last, "a");

    assert!(is_match(&tree, "nav > ul li.first ~ li > a", a));
    assert!(!is_match(&tree, "nav > ul li.first + li > a", a));
    assert!(!is_match(&tree, "li.first ~ li", first));
}

#[test]
fn test_descendant_walk_on_deep_chain() {
    let (mut tree, _, body) = document();
    let mut parent = body;
    for _ in 0..200 {
        parent = element(&mut tree, parent, "div");
    }
    let span = element(&mut tree, parent, "span");

    // No `p` above any div: the first failed ancestor walk ends matching.
    assert!(!is_match(&tree, "p div div div div div div div span", span));
    assert!(!is_match(&tree, "p > div div > div div div div div span", span));
    assert!(is_match(&tree, "body div div div div div div div span", span));
    assert!(is_match(&tree, "html > body > div div span", span));
    assert_eq!(select_all(&tree, "p div span"), Vec::<NodeId>::new());
}

#[test]
fn test_child_failure_retries_higher_descendant() {
    let (mut tree, _, body) = document();
    let div = element(&mut tree, body, "div");
    let p = element(&mut tree, div, "p");
    let article = element(&mut tree, p, "article");
    let inner = element(&mut tree, article, "p");
    let span = element(&mut tree, inner, "span");

    // The nearest `p` sits under `article`; the outer one is the div's child.
    assert!(is_match(&tree, "div > p span", span));
    assert!(is_match(&tree, "body > div > p span", span));
    assert!(!is_match(&tree, "section > p span", span));
}

#[test]
fn test_sibling_failure_retries_earlier_sibling_and_ancestor() {
    let (mut tree, _, body) = document();
    let outer = element(&mut tree, body, "section");
    let h1 = element(&mut tree, outer, "h1");
    let _ = element(&mut tree, outer, "p");
    let _ = element(&mut tree, outer, "div");
    let inner = element(&mut tree, outer, "section");
    let _ = element(&mut tree, inner, "h2");
    let last = element(&mut tree, inner, "span");

    // `h1 + p` is found two siblings back, past a `div`.
    assert!(is_match(&tree, "h1 + p ~ section span", last));
    assert!(is_match(&tree, "h1 ~ section span", last));
    assert!(is_match(&tree, "h2 ~ span", last));
    // No `h1 + div` before the inner section, nor any sibling before the outer one.
    assert!(!is_match(&tree, "h1 + div ~ section span", last));
    assert!(!is_match(&tree, "h1 ~ span", last));
    assert!(is_match(&tree, "section > h1 ~ section > h2 + span", last));
    assert_eq!(select_all(&tree, "h1 + p ~ *"), vec![tree.children(outer)[2], inner]);
    assert!(!is_match(&tree, "h1 + p", h1));
}

// ========== simple selectors ==========

#[test]
fn test_type_names_in_html_and_xml() {
    let (mut tree, _, body) = document();
    let div = element(&mut tree, body, "div");
    assert!(is_match(&tree, "DIV", div));
    assert!(is_match(&tree, "*", div));

    let mut xml = DomTree::new_xml();
    let root = xml.append_element(NodeId::ROOT, ElementData::new_ns(None, "Item"));
    assert!(is_match(&xml, "Item", root));
    assert!(!is_match(&xml, "item", root));
}

#[test]
fn test_id_and_class() {
    let (mut tree, _, body) = document();
    let p = element_with(&mut tree, body, "p", &[("id", "intro"), ("class", "lead  large")]);
    assert!(is_match(&tree, "#intro", p));
    assert!(is_match(&tree, "p.lead.large", p));
    assert!(!is_match(&tree, ".Lead", p));
    assert!(!is_match(&tree, "#Intro", p));
    assert!(is_match(&tree, "#\\69 ntro", p));
}

#[test]
fn test_attribute_operators() {
    let (mut tree, _, body) = document();
    let a = element_with(
        &mut tree,
        body,
        "a",
        &[
            ("href", "https://example.com/docs.pdf"),
            ("rel", "nofollow noopener"),
            ("hreflang", "en-US"),
            ("title", "Docs"),
            ("data-empty", ""),
        ],
    );

    for selector in [
        "[href]",
        "[HREF]",
        "[title=Docs]",
        "[rel~=noopener]",
        "[hreflang|=en]",
        "[href^=https]",
        "[href$='.pdf']",
        "[href*=example]",
        "[data-empty]",
        "[data-empty='']",
        "[title=docs i]",
    ] {
        assert!(is_match(&tree, selector, a), "{selector} should match");
    }
    for selector in [
        "[title=docs]",
        "[rel~='no follow']",
        "[rel~='']",
        "[hreflang|=e]",
        "[data-empty^='']",
        "[data-empty*='']",
        "[missing]",
    ] {
        assert!(!is_match(&tree, selector, a), "{selector} should not match");
    }
}

#[test]
fn test_attribute_value_case_list() {
    let (mut tree, _, body) = document();
    let input = element_with(&mut tree, body, "input", &[("type", "CheckBox"), ("name", "Agree")]);

    // `type` is on the HTML case-insensitive list, `name` is not.
    assert!(is_match(&tree, "[type=checkbox]", input));
    assert!(!is_match(&tree, "[type=checkbox s]", input));
    assert!(!is_match(&tree, "[name=agree]", input));
    assert!(is_match(&tree, "[name=agree i]", input));
}

// ========== namespaces ==========

#[test]
fn test_namespace_prefixes() {
    let (mut tree, html, body) = document();
    if let Some(data) = tree.as_element_mut(html) {
        data.set_attribute_ns(Some(XMLNS_NAMESPACE), "xmlns:svg", SVG_NAMESPACE);
    }
    let svg = tree.append_element(body, ElementData::new_ns(Some(SVG_NAMESPACE), "svg"));
    let rect = tree.append_element(svg, ElementData::new_ns(Some(SVG_NAMESPACE), "rect"));
    let plain = tree.append_element(body, ElementData::new_ns(None, "rect"));

    // Declared on the document element.
    assert!(is_match(&tree, "svg|rect", rect));
    assert!(!is_match(&tree, "svg|rect", plain));
    assert!(is_match(&tree, "|rect", plain));
    assert!(!is_match(&tree, "|rect", rect));
    assert!(is_match(&tree, "*|rect", rect));

    // Bound by the query.
    let selectors = Selectors::parse("g|rect").unwrap();
    let query = Query::new(&tree, &selectors).namespace("g", SVG_NAMESPACE);
    assert!(query.matches(rect).unwrap());

    // Unbound prefixes are reported when matching.
    let err = matches("nope|rect", &tree, rect).unwrap_err();
    assert!(matches!(&err, Error::InvalidSelector(invalid) if invalid.selector() == "nope|rect"));
}

#[test]
fn test_namespaced_attributes() {
    let (mut tree, _, body) = document();
    let svg = tree.append_element(body, ElementData::new_ns(Some(SVG_NAMESPACE), "svg"));
    let link = tree.append_element(
        svg,
        ElementData::new_ns(Some(SVG_NAMESPACE), "a")
            .with_attr_ns(Some("http://www.w3.org/1999/xlink"), "xlink:href", "#target"),
    );
    let selectors = Selectors::parse("[x|href^='#']").unwrap();
    let query = Query::new(&tree, &selectors).namespace("x", "http://www.w3.org/1999/xlink");
    assert!(query.matches(link).unwrap());
    assert!(is_match(&tree, "[href]", link));
    assert!(!is_match(&tree, "[|href]", link));
}

// ========== logical pseudo-classes ==========

#[test]
fn test_not_is_where() {
    let (mut tree, _, body) = document();
    let p = element_with(&mut tree, body, "p", &[("class", "note")]);

    assert!(is_match(&tree, ":is(div, p)", p));
    assert!(is_match(&tree, ":where(.note)", p));
    assert!(!is_match(&tree, ":not(.note)", p));
    assert!(is_match(&tree, "p:not(div, .warning)", p));
    assert!(is_match(&tree, "body :is(p:not(.x), span)", p));
    // Forgiving parsing leaves an empty list, which matches nothing.
    assert!(!is_match(&tree, ":is(..bad)", p));
    assert!(is_match(&tree, ":not(:is(..bad))", p));
}

#[test]
fn test_empty_logical_arguments() {
    let (mut tree, html, body) = document();
    let p = element(&mut tree, body, "p");

    for node in [html, body, p] {
        assert!(is_match(&tree, ":not()", node));
        assert!(!is_match(&tree, ":is()", node));
        assert!(!is_match(&tree, ":where()", node));
        assert!(!is_match(&tree, ":has()", node));
    }
    assert!(is_match(&tree, "html:not()", html));
    assert!(!is_match(&tree, "html:has()", html));
    assert_eq!(select_all(&tree, ":not( )"), vec![html, body, p]);
    assert!(select_all(&tree, ":is( )").is_empty());
}

#[test]
fn test_has_relative_selectors() {
    let (mut tree, _, body) = document();
    let section = element(&mut tree, body, "section");
    let header = element(&mut tree, section, "header");
    let h2 = element(&mut tree, header, "h2");
    let figure = element(&mut tree, body, "figure");
    let caption = element(&mut tree, body, "figcaption");
    let _ = element(&mut tree, caption, "em");

    assert!(is_match(&tree, "section:has(h2)", section));
    assert!(is_match(&tree, "section:has(> header > h2)", section));
    assert!(!is_match(&tree, "section:has(> h2)", section));
    assert!(is_match(&tree, "section:has(+ figure)", section));
    assert!(!is_match(&tree, "section:has(+ figcaption)", section));
    assert!(is_match(&tree, "section:has(~ figcaption em)", section));
    assert!(is_match(&tree, "figure:has(+ figcaption > em)", figure));
    assert!(!is_match(&tree, "h2:has(*)", h2));
    // The anchor itself is never a candidate.
    assert!(!is_match(&tree, "header:has(header)", header));
    assert!(is_match(&tree, "body:has(section h2, .missing)", body));
}

#[test]
fn test_has_anchors_descendant_walk() {
    let (mut tree, _, body) = document();
    let outer = element_with(&mut tree, body, "div", &[("class", "x")]);
    let inner = element(&mut tree, outer, "div");
    let _ = element(&mut tree, inner, "span");

    // `.x span` inside `:has()` must find `.x` below the anchor.
    assert!(!is_match(&tree, "div:has(.x span)", outer));
    assert!(is_match(&tree, "body:has(.x span)", body));
}

// ========== tree-structural pseudo-classes ==========

#[test]
fn test_nth_child_positions() {
    let (mut tree, _, body) = document();
    let ul = element(&mut tree, body, "ul");
    let items: Vec<NodeId> = (0..6).map(|_| element(&mut tree, ul, "li")).collect();

    let odd: Vec<bool> = items
        .iter()
        .map(|&li| is_match(&tree, ":nth-child(2n+1)", li))
        .collect();
    assert_eq!(odd, vec![true, false, true, false, true, false]);
    assert!(is_match(&tree, ":nth-child(even)", items[1]));
    assert!(is_match(&tree, ":nth-child(-n+2)", items[1]));
    assert!(!is_match(&tree, ":nth-child(-n+2)", items[2]));
    assert!(is_match(&tree, ":nth-child(3)", items[2]));
    assert!(is_match(&tree, ":nth-last-child(1)", items[5]));
    assert!(is_match(&tree, ":nth-last-child(2n)", items[4]));
    assert!(is_match(&tree, ":first-child", items[0]));
    assert!(is_match(&tree, ":last-child", items[5]));
    assert!(!is_match(&tree, ":only-child", items[0]));
    assert!(is_match(&tree, ":only-child", ul));
}

#[test]
fn test_nth_child_of_selector() {
    let (mut tree, _, body) = document();
    let ul = element(&mut tree, body, "ul");
    let a = element_with(&mut tree, ul, "li", &[("class", "foo")]);
    let b = element(&mut tree, ul, "li");
    let c = element_with(&mut tree, ul, "li", &[("class", "foo")]);
    let d = element_with(&mut tree, ul, "li", &[("class", "foo")]);

    // Positions among `.foo` siblings: a=1, c=2, d=3.
    assert!(is_match(&tree, ":nth-child(odd of .foo)", a));
    assert!(!is_match(&tree, ":nth-child(odd of .foo)", b));
    assert!(!is_match(&tree, ":nth-child(odd of .foo)", c));
    assert!(is_match(&tree, ":nth-child(odd of .foo)", d));
    assert!(is_match(&tree, ":nth-last-child(1 of .foo)", d));
    assert!(is_match(&tree, ":nth-last-child(3 of .foo)", a));
}

#[test]
fn test_of_type_pseudo_classes() {
    let (mut tree, _, body) = document();
    let h2 = element(&mut tree, body, "h2");
    let p1 = element(&mut tree, body, "p");
    let img = element(&mut tree, body, "img");
    let p2 = element(&mut tree, body, "p");

    assert!(is_match(&tree, "p:first-of-type", p1));
    assert!(is_match(&tree, "p:last-of-type", p2));
    assert!(is_match(&tree, "p:nth-of-type(2)", p2));
    assert!(is_match(&tree, "p:nth-last-of-type(2)", p1));
    assert!(is_match(&tree, ":only-of-type", h2));
    assert!(is_match(&tree, ":only-of-type", img));
    assert!(!is_match(&tree, ":only-of-type", p1));
}

#[test]
fn test_root_empty_scope() {
    let (mut tree, html, body) = document();
    let empty = element(&mut tree, body, "div");
    let comment = tree.alloc(NodeType::Comment("ignored".to_string()));
    tree.append_child(empty, comment);
    let spaced = element(&mut tree, body, "div");
    let _ = tree.append_text(spaced, " ");

    assert!(is_match(&tree, ":root", html));
    assert!(!is_match(&tree, ":root", body));
    assert!(is_match(&tree, "div:empty", empty));
    assert!(!is_match(&tree, "div:empty", spaced));
    assert!(!is_match(&tree, "body:empty", body));

    // `matches` scopes to the node itself.
    assert!(is_match(&tree, ":scope", html));
    assert!(is_match(&tree, ":scope", body));
    // A document scope stands for the document element.
    let scope = Selectors::parse(":scope").unwrap();
    let query = Query::new(&tree, &scope).scope(NodeId::ROOT);
    assert!(query.matches(html).unwrap());
    assert!(!query.matches(body).unwrap());
    // Queries scope to the query root.
    assert_eq!(query_selector_all(":scope > div", &tree, body).unwrap(), vec![empty, spaced]);
}

// ========== linguistic and element state ==========

#[test]
fn test_lang_inherits() {
    let (mut tree, html, body) = document();
    if let Some(data) = tree.as_element_mut(html) {
        data.set_attribute("lang", "en-GB");
    }
    let p = element(&mut tree, body, "p");
    let quote = element_with(&mut tree, p, "q", &[("lang", "de-Latn-CH")]);
    let none = element_with(&mut tree, body, "span", &[("lang", "")]);

    assert!(is_match(&tree, ":lang(en)", p));
    assert!(is_match(&tree, ":lang(\"en-gb\")", p));
    assert!(!is_match(&tree, ":lang(fr, de)", p));
    assert!(is_match(&tree, ":lang(de-CH)", quote));
    assert!(is_match(&tree, ":lang(\"*-Latn\")", quote));
    assert!(!is_match(&tree, ":lang(en)", none));
}

#[test]
fn test_dir_resolution() {
    let (mut tree, _, body) = document();
    let rtl = element_with(&mut tree, body, "div", &[("dir", "rtl")]);
    let child = element(&mut tree, rtl, "p");
    let auto = element_with(&mut tree, body, "p", &[("dir", "auto")]);
    let _ = tree.append_text(auto, "\u{5E9}\u{5DC}\u{5D5}\u{5DD} hello");
    let plain = element(&mut tree, body, "p");

    assert!(is_match(&tree, ":dir(rtl)", rtl));
    assert!(is_match(&tree, ":dir(rtl)", child));
    assert!(is_match(&tree, ":dir(rtl)", auto));
    assert!(is_match(&tree, ":dir(ltr)", plain));
    assert!(!is_match(&tree, ":dir(auto)", auto));
}

#[test]
fn test_custom_state() {
    let (mut tree, _, body) = document();
    let toggle = tree.append_element(body, ElementData::new("x-toggle").with_state("on"));
    assert!(is_match(&tree, "x-toggle:state(on)", toggle));
    assert!(!is_match(&tree, "x-toggle:state(off)", toggle));
    assert!(!is_match(&tree, ":defined", toggle));
    assert!(is_match(&tree, ":defined", body));
}

#[test]
fn test_links_and_form_state() {
    let (mut tree, _, body) = document();
    let link = element_with(&mut tree, body, "a", &[("href", "#top")]);
    let anchor = element(&mut tree, body, "a");
    let form = element(&mut tree, body, "form");
    let checkbox = element_with(&mut tree, form, "input", &[("type", "checkbox"), ("checked", "")]);
    let text = element_with(&mut tree, form, "input", &[("required", ""), ("placeholder", "Name")]);
    let readonly = element_with(&mut tree, form, "input", &[("readonly", "")]);
    let select = element(&mut tree, form, "select");
    let group = element_with(&mut tree, select, "optgroup", &[("disabled", "")]);
    let option = element_with(&mut tree, group, "option", &[("selected", "")]);
    let progress = element(&mut tree, form, "progress");
    let editable = element_with(&mut tree, body, "div", &[("contenteditable", "")]);

    assert!(is_match(&tree, ":link", link));
    assert!(is_match(&tree, ":any-link", link));
    assert!(!is_match(&tree, ":any-link", anchor));
    assert!(is_match(&tree, ":checked", checkbox));
    assert!(is_match(&tree, ":checked", option));
    assert!(is_match(&tree, ":disabled", option));
    assert!(is_match(&tree, ":enabled", checkbox));
    assert!(!is_match(&tree, ":enabled", body));
    assert!(is_match(&tree, ":required", text));
    assert!(is_match(&tree, ":optional", checkbox));
    assert!(is_match(&tree, ":placeholder-shown", text));
    assert!(is_match(&tree, ":read-write", text));
    assert!(is_match(&tree, ":read-only", readonly));
    assert!(is_match(&tree, ":read-only", body));
    assert!(is_match(&tree, ":read-write", editable));
    assert!(is_match(&tree, ":indeterminate", progress));
}

#[test]
fn test_fieldset_disables_except_first_legend() {
    let (mut tree, _, body) = document();
    let fieldset = element_with(&mut tree, body, "fieldset", &[("disabled", "")]);
    let legend = element(&mut tree, fieldset, "legend");
    let in_legend = element(&mut tree, legend, "input");
    let outside = element(&mut tree, fieldset, "input");

    assert!(is_match(&tree, ":disabled", fieldset));
    assert!(is_match(&tree, ":enabled", in_legend));
    assert!(is_match(&tree, ":disabled", outside));
}

#[test]
fn test_target_and_focus() {
    let (mut tree, _, body) = document();
    let form = element(&mut tree, body, "form");
    let input = element(&mut tree, form, "input");
    let section = element_with(&mut tree, body, "section", &[("id", "top")]);

    let selectors = Selectors::parse(":focus, :target").unwrap();
    let query = Query::new(&tree, &selectors).focus(input).target(section);
    assert!(query.matches(input).unwrap());
    assert!(query.matches(section).unwrap());
    assert!(!query.matches(form).unwrap());

    let within = Selectors::parse("form:focus-within").unwrap();
    assert!(Query::new(&tree, &within).focus(input).matches(form).unwrap());
    assert!(!Query::new(&tree, &within).matches(form).unwrap());
}

#[test]
fn test_user_action_states_never_match() {
    let (mut tree, _, body) = document();
    let a = element_with(&mut tree, body, "a", &[("href", "/")]);
    quoll_common::clear_warnings();

    let selectors = Selectors::parse("a:hover, a:visited").unwrap();
    assert!(!Query::new(&tree, &selectors).warn(true).matches(a).unwrap());
    assert!(
        quoll_common::recorded_warnings()
            .iter()
            .any(|warning| warning.contains(":hover"))
    );
}

// ========== pseudo-elements ==========

#[test]
fn test_pseudo_elements_match_only_when_targeted() {
    let (mut tree, _, body) = document();
    let p = element(&mut tree, body, "p");
    let selectors = Selectors::parse("p::before").unwrap();

    assert!(!selectors.matches(&tree, p).unwrap());
    let query = Query::new(&tree, &selectors).pseudo_element(NamedPseudoElement::Before);
    assert!(query.matches(p).unwrap());
    // Traversal never yields pseudo-elements.
    assert_eq!(query.first_match(NodeId::ROOT).unwrap(), None);
    let after = Query::new(&tree, &selectors).pseudo_element(NamedPseudoElement::After);
    assert!(!after.matches(p).unwrap());
}

// ========== query operations ==========

#[test]
fn test_all_matches_in_document_order_and_restartable() {
    let (mut tree, _, body) = document();
    let mut expected = Vec::new();
    for index in 0..5 {
        let div = element_with(&mut tree, body, "div", &[("class", "hit")]);
        let nested = element_with(&mut tree, div, "span", &[("class", "hit")]);
        expected.push(div);
        if index % 2 == 0 {
            expected.push(nested);
        } else if let Some(data) = tree.as_element_mut(nested) {
            data.set_attribute("class", "miss");
        }
    }

    let selectors = Selectors::parse(".hit").unwrap();
    let query = Query::new(&tree, &selectors);
    let first: Vec<NodeId> = query.all_matches(NodeId::ROOT).map(Result::unwrap).collect();
    let second: Vec<NodeId> = query.all_matches(NodeId::ROOT).map(Result::unwrap).collect();
    assert_eq!(first, expected);
    assert_eq!(first, second);
    assert_eq!(select_all(&tree, ".hit"), expected);

    let divs = Selectors::parse("body > div").unwrap();
    assert_eq!(divs.all_matches(&tree, NodeId::ROOT).unwrap().len(), 5);
}

#[test]
fn test_first_match_excludes_root() {
    let (mut tree, _, body) = document();
    let outer = element(&mut tree, body, "div");
    let inner = element(&mut tree, outer, "div");

    assert_eq!(query_selector("div", &tree, outer).unwrap(), Some(inner));
    assert_eq!(query_selector("div", &tree, NodeId::ROOT).unwrap(), Some(outer));
    assert_eq!(query_selector("table", &tree, NodeId::ROOT).unwrap(), None);
}

#[test]
fn test_non_elements_never_match() {
    let (mut tree, _, body) = document();
    let text = tree.append_text(body, "hello");

    assert!(!is_match(&tree, "*", text));
    assert!(!is_match(&tree, "*", NodeId::ROOT));
    assert_eq!(closest("body", &tree, text).unwrap(), Some(body));
}

#[test]
fn test_invalid_selector_from_query_functions() {
    let (tree, _, body) = document();
    let err = query_selector_all("a >", &tree, NodeId::ROOT).unwrap_err();
    assert!(err.as_invalid_selector().is_some());
    assert!(closest("::", &tree, body).is_err());
}

#[test]
fn test_all_matches_stops_after_error() {
    let (mut tree, _, body) = document();
    let _ = element(&mut tree, body, "p");
    let _ = element(&mut tree, body, "p");

    let selectors = Selectors::parse("undeclared|p").unwrap();
    let results: Vec<_> = Query::new(&tree, &selectors).all_matches(NodeId::ROOT).collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}

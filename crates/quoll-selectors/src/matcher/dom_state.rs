//! Pseudo-classes answered from element state: language, links, form
//! controls and focus.
//!
//! Form-control state is read from content attributes (`checked`,
//! `disabled`, `readonly`, ...), since the host tree is a static snapshot.

use crate::adapter::{NodeKind, TreeAdapter};
use crate::error::{Error, Result};

use super::Matcher;

/// Input types without a text field.
const NON_TEXT_INPUT_TYPES: [&str; 12] = [
    "hidden", "checkbox", "radio", "file", "submit", "image", "reset", "button", "range", "color",
    "date", "datetime-local",
];

/// Input types for which `required` does not apply.
const NO_REQUIRED_INPUT_TYPES: [&str; 6] = ["hidden", "range", "color", "submit", "image", "reset"];

impl<A: TreeAdapter> Matcher<'_, A> {
    fn is_html(&self, node: A::Handle, name: &str) -> bool {
        self.adapter.is_html_element(node)
            && self
                .adapter
                .local_name(node)
                .is_some_and(|local| local.eq_ignore_ascii_case(name))
    }

    fn has_attribute(&self, node: A::Handle, name: &str) -> bool {
        self.adapter.attribute(node, name).is_some()
    }

    fn input_type(&self, node: A::Handle) -> String {
        self.adapter
            .attribute(node, "type")
            .unwrap_or("text")
            .to_ascii_lowercase()
    }

    /// [§ 7.2 :lang()](https://www.w3.org/TR/selectors-4/#the-lang-pseudo)
    pub(super) fn match_lang(&self, ranges: &[String], node: A::Handle) -> Result<bool> {
        let Some(language) = self.adapter.language(node).map_err(Error::Host)? else {
            return Ok(false);
        };
        Ok(ranges.iter().any(|range| lang_matches(range, &language)))
    }

    /// [§ 8.1 :any-link](https://www.w3.org/TR/selectors-4/#the-any-link-pseudo)
    ///
    /// `<a>`, `<area>` and `<link>` elements with an `href`.
    pub(super) fn is_link(&self, node: A::Handle) -> bool {
        ["a", "area", "link"].iter().any(|name| self.is_html(node, name)) && self.has_attribute(node, "href")
    }

    /// [HTML § :checked](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-checked)
    pub(super) fn is_checked(&self, node: A::Handle) -> bool {
        if self.is_html(node, "input") {
            let input_type = self.input_type(node);
            return matches!(input_type.as_str(), "checkbox" | "radio") && self.has_attribute(node, "checked");
        }
        self.is_html(node, "option") && self.has_attribute(node, "selected")
    }

    /// Elements that can be disabled.
    pub(super) fn supports_disabled(&self, node: A::Handle) -> bool {
        ["button", "input", "select", "textarea", "option", "optgroup", "fieldset"]
            .iter()
            .any(|name| self.is_html(node, name))
    }

    /// [HTML § concept-fe-disabled](https://html.spec.whatwg.org/multipage/form-control-infrastructure.html#concept-fe-disabled)
    ///
    /// Its own `disabled` attribute, an `<optgroup disabled>` parent for an
    /// option, or a disabled `<fieldset>` ancestor unless the element sits in
    /// that fieldset's first `<legend>`.
    pub(super) fn is_disabled(&self, node: A::Handle) -> bool {
        if self.has_attribute(node, "disabled") {
            return true;
        }
        if self.is_html(node, "option") {
            return self
                .adapter
                .parent(node)
                .is_some_and(|parent| self.is_html(parent, "optgroup") && self.has_attribute(parent, "disabled"));
        }
        let mut child = node;
        let mut current = self.adapter.parent(node);
        while let Some(ancestor) = current {
            if self.adapter.node_kind(ancestor) != NodeKind::Element {
                break;
            }
            if self.is_html(ancestor, "fieldset") && self.has_attribute(ancestor, "disabled") {
                let first_legend = self
                    .element_children(ancestor)
                    .find(|&candidate| self.is_html(candidate, "legend"));
                if first_legend != Some(child) {
                    return true;
                }
            }
            child = ancestor;
            current = self.adapter.parent(ancestor);
        }
        false
    }

    pub(super) fn supports_required(&self, node: A::Handle) -> bool {
        if self.is_html(node, "select") || self.is_html(node, "textarea") {
            return true;
        }
        self.is_html(node, "input") && !NO_REQUIRED_INPUT_TYPES.contains(&self.input_type(node).as_str())
    }

    /// [HTML § :required](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-required)
    pub(super) fn is_required(&self, node: A::Handle) -> bool {
        self.supports_required(node) && self.has_attribute(node, "required")
    }

    /// [HTML § :read-write](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-read-write)
    ///
    /// Mutable text inputs and textareas, plus editing hosts.
    pub(super) fn is_read_write(&self, node: A::Handle) -> bool {
        let text_control = (self.is_html(node, "input")
            && !NON_TEXT_INPUT_TYPES.contains(&self.input_type(node).as_str()))
            || self.is_html(node, "textarea");
        if text_control {
            return !self.has_attribute(node, "readonly") && !self.is_disabled(node);
        }
        self.is_editable(node)
    }

    /// `contenteditable` inherited from the nearest ancestor that sets it.
    fn is_editable(&self, node: A::Handle) -> bool {
        let mut current = Some(node);
        while let Some(element) = current {
            if !self.adapter.is_html_element(element) {
                return false;
            }
            if let Some(value) = self.adapter.attribute(element, "contenteditable") {
                let value = value.to_ascii_lowercase();
                return matches!(value.as_str(), "" | "true" | "plaintext-only");
            }
            current = self
                .adapter
                .parent(element)
                .filter(|&parent| self.adapter.node_kind(parent) == NodeKind::Element);
        }
        false
    }

    /// [HTML § :placeholder-shown](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-placeholder-shown)
    pub(super) fn is_placeholder_shown(&self, node: A::Handle) -> bool {
        if !self.has_attribute(node, "placeholder") {
            return false;
        }
        if self.is_html(node, "input") {
            let input_type = self.input_type(node);
            let supports_placeholder =
                matches!(input_type.as_str(), "text" | "search" | "url" | "tel" | "email" | "password" | "number");
            return supports_placeholder && self.adapter.attribute(node, "value").unwrap_or_default().is_empty();
        }
        if self.is_html(node, "textarea") {
            let mut child = self.adapter.first_child(node);
            while let Some(current) = child {
                if self.adapter.text(current).is_some_and(|text| !text.is_empty()) {
                    return false;
                }
                child = self.adapter.next_sibling(current);
            }
            return true;
        }
        false
    }

    /// [HTML § :indeterminate](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-indeterminate)
    ///
    /// Checkboxes carrying an `indeterminate` attribute, and `<progress>`
    /// elements without a `value`.
    pub(super) fn is_indeterminate(&self, node: A::Handle) -> bool {
        if self.is_html(node, "input") {
            return self.input_type(node) == "checkbox" && self.has_attribute(node, "indeterminate");
        }
        self.is_html(node, "progress") && !self.has_attribute(node, "value")
    }

    /// [§ 9.4 :focus-within](https://www.w3.org/TR/selectors-4/#the-focus-within-pseudo)
    ///
    /// "...an element that is itself matched by :focus, or that has a
    /// descendant shadow-including descendant that is matched by :focus."
    pub(super) fn is_focus_within(&self, node: A::Handle) -> bool {
        let mut current = self.options.focus;
        while let Some(element) = current {
            if element == node {
                return true;
            }
            current = self.adapter.parent(element).and_then(|parent| match self.adapter.node_kind(parent) {
                NodeKind::Element => Some(parent),
                NodeKind::ShadowRoot => self.adapter.shadow_host(parent),
                _ => None,
            });
        }
        false
    }
}

/// [RFC 4647 § 3.3.2 Extended filtering](https://www.rfc-editor.org/rfc/rfc4647#section-3.3.2),
/// as used by [§ 7.2 :lang()](https://www.w3.org/TR/selectors-4/#the-lang-pseudo).
///
/// Subtags compare ASCII case-insensitively; `*` matches any subtag; a range
/// subtag may skip over language subtags but never over a singleton. The
/// empty range matches only an explicitly empty language.
fn lang_matches(range: &str, language: &str) -> bool {
    if range.is_empty() || language.is_empty() {
        return range.is_empty() && language.is_empty();
    }
    let mut ranges = range.split('-');
    let mut subtags = language.split('-');
    let (Some(first_range), Some(first_subtag)) = (ranges.next(), subtags.next()) else {
        return false;
    };
    if first_range != "*" && !first_range.eq_ignore_ascii_case(first_subtag) {
        return false;
    }
    for range_subtag in ranges {
        if range_subtag == "*" {
            continue;
        }
        loop {
            let Some(subtag) = subtags.next() else {
                return false;
            };
            if subtag.eq_ignore_ascii_case(range_subtag) {
                break;
            }
            if subtag.len() == 1 {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::lang_matches;

    #[test]
    fn test_lang_prefix_with_boundary() {
        assert!(lang_matches("en", "en"));
        assert!(lang_matches("en", "en-US"));
        assert!(lang_matches("EN", "en-us"));
        assert!(!lang_matches("en", "english"));
        assert!(!lang_matches("en-US", "en"));
    }

    #[test]
    fn test_lang_wildcards() {
        assert!(lang_matches("*", "fr"));
        assert!(lang_matches("*-CH", "de-CH"));
        assert!(lang_matches("de-CH", "de-Latn-CH"));
        assert!(!lang_matches("de-CH", "de-x-CH"));
        assert!(!lang_matches("*", ""));
        assert!(lang_matches("", ""));
    }
}

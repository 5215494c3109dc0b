//! Type and attribute selectors.
//!
//! [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors),
//! [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)

use crate::adapter::{AttrRef, TreeAdapter};
use crate::ast::{AttributeMatcher, AttributeOperator, AttributeSelector, CaseSensitivity, NamespaceConstraint, QualifiedName};
use crate::error::Result;
use crate::escape::is_whitespace;

use super::Matcher;

/// [HTML § 4.16.2 Case-sensitivity of selectors](https://html.spec.whatwg.org/multipage/semantics-other.html#case-sensitivity-of-selectors)
///
/// "Attribute selectors on an HTML element in an HTML document must treat the
/// values of attributes with the following names as ASCII case-insensitive"
const CASE_INSENSITIVE_ATTRIBUTES: [&str; 46] = [
    "accept", "accept-charset", "align", "alink", "axis", "bgcolor", "charset", "checked", "clear",
    "codetype", "color", "compact", "declare", "defer", "dir", "direction", "disabled", "enctype",
    "face", "frame", "hreflang", "http-equiv", "lang", "language", "link", "media", "method",
    "multiple", "nohref", "noresize", "noshade", "nowrap", "readonly", "rel", "rev", "rules",
    "scope", "scrolling", "selected", "shape", "target", "text", "type", "valign", "valuetype",
    "vlink",
];

impl<A: TreeAdapter> Matcher<'_, A> {
    /// HTML elements in HTML documents compare names ASCII case-insensitively.
    fn html_names(&self, node: A::Handle) -> bool {
        self.adapter.is_html_document() && self.adapter.is_html_element(node)
    }

    fn namespace_matches(&self, constraint: &NamespaceConstraint, namespace: Option<&str>) -> Result<bool> {
        Ok(match constraint {
            NamespaceConstraint::Any => true,
            NamespaceConstraint::None => namespace.is_none(),
            NamespaceConstraint::Prefix(prefix) => namespace == Some(self.namespace_for(prefix)?),
        })
    }

    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    pub(super) fn match_type(&self, name: &QualifiedName, node: A::Handle) -> Result<bool> {
        if !self.namespace_matches(&name.namespace, self.adapter.namespace_uri(node))? {
            return Ok(false);
        }
        if name.is_universal() {
            return Ok(true);
        }
        let Some(local_name) = self.adapter.local_name(node) else {
            return Ok(false);
        };
        Ok(if self.html_names(node) {
            local_name.eq_ignore_ascii_case(&name.local_name)
        } else {
            local_name == name.local_name
        })
    }

    /// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// With a namespace wildcard every attribute whose local name matches is
    /// tried; the selector matches if any of them does.
    pub(super) fn match_attribute(&self, selector: &AttributeSelector, node: A::Handle) -> Result<bool> {
        let html_names = self.html_names(node);
        for attr in self.adapter.attributes(node) {
            let name_matches = if html_names {
                attr.local_name.eq_ignore_ascii_case(&selector.name.local_name)
            } else {
                attr.local_name == selector.name.local_name
            };
            if !name_matches || !self.namespace_matches(&selector.name.namespace, attr.namespace)? {
                continue;
            }
            let Some(matcher) = &selector.matcher else {
                return Ok(true);
            };
            let insensitive = match matcher.case {
                CaseSensitivity::AsciiInsensitive => true,
                CaseSensitivity::Sensitive => false,
                CaseSensitivity::Default => html_names && is_case_insensitive_attribute(&attr),
            };
            if value_matches(matcher, attr.value, insensitive) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn is_case_insensitive_attribute(attr: &AttrRef<'_>) -> bool {
    attr.namespace.is_none()
        && CASE_INSENSITIVE_ATTRIBUTES
            .iter()
            .any(|name| attr.local_name.eq_ignore_ascii_case(name))
}

/// [§ 6.1](https://www.w3.org/TR/selectors-4/#attribute-representation),
/// [§ 6.2](https://www.w3.org/TR/selectors-4/#attribute-substrings)
fn value_matches(matcher: &AttributeMatcher, value: &str, insensitive: bool) -> bool {
    let (expected, actual) = if insensitive {
        (matcher.value.to_ascii_lowercase(), value.to_ascii_lowercase())
    } else {
        (matcher.value.clone(), value.to_string())
    };
    match matcher.operator {
        AttributeOperator::Equals => actual == expected,
        // "If 'val' contains whitespace, it will never represent anything
        // (since the words are separated by spaces). Also if 'val' is the
        // empty string, it will never represent anything."
        AttributeOperator::Includes => {
            !expected.is_empty()
                && !expected.contains(is_whitespace)
                && actual.split_ascii_whitespace().any(|word| word == expected)
        }
        AttributeOperator::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected.as_str())
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        // "If 'val' is the empty string then the selector does not represent anything."
        AttributeOperator::Prefix => !expected.is_empty() && actual.starts_with(&expected),
        AttributeOperator::Suffix => !expected.is_empty() && actual.ends_with(&expected),
        AttributeOperator::Substring => !expected.is_empty() && actual.contains(&expected),
    }
}

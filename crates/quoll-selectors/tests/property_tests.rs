//! Property tests for parsing and escape decoding.

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use quoll_selectors::{Selectors, escape_ident, parse_selector, preprocess, unescape};

/// Fragments that combine into mostly valid selector text.
const FRAGMENTS: [&str; 24] = [
    "div", "*", "svg|rect", ".item", "#main", "[href]", "[lang|=en]", "[title~='a b' i]", ":first-child",
    ":nth-child(2n+1)", ":nth-last-child(odd of .x)", ":not(.hidden)", ":is(p, span)", ":where(ul)",
    ":has(> img)", ":lang(en)", ":dir(rtl)", ":hover", "::before", " ", " > ", " + ", " ~ ", ", ",
];

/// Selector text assembled from [`FRAGMENTS`].
#[derive(Debug, Clone)]
struct SelectorText(String);

impl Arbitrary for SelectorText {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = usize::arbitrary(g) % 6 + 1;
        let text = (0..count)
            .filter_map(|_| g.choose(&FRAGMENTS).copied())
            .collect::<String>();
        Self(text)
    }
}

#[quickcheck]
fn parsing_is_deterministic(text: SelectorText) -> bool {
    match (Selectors::parse(text.0.as_str()), Selectors::parse(text.0.as_str())) {
        (Ok(first), Ok(second)) => first == second,
        (Err(first), Err(second)) => first == second,
        _ => false,
    }
}

#[quickcheck]
fn parsing_arbitrary_text_never_panics(text: String) -> bool {
    let _ = Selectors::parse(text.as_str());
    true
}

#[quickcheck]
fn errors_carry_the_original_text(text: SelectorText) -> bool {
    match parse_selector(text.0.as_str()) {
        Ok(parsed) => parsed.source() == text.0,
        Err(err) => err.selector() == text.0,
    }
}

#[quickcheck]
fn unescape_is_identity_without_backslashes(text: String) -> bool {
    text.contains('\\') || unescape(&text) == text
}

#[quickcheck]
fn unescape_is_idempotent_on_decoded_text(text: String) -> bool {
    let decoded = unescape(&text).into_owned();
    decoded.contains('\\') || unescape(&decoded) == decoded
}

#[quickcheck]
fn escaped_identifiers_decode_back(text: String) -> bool {
    let text = preprocess(&text.as_str().into());
    text.is_empty() || unescape(&escape_ident(&text)) == text
}

#[quickcheck]
fn preprocessing_removes_nulls_and_form_feeds(text: String) -> bool {
    let filtered = preprocess(&text.into());
    !filtered.contains(['\0', '\u{000C}'])
}

//! CSS escape decoding and identifier serialization.
//!
//! Identifier-like tokens are kept in their raw source form by the tokenizer;
//! [`unescape`] is applied when a decoded value is needed.

use std::borrow::Cow;
use std::fmt::Write as _;

/// The largest code point Unicode allows.
const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// Decode every escape sequence in an identifier-like token.
///
/// Borrows the input when it holds no backslash, so decoding already
/// decoded text is a no-op. Each escape is decoded on its own: a surrogate
/// pair written as two escapes yields two U+FFFD.
#[must_use]
pub fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek().copied() {
            // An escaped newline is not an escape in an identifier; keep both.
            Some('\n') => result.push('\\'),
            Some(h) if h.is_ascii_hexdigit() => {
                let mut value = 0u32;
                let mut digits = 0;
                while digits < 6 {
                    let Some(digit) = chars.peek().and_then(|d| d.to_digit(16)) else {
                        break;
                    };
                    value = value * 16 + digit;
                    digits += 1;
                    let _ = chars.next();
                }
                if digits < 6 && chars.peek().copied().is_some_and(is_whitespace) {
                    let _ = chars.next();
                }
                result.push(decode_code_point(value));
            }
            Some(other) => {
                let _ = chars.next();
                result.push(other);
            }
            None => result.push(char::REPLACEMENT_CHARACTER),
        }
    }
    Cow::Owned(result)
}

/// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
///
/// "If this number is zero, or is for a surrogate, or is greater than the
/// maximum allowed code point, return U+FFFD REPLACEMENT CHARACTER (�).
/// Otherwise, return the code point with that value."
fn decode_code_point(value: u32) -> char {
    if value == 0 || value > MAX_CODE_POINT {
        return char::REPLACEMENT_CHARACTER;
    }
    char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// [§ 4.2 whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
pub(crate) const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\u{000C}')
}

/// [CSSOM § 2.1 Serialize an identifier](https://drafts.csswg.org/cssom/#serialize-an-identifier)
#[must_use]
pub fn escape_ident(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let first = value.chars().next();
    let only_hyphen = value == "-";
    for (index, c) in value.chars().enumerate() {
        match c {
            // "If the character is NULL (U+0000), then the REPLACEMENT CHARACTER (U+FFFD)."
            '\0' => result.push(char::REPLACEMENT_CHARACTER),
            // "If the character is in the range [\1-\1f] (U+0001 to U+001F) or is U+007F,
            // then the character escaped as code point."
            '\u{0001}'..='\u{001F}' | '\u{007F}' => push_code_point_escape(&mut result, c),
            // "If the character is the first character and is in the range [0-9],
            // then the character escaped as code point."
            // "If the character is the second character and is in the range [0-9]
            // and the first character is a "-", then the character escaped as code point."
            '0'..='9' if index == 0 || (index == 1 && first == Some('-')) => {
                push_code_point_escape(&mut result, c);
            }
            // "If the character is the first character and is a "-", and there is no
            // second character, then the escaped character."
            '-' if only_hyphen => result.push_str("\\-"),
            c if !c.is_ascii() || c == '-' || c == '_' || c.is_ascii_alphanumeric() => {
                result.push(c);
            }
            c => {
                result.push('\\');
                result.push(c);
            }
        }
    }
    result
}

/// "To escape a character as code point means to create a string of "\",
/// followed by the code point as the smallest possible number of hexadecimal
/// digits, followed by a single SPACE."
fn push_code_point_escape(result: &mut String, c: char) {
    let _ = write!(result, "\\{:x} ", u32::from(c));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_hex_and_literal() {
        assert_eq!(unescape("\\41"), "A");
        assert_eq!(unescape("\\41 B"), "AB");
        assert_eq!(unescape("a\\.b"), "a.b");
        assert_eq!(unescape("\\00004142"), "A42");
    }

    #[test]
    fn test_unescape_replacement_cases() {
        assert_eq!(unescape("\\0"), "\u{FFFD}");
        assert_eq!(unescape("\\"), "\u{FFFD}");
        assert_eq!(unescape("\\110000"), "\u{FFFD}");
        assert_eq!(unescape("\\d83d\\de00 "), "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn test_unescape_newline_is_literal() {
        assert_eq!(unescape("a\\\nb"), "a\\\nb");
    }

    #[test]
    fn test_unescape_borrows_plain_text() {
        assert!(matches!(unescape("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_escape_ident() {
        assert_eq!(escape_ident("foo"), "foo");
        assert_eq!(escape_ident("1a"), "\\31 a");
        assert_eq!(escape_ident("-1"), "-\\31 ");
        assert_eq!(escape_ident("-"), "\\-");
        assert_eq!(escape_ident("a.b"), "a\\.b");
        assert_eq!(escape_ident("a\0"), "a\u{FFFD}");
    }
}

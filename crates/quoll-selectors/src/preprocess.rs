//! Input filtering applied to selector text before tokenization.
//!
//! [§ 3.3 Preprocessing the input stream](https://www.w3.org/TR/css-syntax-3/#input-preprocessing)

use core::fmt;

use serde::Serialize;

/// A selector argument of any dynamic type.
///
/// Hosts embedding the engine behind a dynamically typed API can pass
/// whatever value they received; it is stringified the way a script engine
/// would before being parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SelectorValue {
    /// An absent value, stringified as `undefined`.
    Undefined,
    /// A null value, stringified as `null`.
    Null,
    /// A boolean, stringified as `true` or `false`.
    Bool(bool),
    /// A number, stringified without a trailing `.0` for integral values.
    Number(f64),
    /// Selector text.
    Text(String),
}

impl SelectorValue {
    /// Build a text value from UTF-16 code units.
    ///
    /// Unpaired surrogates cannot live in a Rust string, so each one becomes
    /// U+FFFD here, which is what preprocessing would turn it into anyway.
    #[must_use]
    pub fn from_utf16(units: &[u16]) -> Self {
        Self::Text(
            char::decode_utf16(units.iter().copied())
                .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect(),
        )
    }
}

impl fmt::Display for SelectorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => fmt_number(*value, f),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Script-style number formatting: `NaN`, `Infinity`, `-Infinity`, and no
/// fraction for integral values (including negative zero, shown as `0`).
fn fmt_number(value: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if value.is_nan() {
        f.write_str("NaN")
    } else if value.is_infinite() {
        f.write_str(if value > 0.0 { "Infinity" } else { "-Infinity" })
    } else if value == 0.0 {
        f.write_str("0")
    } else {
        write!(f, "{value}")
    }
}

impl From<&str> for SelectorValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SelectorValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for SelectorValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for SelectorValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for SelectorValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for SelectorValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for SelectorValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<()> for SelectorValue {
    fn from((): ()) -> Self {
        Self::Undefined
    }
}

impl<T: Into<Self>> From<Option<T>> for SelectorValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// [§ 3.3 Preprocessing the input stream](https://www.w3.org/TR/css-syntax-3/#input-preprocessing)
///
/// Stringify `value`, then:
/// - "Replace any U+000C FORM FEED (FF) code points in input with a single
///   U+000A LINE FEED (LF) code point."
/// - "Replace any U+0000 NULL or surrogate code points in input with U+FFFD
///   REPLACEMENT CHARACTER (�)."
#[must_use]
pub fn preprocess(value: &SelectorValue) -> String {
    value
        .to_string()
        .chars()
        .map(|c| match c {
            '\u{000C}' => '\n',
            '\0' => char::REPLACEMENT_CHARACTER,
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stringify_non_text_values() {
        assert_eq!(preprocess(&SelectorValue::Undefined), "undefined");
        assert_eq!(preprocess(&SelectorValue::from(None::<&str>)), "null");
        assert_eq!(preprocess(&SelectorValue::from(true)), "true");
        assert_eq!(preprocess(&SelectorValue::from(42)), "42");
        assert_eq!(preprocess(&SelectorValue::from(1.5)), "1.5");
        assert_eq!(preprocess(&SelectorValue::from(f64::NAN)), "NaN");
        assert_eq!(preprocess(&SelectorValue::from(f64::NEG_INFINITY)), "-Infinity");
        assert_eq!(preprocess(&SelectorValue::from(-0.0)), "0");
    }

    #[test]
    fn test_filter_code_points() {
        assert_eq!(preprocess(&"a\u{000C}b\0c".into()), "a\nb\u{FFFD}c");
    }

    #[test]
    fn test_lone_surrogates_from_utf16() {
        let value = SelectorValue::from_utf16(&[0x61, 0xD83D, 0x62, 0xDE00]);
        assert_eq!(preprocess(&value), "a\u{FFFD}b\u{FFFD}");
        let pair = SelectorValue::from_utf16(&[0xD83D, 0xDE00]);
        assert_eq!(preprocess(&pair), "\u{1F600}");
    }
}

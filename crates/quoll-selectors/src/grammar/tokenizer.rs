//! Selector tokenizer following [CSS Syntax Level 3 § 4](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! Unlike a stylesheet tokenizer, identifier-like tokens (idents, function
//! names, hash values, dimension units) keep their raw source text with
//! escapes intact. Decoding is deferred to [`unescape`](crate::unescape) so the
//! normalizer can report identifiers exactly as they were written.

use crate::escape::is_whitespace;

/// A token and the half-open range of source code points it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token itself.
    pub kind: TokenKind,
    /// Index of the first code point of the token.
    pub start: usize,
    /// Index one past the last code point of the token.
    pub end: usize,
}

/// [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization)
///
/// The subset of CSS tokens a selector can contain. Url tokens are not
/// produced: `url(` is an ordinary function token here.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `<ident-token>`, raw.
    Ident(String),
    /// `<function-token>`, raw name without the parenthesis.
    Function(String),
    /// `<at-keyword-token>`, raw name without the `@`.
    AtKeyword(String),
    /// `<hash-token>`, raw value without the `#`.
    Hash {
        /// Raw value.
        raw: String,
        /// "type flag set to 'id'" when the value would start an ident sequence.
        is_id: bool,
    },
    /// `<string-token>`, decoded.
    String(String),
    /// `<bad-string-token>`
    BadString,
    /// `<delim-token>`
    Delim(char),
    /// `<number-token>`
    Number {
        /// Numeric value.
        value: f64,
        /// Set when the number has the "integer" type flag.
        int_value: Option<i64>,
    },
    /// `<percentage-token>`
    Percentage(f64),
    /// `<dimension-token>`
    Dimension {
        /// Numeric value.
        value: f64,
        /// Set when the number has the "integer" type flag.
        int_value: Option<i64>,
        /// Raw unit.
        unit: String,
    },
    /// `<whitespace-token>`
    Whitespace,
    /// `<CDO-token>`
    Cdo,
    /// `<CDC-token>`
    Cdc,
    /// `<colon-token>`
    Colon,
    /// `<semicolon-token>`
    Semicolon,
    /// `<comma-token>`
    Comma,
    /// `<[-token>`
    LeftBracket,
    /// `<]-token>`
    RightBracket,
    /// `<(-token>`
    LeftParen,
    /// `<)-token>`
    RightParen,
    /// `<{-token>`
    LeftBrace,
    /// `<}-token>`
    RightBrace,
}

/// Tokenize preprocessed selector text.
#[must_use]
pub fn tokenize(input: &[char]) -> Vec<Token> {
    let mut tokenizer = Tokenizer { input, position: 0 };
    let mut tokens = Vec::new();
    loop {
        tokenizer.consume_comments();
        let start = tokenizer.position;
        let Some(kind) = tokenizer.consume_token() else {
            break;
        };
        tokens.push(Token {
            kind,
            start,
            end: tokenizer.position,
        });
    }
    tokens
}

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
struct Tokenizer<'a> {
    input: &'a [char],
    position: usize,
}

impl Tokenizer<'_> {
    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    ///
    /// Returns `None` at EOF.
    fn consume_token(&mut self) -> Option<TokenKind> {
        let c = self.consume()?;
        let token = match c {
            c if is_whitespace(c) => {
                self.consume_whitespace();
                TokenKind::Whitespace
            }
            '"' | '\'' => self.consume_string_token(c),
            '#' => {
                // "If the next input code point is an ident code point or the next
                // two input code points are a valid escape..."
                if self.peek().is_some_and(is_ident_code_point)
                    || is_valid_escape(self.peek(), self.peek_at(1))
                {
                    let is_id = self.would_start_ident_sequence();
                    TokenKind::Hash {
                        raw: self.consume_ident_sequence(),
                        is_id,
                    }
                } else {
                    TokenKind::Delim('#')
                }
            }
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '+' | '.' if self.would_start_number_with(Some(c)) => {
                self.reconsume();
                self.consume_numeric_token()
            }
            ',' => TokenKind::Comma,
            '-' => {
                if self.would_start_number_with(Some('-')) {
                    self.reconsume();
                    self.consume_numeric_token()
                } else if self.peek() == Some('-') && self.peek_at(1) == Some('>') {
                    self.position += 2;
                    TokenKind::Cdc
                } else if self.would_start_ident_sequence_with(Some('-'), 0) {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    TokenKind::Delim('-')
                }
            }
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '<' if self.peek() == Some('!')
                && self.peek_at(1) == Some('-')
                && self.peek_at(2) == Some('-') =>
            {
                self.position += 3;
                TokenKind::Cdo
            }
            '@' if self.would_start_ident_sequence() => {
                TokenKind::AtKeyword(self.consume_ident_sequence())
            }
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '\\' if is_valid_escape(Some('\\'), self.peek()) => {
                self.reconsume();
                self.consume_ident_like_token()
            }
            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric_token()
            }
            c if is_ident_start_code_point(c) => {
                self.reconsume();
                self.consume_ident_like_token()
            }
            c => TokenKind::Delim(c),
        };
        Some(token)
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    fn consume_comments(&mut self) {
        while self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            self.position += 2;
            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        self.position += 1;
                        break;
                    }
                    Some(_) => {}
                    None => return,
                }
            }
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.position += 1;
        }
    }

    /// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending_code_point: char) -> TokenKind {
        let mut value = String::new();
        loop {
            match self.consume() {
                // "ending code point" / "EOF"
                Some(c) if c == ending_code_point => return TokenKind::String(value),
                None => return TokenKind::String(value),
                // "newline": "This is a parse error. Reconsume the current input
                // code point, create a <bad-string-token>, and return it."
                Some('\n') => {
                    self.reconsume();
                    return TokenKind::BadString;
                }
                Some('\\') => match self.peek() {
                    None => {}
                    Some('\n') => self.position += 1,
                    Some(_) => value.push(self.consume_escaped_code_point()),
                },
                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric_token(&mut self) -> TokenKind {
        let (value, int_value) = self.consume_number();
        if self.would_start_ident_sequence() {
            TokenKind::Dimension {
                value,
                int_value,
                unit: self.consume_ident_sequence(),
            }
        } else if self.peek() == Some('%') {
            self.position += 1;
            TokenKind::Percentage(value)
        } else {
            TokenKind::Number { value, int_value }
        }
    }

    /// [§ 4.3.4 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like_token(&mut self) -> TokenKind {
        let raw = self.consume_ident_sequence();
        if self.peek() == Some('(') {
            self.position += 1;
            TokenKind::Function(raw)
        } else {
            TokenKind::Ident(raw)
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// Returns the raw source text of the sequence; escapes are skipped over,
    /// not decoded.
    fn consume_ident_sequence(&mut self) -> String {
        let start = self.position;
        loop {
            match self.peek() {
                Some(c) if is_ident_code_point(c) => self.position += 1,
                Some('\\') if is_valid_escape(Some('\\'), self.peek_at(1)) => {
                    self.position += 1;
                    let _ = self.consume_escaped_code_point();
                }
                _ => break,
            }
        }
        self.input[start..self.position].iter().collect()
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) -> (f64, Option<i64>) {
        let mut is_integer = true;
        let mut repr = String::new();
        if let Some(sign @ ('+' | '-')) = self.peek() {
            repr.push(sign);
            self.position += 1;
        }
        self.consume_digits(&mut repr);
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            repr.push('.');
            self.position += 1;
            self.consume_digits(&mut repr);
            is_integer = false;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let has_sign = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if has_sign { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                repr.extend(&self.input[self.position..self.position + digit_at]);
                self.position += digit_at;
                self.consume_digits(&mut repr);
                is_integer = false;
            }
        }
        let value = repr.parse().unwrap_or(0.0);
        let int_value = if is_integer { repr.parse().ok() } else { None };
        (value, int_value)
    }

    fn consume_digits(&mut self, repr: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            repr.push(c);
            self.position += 1;
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// Assumes the backslash has already been consumed. A single whitespace
    /// after a hex escape of fewer than six digits belongs to the escape.
    fn consume_escaped_code_point(&mut self) -> char {
        let Some(c) = self.consume() else {
            return char::REPLACEMENT_CHARACTER;
        };
        if !c.is_ascii_hexdigit() {
            return c;
        }
        let mut value = c.to_digit(16).unwrap_or(0);
        let mut digits = 1;
        while digits < 6 {
            let Some(digit) = self.peek().and_then(|d| d.to_digit(16)) else {
                break;
            };
            value = value * 16 + digit;
            digits += 1;
            self.position += 1;
        }
        if digits < 6 && self.peek().is_some_and(is_whitespace) {
            self.position += 1;
        }
        if value == 0 {
            return char::REPLACEMENT_CHARACTER;
        }
        char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn would_start_ident_sequence(&self) -> bool {
        self.would_start_ident_sequence_with(self.peek(), 1)
    }

    /// `offset` is the index of the code point after `first`.
    fn would_start_ident_sequence_with(&self, first: Option<char>, offset: usize) -> bool {
        match first {
            Some('-') => {
                let second = self.peek_at(offset);
                second.is_some_and(|c| is_ident_start_code_point(c) || c == '-')
                    || is_valid_escape(second, self.peek_at(offset + 1))
            }
            Some('\\') => is_valid_escape(Some('\\'), self.peek_at(offset)),
            Some(c) => is_ident_start_code_point(c),
            None => false,
        }
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    ///
    /// `first` has already been consumed.
    fn would_start_number_with(&self, first: Option<char>) -> bool {
        let digit_at = |offset| self.peek_at(offset).is_some_and(|c: char| c.is_ascii_digit());
        match first {
            Some('+' | '-') => digit_at(0) || (self.peek() == Some('.') && digit_at(1)),
            Some('.') => digit_at(0),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        Some(c)
    }

    const fn reconsume(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && second != Some('\n')
}

/// [§ 4.2 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
///
/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
const fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
///
/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
pub(crate) const fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let chars: Vec<char> = input.chars().collect();
        tokenize(&chars).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_identifiers_stay_raw() {
        assert_eq!(
            kinds("#\\31 23.a\\.b"),
            vec![
                TokenKind::Hash {
                    raw: "\\31 23".to_string(),
                    is_id: true
                },
                TokenKind::Delim('.'),
                TokenKind::Ident("a\\.b".to_string()),
            ]
        );
    }

    #[test]
    fn test_spans_cover_source() {
        let chars: Vec<char> = "div > :is(a)".chars().collect();
        let tokens = tokenize(&chars);
        let function = &tokens[5];
        assert_eq!(function.kind, TokenKind::Function("is".to_string()));
        assert_eq!((function.start, function.end), (7, 10));
    }

    #[test]
    fn test_nth_tokens() {
        assert_eq!(
            kinds("2n+1"),
            vec![
                TokenKind::Dimension {
                    value: 2.0,
                    int_value: Some(2),
                    unit: "n".to_string()
                },
                TokenKind::Number {
                    value: 1.0,
                    int_value: Some(1)
                },
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(kinds("a/* x */"), vec![TokenKind::Ident("a".to_string())]);
    }
}

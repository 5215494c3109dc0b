//! [CSS Syntax § 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)

/// Parse `An+B` notation, including the `even` and `odd` keywords.
///
/// Whitespace may surround the whole expression and the sign of `B`, but may
/// not appear inside `An` or between a sign and its digits' owner (`+ n`,
/// `2 n` and `- 1n` are all rejected). Returns `None` for malformed input.
#[must_use]
pub fn parse_an_plus_b(text: &str) -> Option<(i64, i64)> {
    let text = text.trim().to_ascii_lowercase();
    match text.as_str() {
        "even" => return Some((2, 0)),
        "odd" => return Some((2, 1)),
        "" => return None,
        _ => {}
    }
    let Some(n_index) = text.find('n') else {
        return parse_integer(&text, true).map(|b| (0, b));
    };
    let a = match &text[..n_index] {
        "" | "+" => 1,
        "-" => -1,
        coefficient => parse_integer(coefficient, true)?,
    };
    let rest = text[n_index + 1..].trim_start();
    if rest.is_empty() {
        return Some((a, 0));
    }
    let (negative, digits) = match rest.as_bytes().first() {
        Some(b'+') => (false, rest[1..].trim_start()),
        Some(b'-') => (true, rest[1..].trim_start()),
        _ => return None,
    };
    let b = parse_integer(digits, false)?;
    Some((a, if negative { -b } else { b }))
}

/// Parse an optionally signed run of ASCII digits with no embedded whitespace.
fn parse_integer(text: &str, allow_sign: bool) -> Option<i64> {
    let digits = if allow_sign {
        text.strip_prefix(['+', '-']).unwrap_or(text)
    } else {
        text
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// [Selectors § 14.1 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
///
/// "The :nth-child(An+B [of S]? ) pseudo-class notation represents elements
/// that are among An+Bth elements from the list composed of their inclusive
/// siblings that match the selector list S ... for any positive integer or
/// zero value of n."
///
/// `position` is 1-based.
#[must_use]
pub const fn nth_matches(a: i64, b: i64, position: i64) -> bool {
    if a == 0 {
        return position == b;
    }
    let Some(diff) = position.checked_sub(b) else {
        return false;
    };
    matches!((diff.checked_rem(a), diff.checked_div(a)), (Some(0), Some(n)) if n >= 0)
}

//! Lenient numeric parsing of node content payloads.
//!
//! Constant and MIDI nodes carry their value as text typed by the user (or
//! written by the MIDI handler). Parsing follows the editor's behaviour: the
//! longest leading numeric literal is used and anything unparseable is 0.

/// Parses a content payload as a number.
///
/// - Surrounding whitespace is ignored.
/// - `"12abc"` parses as `12.0` (longest numeric prefix).
/// - `"inf"` / `"infinity"` are accepted; `NaN` collapses to 0.
/// - Empty or non-numeric content is `0.0`.
pub fn parse_content(content: &str) -> f64 {
    let trimmed = content.trim();
    let value = trimmed
        .parse::<f64>()
        .or_else(|_| numeric_prefix(trimmed).parse::<f64>())
        .unwrap_or(0.0);
    if value.is_nan() { 0.0 } else { value }
}

/// Returns the longest prefix of `s` shaped like a decimal float literal.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return "";
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_content("5"), 5.0);
        assert_eq!(parse_content("-3.25"), -3.25);
        assert_eq!(parse_content("  440 "), 440.0);
        assert_eq!(parse_content(".5"), 0.5);
        assert_eq!(parse_content("1e3"), 1000.0);
    }

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(parse_content("12abc"), 12.0);
        assert_eq!(parse_content("1.5e2Hz"), 150.0);
        assert_eq!(parse_content("7e"), 7.0);
        assert_eq!(parse_content("3."), 3.0);
        assert_eq!(parse_content("-2.5 volts"), -2.5);
    }

    #[test]
    fn test_non_numeric_is_zero() {
        assert_eq!(parse_content(""), 0.0);
        assert_eq!(parse_content("   "), 0.0);
        assert_eq!(parse_content("abc"), 0.0);
        assert_eq!(parse_content("-"), 0.0);
        assert_eq!(parse_content("."), 0.0);
        assert_eq!(parse_content("NaN"), 0.0);
    }

    #[test]
    fn test_infinity_is_kept() {
        assert!(parse_content("inf").is_infinite());
    }
}

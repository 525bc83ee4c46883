//! Pure conversions from single computed-style values into normalized attributes.
//!
//! Every parser is total: unparsable or non-meaningful input yields `None`, never an error.

pub mod color;
pub mod named_colors;
pub mod shadow;
pub mod style;

pub use color::{parse_color, ParsedColor};
pub use shadow::{parse_box_shadow, select_shadow};

/// Parses the leading number of a CSS value the way browsers' `parseFloat` does:
/// `"12.5px"` is `12.5`, `"-3e2deg"` is `-300`, `"auto"` is `None`.
pub fn parse_css_number(value: &str) -> Option<f64> {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        let magnitude = f64::INFINITY;
        return Some(if s.starts_with('-') { -magnitude } else { magnitude });
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digit_count = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digit_count += frac_end - frac_start;
        if digit_count > 0 {
            end = frac_end;
        }
    }
    if digit_count == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Parses the leading base-10 integer of a CSS value, like `parseInt`.
pub fn parse_css_int(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse::<i64>().ok()
}

/// Splits `value` on `separator` wherever it is not nested inside parentheses.
///
/// Pieces are trimmed and empty pieces dropped, so `"a(1, 2), b"` on `','` yields
/// `["a(1, 2)", "b"]`.
pub fn split_top_level(value: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;

    for ch in value.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == separator && depth <= 0 => {
                if !current.trim().is_empty() {
                    parts.push(current.trim().to_string());
                }
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_css_number_reads_leading_number() {
        assert_eq!(parse_css_number("12.5px"), Some(12.5));
        assert_eq!(parse_css_number("  -4px"), Some(-4.0));
        assert_eq!(parse_css_number(".5"), Some(0.5));
        assert_eq!(parse_css_number("3e2deg"), Some(300.0));
        assert_eq!(parse_css_number("2em"), Some(2.0));
        assert_eq!(parse_css_number("90deg"), Some(90.0));
        assert_eq!(parse_css_number("normal"), None);
        assert_eq!(parse_css_number(""), None);
        assert_eq!(parse_css_number("-"), None);
    }

    #[test]
    fn test_parse_css_int_truncates() {
        assert_eq!(parse_css_int("700"), Some(700));
        assert_eq!(parse_css_int("-2"), Some(-2));
        assert_eq!(parse_css_int("12.9"), Some(12));
        assert_eq!(parse_css_int("auto"), None);
    }

    #[test]
    fn test_split_top_level_respects_parentheses() {
        let parts = split_top_level("rgba(0, 0, 0, 0.2) 0px 1px 2px, inset 0 0 4px red", ',');
        assert_eq!(
            parts,
            vec!["rgba(0, 0, 0, 0.2) 0px 1px 2px", "inset 0 0 4px red"]
        );
    }
}

//! Box-shadow parsing and the representative-shadow heuristic.
//!
//! A `box-shadow` may list several comma-separated shadows but the document format
//! carries one per shape, so one candidate is chosen by score:
//! one point per non-zero length, plus [`VISIBLE_COLOR_BONUS`] when the color is
//! neither fully transparent nor opaque black. Ties keep the first declared shadow.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{color::parse_color, parse_css_number, split_top_level};
use crate::models::attributes::Shadow;

/// Bonus awarded to a shadow whose color will actually show up.
pub const VISIBLE_COLOR_BONUS: i32 = 2;

static COLOR_FUNCTION_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(rgba?|hsla?)\s*\(").expect("valid color function regex"));

/// One shadow from a shadow list, split into its parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowTokens {
    /// Lengths in declaration order: offset-x, offset-y, blur, spread.
    pub numbers: Vec<f64>,
    /// The color text, re-joined with single spaces.
    pub color: Option<String>,
    pub inset: bool,
}

impl ShadowTokens {
    pub fn parse(shadow: &str) -> Self {
        let mut tokens = ShadowTokens::default();
        let mut color_parts: Vec<String> = Vec::new();
        let mut pending_color: Option<String> = None;

        for part in shadow.split_whitespace() {
            if let Some(current) = pending_color.as_mut() {
                current.push(' ');
                current.push_str(part);
                if parens_balanced(current) {
                    color_parts.extend(pending_color.take());
                }
                continue;
            }
            if part.eq_ignore_ascii_case("inset") {
                tokens.inset = true;
                continue;
            }
            if COLOR_FUNCTION_START.is_match(part) {
                if parens_balanced(part) {
                    color_parts.push(part.to_string());
                } else {
                    pending_color = Some(part.to_string());
                }
                continue;
            }
            match parse_css_number(part) {
                Some(number) => tokens.numbers.push(number),
                None => color_parts.push(part.to_string()),
            }
        }

        if !color_parts.is_empty() {
            tokens.color = Some(color_parts.join(" "));
        }
        tokens
    }

    fn non_zero_count(&self) -> usize {
        self.numbers.iter().filter(|n| **n != 0.0).count()
    }

    /// True if the color parses and is neither fully transparent nor opaque black.
    pub fn has_visible_color(&self) -> bool {
        self.color
            .as_deref()
            .and_then(parse_color)
            .map_or(false, |c| c.hex != "000000" && c.opacity != Some(0.0))
    }
}

fn parens_balanced(text: &str) -> bool {
    let open = text.matches('(').count();
    let close = text.matches(')').count();
    open <= close
}

/// Scores a candidate. `None` means it has neither a non-zero length nor a visible
/// color and can only win as the first-declared fallback.
pub fn score_shadow(tokens: &ShadowTokens) -> Option<i32> {
    let non_zero = tokens.non_zero_count() as i32;
    let visible = tokens.has_visible_color();
    if non_zero == 0 && !visible {
        return None;
    }
    Some(non_zero + if visible { VISIBLE_COLOR_BONUS } else { 0 })
}

/// Picks the representative shadow out of a `box-shadow` value.
///
/// Returns the raw text of the chosen shadow, or `None` for `none`/empty input.
pub fn select_shadow(box_shadow: &str) -> Option<String> {
    let box_shadow = box_shadow.trim();
    if box_shadow.is_empty() || box_shadow == "none" {
        return None;
    }
    let shadows = split_top_level(box_shadow, ',');

    let mut best: Option<(i32, &String)> = None;
    for shadow in &shadows {
        if let Some(score) = score_shadow(&ShadowTokens::parse(shadow)) {
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, shadow));
            }
        }
    }

    best.map(|(_, shadow)| shadow)
        .or_else(|| shadows.first())
        .cloned()
}

/// Parses a computed `box-shadow` into the single shadow kept for the element.
///
/// The result is `None` when the chosen shadow lacks an x/y offset pair or a
/// parsable color.
pub fn parse_box_shadow(box_shadow: &str) -> Option<Shadow> {
    let selected = select_shadow(box_shadow)?;
    let tokens = ShadowTokens::parse(&selected);
    if tokens.numbers.len() < 2 {
        return None;
    }
    let color = parse_color(tokens.color.as_deref()?)?;

    let offset_x = tokens.numbers[0];
    let offset_y = tokens.numbers[1];
    Some(Shadow {
        offset: [offset_x, offset_y],
        color: color.hex,
        opacity: color.opacity,
        radius: tokens.numbers.get(2).copied().unwrap_or(0.0),
        spread: tokens.numbers.get(3).copied().unwrap_or(0.0),
        inset: tokens.inset,
        angle: offset_y.atan2(offset_x).to_degrees(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_offset_shadow_beats_empty_first_shadow() {
        let value = "0 0 0 rgba(0,0,0,0), 2px 4px 6px rgba(10,10,10,0.5)";
        assert_eq!(
            select_shadow(value).as_deref(),
            Some("2px 4px 6px rgba(10,10,10,0.5)")
        );

        let shadow = parse_box_shadow(value).unwrap();
        assert_eq!(shadow.offset, [2.0, 4.0]);
        assert_eq!(shadow.color, "0a0a0a");
        assert_eq!(shadow.opacity, Some(0.5));
        assert_eq!(shadow.radius, 6.0);
        assert_eq!(shadow.spread, 0.0);
        assert!(!shadow.inset);
        assert!((shadow.angle - 4f64.atan2(2.0).to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn test_browser_serialization_with_leading_color() {
        let shadow =
            parse_box_shadow("rgba(0, 0, 0, 0.25) 0px 4px 12px 2px").unwrap();
        assert_eq!(shadow.offset, [0.0, 4.0]);
        assert_eq!(shadow.radius, 12.0);
        assert_eq!(shadow.spread, 2.0);
        assert_eq!(shadow.color, "000000");
        assert_eq!(shadow.opacity, Some(0.25));
        assert!((shadow.angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_first_declared() {
        let value = "red 1px 1px, blue 1px 1px";
        assert_eq!(select_shadow(value).as_deref(), Some("red 1px 1px"));
    }

    #[test]
    fn test_visible_color_bonus_outweighs_one_length() {
        // 3 non-zero lengths, black: 3. 2 non-zero lengths, visible: 4.
        let value = "rgb(0, 0, 0) 1px 1px 1px, rgb(200, 0, 0) 1px 1px";
        assert_eq!(select_shadow(value).as_deref(), Some("rgb(200, 0, 0) 1px 1px"));
    }

    #[test]
    fn test_falls_back_to_first_shadow_when_nothing_scores() {
        let value = "rgba(0, 0, 0, 0) 0px 0px, rgb(0, 0, 0) 0px 0px";
        assert_eq!(select_shadow(value).as_deref(), Some("rgba(0, 0, 0, 0) 0px 0px"));
        // Transparent black has no color to emit.
        assert_eq!(parse_box_shadow(value), None);
    }

    #[test]
    fn test_inset_flag() {
        let shadow = parse_box_shadow("inset 0 2px 4px rgba(0, 0, 0, 0.3)").unwrap();
        assert!(shadow.inset);
        assert_eq!(shadow.offset, [0.0, 2.0]);
    }

    #[test]
    fn test_colorless_shadow_is_discarded() {
        assert_eq!(parse_box_shadow("2px 2px 4px"), None);
        assert_eq!(parse_box_shadow("none"), None);
        assert_eq!(parse_box_shadow(""), None);
    }
}

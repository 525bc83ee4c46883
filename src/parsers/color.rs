//! Color normalization: CSS color strings to six hex digits plus an optional alpha.

use super::{named_colors::lookup_named_color, parse_css_number};

/// A normalized color. `hex` is six lowercase hex digits without a leading `#`.
///
/// `opacity` is only set when the source carried an explicit alpha channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedColor {
    pub hex: String,
    pub opacity: Option<f64>,
}

/// Normalizes a CSS color value.
///
/// Accepts `rgb()`, `rgba()`, `hsl()`, `hsla()`, `#hex` and named colors. Returns `None`
/// for empty input, `transparent`, transparent black (`rgba(0, 0, 0, 0)`), and anything
/// that cannot be parsed.
pub fn parse_color(value: &str) -> Option<ParsedColor> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let lower = value.to_ascii_lowercase();
    if lower == "transparent" {
        return None;
    }

    if let Some(args) = function_args(&lower, &["rgba", "rgb"]) {
        return parse_rgb_args(args);
    }
    if let Some(args) = function_args(&lower, &["hsla", "hsl"]) {
        return parse_hsl_args(args);
    }
    if let Some(hex) = lower.strip_prefix('#') {
        return parse_hex(hex);
    }
    lookup_named_color(&lower).map(|hex| ParsedColor {
        hex: hex.to_string(),
        opacity: None,
    })
}

/// Returns the text between the parentheses of `name(...)` for the first matching name.
fn function_args<'a>(value: &'a str, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        let rest = value.strip_prefix(name)?.trim_start();
        let rest = rest.strip_prefix('(')?;
        let close = rest.rfind(')')?;
        Some(&rest[..close])
    })
}

/// Splits color-function arguments in either the legacy comma form or the
/// space-separated form with an optional `/ alpha`.
fn split_args(args: &str) -> Vec<&str> {
    if args.contains(',') {
        args.split(',').map(str::trim).collect()
    } else {
        args.split(|c: char| c.is_whitespace() || c == '/')
            .filter(|part| !part.is_empty())
            .collect()
    }
}

fn parse_alpha(part: Option<&&str>) -> Option<f64> {
    let part = part?;
    let value = parse_css_number(part)?;
    let value = if part.ends_with('%') { value / 100.0 } else { value };
    Some(value.clamp(0.0, 1.0))
}

fn parse_rgb_args(args: &str) -> Option<ParsedColor> {
    let parts = split_args(args);
    if parts.len() < 3 {
        return None;
    }
    let mut channels = [0u8; 3];
    for (channel, part) in channels.iter_mut().zip(parts.iter()) {
        let value = parse_css_number(part)?;
        let value = if part.ends_with('%') {
            value * 2.55
        } else {
            value
        };
        *channel = value.round().clamp(0.0, 255.0) as u8;
    }
    let opacity = parse_alpha(parts.get(3));
    finish(channels, opacity)
}

fn parse_hsl_args(args: &str) -> Option<ParsedColor> {
    let parts = split_args(args);
    if parts.len() < 3 {
        return None;
    }
    let hue = parse_hue(parts[0])?;
    let saturation = (parse_css_number(parts[1])? / 100.0).clamp(0.0, 1.0);
    let lightness = (parse_css_number(parts[2])? / 100.0).clamp(0.0, 1.0);
    let channels = hsl_to_rgb(hue, saturation, lightness);
    let opacity = parse_alpha(parts.get(3));
    finish(channels, opacity)
}

fn parse_hue(part: &str) -> Option<f64> {
    let value = parse_css_number(part)?;
    let degrees = if part.ends_with("turn") {
        value * 360.0
    } else if part.ends_with("grad") {
        value * 0.9
    } else if part.ends_with("rad") {
        value.to_degrees()
    } else {
        value
    };
    Some(degrees.rem_euclid(360.0))
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}

fn parse_hex(hex: &str) -> Option<ParsedColor> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };
    let byte = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    let channels = [byte(0)?, byte(2)?, byte(4)?];
    let opacity = if expanded.len() == 8 {
        Some(f64::from(byte(6)?) / 255.0)
    } else {
        None
    };
    finish(channels, opacity)
}

fn finish(channels: [u8; 3], opacity: Option<f64>) -> Option<ParsedColor> {
    if channels == [0, 0, 0] && opacity == Some(0.0) {
        return None;
    }
    Some(ParsedColor {
        hex: format!("{:02x}{:02x}{:02x}", channels[0], channels[1], channels[2]),
        opacity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(value: &str) -> Option<String> {
        parse_color(value).map(|c| c.hex)
    }

    #[test]
    fn test_rgb_and_rgba() {
        assert_eq!(
            parse_color("rgb(255, 0, 128)"),
            Some(ParsedColor {
                hex: "ff0080".to_string(),
                opacity: None
            })
        );
        assert_eq!(
            parse_color("rgba(10, 20, 30, 0.5)"),
            Some(ParsedColor {
                hex: "0a141e".to_string(),
                opacity: Some(0.5)
            })
        );
        assert_eq!(
            parse_color("rgb(0 0 255 / 25%)").unwrap().opacity,
            Some(0.25)
        );
    }

    #[test]
    fn test_transparent_inputs_are_absent() {
        assert_eq!(parse_color("transparent"), None);
        assert_eq!(parse_color("rgba(0, 0, 0, 0)"), None);
        assert_eq!(parse_color("rgba(0,0,0,0)"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn test_translucent_non_black_keeps_zero_opacity() {
        let color = parse_color("rgba(255, 255, 255, 0)").unwrap();
        assert_eq!(color.hex, "ffffff");
        assert_eq!(color.opacity, Some(0.0));
    }

    #[test]
    fn test_hsl() {
        assert_eq!(hex("hsl(0, 100%, 50%)").as_deref(), Some("ff0000"));
        assert_eq!(hex("hsl(120, 100%, 25%)").as_deref(), Some("008000"));
        assert_eq!(hex("hsl(240, 100%, 50%)").as_deref(), Some("0000ff"));
        assert_eq!(parse_color("hsla(0, 0%, 100%, 0.3)").unwrap().opacity, Some(0.3));
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!(hex("#FFF").as_deref(), Some("ffffff"));
        assert_eq!(hex("#1a2B3c").as_deref(), Some("1a2b3c"));
        let with_alpha = parse_color("#ff000080").unwrap();
        assert_eq!(with_alpha.hex, "ff0000");
        assert!((with_alpha.opacity.unwrap() - 128.0 / 255.0).abs() < 1e-9);
        assert_eq!(hex("#12345"), None);
        assert_eq!(hex("#zzz"), None);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(hex("red").as_deref(), Some("ff0000"));
        assert_eq!(hex("RebeccaPurple").as_deref(), Some("663399"));
        assert_eq!(hex("not-a-color"), None);
    }
}

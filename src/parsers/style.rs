//! Parsers for individual paint and layout properties of a computed style.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{color::parse_color, parse_css_int, parse_css_number};
use crate::models::{
    attributes::{Background, Border, Filters, Font, ObjectFit, Spacing, TextAlign},
    style::ComputedStyle,
};

static BACKGROUND_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"url\(['"]?([^'"]+)['"]?\)"#).expect("valid url regex"));

static FILTER_FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z-]+)\(([^)]*)\)").expect("valid filter regex"));

// --- Paint ---

/// Background color of the element. `None` if neither a color nor an alpha could be read.
pub fn parse_background(style: &ComputedStyle) -> Option<Background> {
    let color = parse_color(style.get("background-color"))?;
    Some(Background {
        color: Some(color.hex),
        opacity: color.opacity,
    })
}

/// Extracts the first `url(...)` of `background-image`.
pub fn parse_background_image(style: &ComputedStyle) -> Option<String> {
    let value = style.get("background-image");
    if value.is_empty() || value == "none" {
        return None;
    }
    BACKGROUND_URL
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|url| !url.is_empty())
}

/// Border color and width. Zero-width borders are not represented.
///
/// Only the first side's color and width are read when the sides differ.
pub fn parse_border(style: &ComputedStyle) -> Option<Border> {
    let width = parse_css_number(style.get("border-width"));
    if width == Some(0.0) {
        return None;
    }
    let color = first_color(style.get("border-color"));

    let border = Border {
        color: color.as_ref().map(|c| c.hex.clone()),
        width,
        opacity: color.and_then(|c| c.opacity),
    };
    if border.color.is_none() && border.width.is_none() && border.opacity.is_none() {
        return None;
    }
    Some(border)
}

/// Parses the first color of a possibly multi-valued color property
/// (e.g. `"rgb(0, 0, 0) rgb(255, 0, 0)"` for per-side border colors).
fn first_color(value: &str) -> Option<super::ParsedColor> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let first = match value.find(')') {
        Some(close) if value.contains('(') => &value[..=close],
        _ => value.split_whitespace().next().unwrap_or(value),
    };
    parse_color(first)
}

// --- Text ---

/// Font of the element. `None` only if every sub-field is unset.
pub fn parse_font(style: &ComputedStyle) -> Option<Font> {
    let family = style.get("font-family");
    let name = if family == "initial" {
        None
    } else {
        family
            .split(',')
            .next()
            .map(|first| first.trim().replace(['"', '\''], ""))
            .filter(|name| !name.is_empty())
    };

    let font = Font {
        name,
        size: parse_css_number(style.get("font-size")),
        weight: parse_css_int(style.get("font-weight")).map(|w| w as i32),
        color: parse_color(style.get("color")).map(|c| c.hex),
        italic: style.get("font-style") == "italic",
    };

    if font == Font::default() {
        return None;
    }
    Some(font)
}

/// Explicit line height, for elements already judged multi-line.
///
/// `normal` and unparsable values yield `None`.
pub fn parse_line_height(style: &ComputedStyle, multiline: bool) -> Option<f64> {
    if !multiline {
        return None;
    }
    let value = style.get("line-height");
    if value.is_empty() || value == "normal" {
        return None;
    }
    parse_css_number(value)
}

/// Raw horizontal alignment, forced to `Center` for flex containers centering their
/// main axis and for `place-items: center`. `left`/`start` read as unset.
pub fn parse_text_align(style: &ComputedStyle) -> Option<TextAlign> {
    let centered_flex =
        style.get("display") == "flex" && style.get("justify-content") == "center";
    let place_items = style.get("place-items");
    let centered_items = place_items == "center" || place_items == "center center";
    if centered_flex || centered_items {
        return Some(TextAlign::Center);
    }

    match style.get("text-align") {
        "center" | "-webkit-center" => Some(TextAlign::Center),
        "right" | "end" | "-webkit-right" => Some(TextAlign::Right),
        "justify" => Some(TextAlign::Justify),
        _ => None,
    }
}

/// Inverse of `white-space: nowrap`.
pub fn parse_text_wrap(style: &ComputedStyle) -> bool {
    style.get("white-space") != "nowrap"
}

// --- Box ---

/// Per-corner radius (top-left, top-right, bottom-right, bottom-left), expanded from
/// 1-4 tokens and clamped to half the element's width (top-left, bottom-right) or half
/// its height (top-right, bottom-left), never below zero.
pub fn parse_border_radius(value: &str, width: f64, height: f64) -> Option<[f64; 4]> {
    let value = value.trim();
    if value.is_empty() || value == "0px" {
        return None;
    }
    // Elliptical radii ("a / b"): the horizontal radii are used.
    let horizontal = value.split('/').next().unwrap_or(value);
    let parts: Vec<f64> = horizontal
        .split_whitespace()
        .map(|token| parse_css_number(token).unwrap_or(0.0))
        .collect();

    let corners = match parts.as_slice() {
        [all] => [*all, *all, *all, *all],
        [a, b] => [*a, *b, *a, *b],
        [a, b, c] => [*a, *b, *c, *b],
        [a, b, c, d] => [*a, *b, *c, *d],
        _ => return None,
    };

    let max_x = width / 2.0;
    let max_y = height / 2.0;
    let mut clamped = [0.0; 4];
    for (index, radius) in corners.iter().enumerate() {
        let max = if index % 2 == 0 { max_x } else { max_y };
        clamped[index] = radius.min(max).max(0.0);
    }
    Some(clamped)
}

/// Four-sided margin or padding, `None` when all four sides are exactly zero.
///
/// `property` is `"margin"` or `"padding"`.
pub fn parse_spacing(style: &ComputedStyle, property: &str) -> Option<Spacing> {
    let side = |name: &str| parse_css_number(style.get(&format!("{}-{}", property, name)));
    let spacing = Spacing {
        top: side("top"),
        bottom: side("bottom"),
        left: side("left"),
        right: side("right"),
    };
    let zero = Some(0.0);
    if spacing.top == zero
        && spacing.bottom == zero
        && spacing.left == zero
        && spacing.right == zero
    {
        return None;
    }
    Some(spacing)
}

pub fn parse_object_fit(style: &ComputedStyle) -> Option<ObjectFit> {
    match style.get("object-fit") {
        "contain" => Some(ObjectFit::Contain),
        "cover" => Some(ObjectFit::Cover),
        "fill" => Some(ObjectFit::Fill),
        _ => None,
    }
}

pub fn parse_clip_path(style: &ComputedStyle) -> Option<String> {
    match style.get("clip-path") {
        "" | "none" => None,
        value => Some(value.to_string()),
    }
}

/// `z-index` as an integer; `auto` and garbage read as 0.
pub fn parse_z_index(style: &ComputedStyle) -> i32 {
    parse_css_int(style.get("z-index")).map_or(0, |z| z as i32)
}

pub fn parse_opacity(style: &ComputedStyle) -> Option<f64> {
    parse_css_number(style.get("opacity"))
}

// --- Effects ---

/// Sparse record of the recognised filter functions with numeric arguments.
pub fn parse_filters(style: &ComputedStyle) -> Option<Filters> {
    let value = style.get("filter");
    if value.is_empty() || value == "none" {
        return None;
    }

    let mut filters = Filters::default();
    for caps in FILTER_FUNCTION.captures_iter(value) {
        let Some(number) = parse_css_number(&caps[2]) else {
            continue;
        };
        let slot = match &caps[1] {
            "invert" => &mut filters.invert,
            "brightness" => &mut filters.brightness,
            "contrast" => &mut filters.contrast,
            "saturate" => &mut filters.saturate,
            "hue-rotate" => &mut filters.hue_rotate,
            "blur" => &mut filters.blur,
            "grayscale" => &mut filters.grayscale,
            "sepia" => &mut filters.sepia,
            "opacity" => &mut filters.opacity,
            _ => continue,
        };
        *slot = Some(number);
    }

    if filters.is_empty() {
        None
    } else {
        Some(filters)
    }
}

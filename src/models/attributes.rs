// src/models/attributes.rs

use serde::{Deserialize, Serialize};

use crate::models::style::Rect;

/// Font of a text-bearing element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    /// First family of the `font-family` list, quotes stripped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Font size in CSS pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// Numeric CSS weight (400 = normal, 700 = bold).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
    /// Six hex digits, no leading `#`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub italic: bool,
}

/// Solid background fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// The single representative shadow kept for an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    /// Horizontal and vertical offset in pixels.
    pub offset: [f64; 2],
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Blur radius.
    pub radius: f64,
    pub spread: f64,
    pub inset: bool,
    /// Direction of the offset in degrees, `atan2(y, x)`.
    pub angle: f64,
}

/// Sparse record of CSS filter functions; only the functions present are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invert: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue_rotate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grayscale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sepia: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self == &Filters::default()
    }
}

/// Four-sided box metric used for margins and paddings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spacing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    Contain,
    Cover,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Rectangle,
    Circle,
}

/// Normalized description of one visual node: where it sits on the slide, how it is
/// painted, and what text or image it carries.
///
/// This is the plain, fully resolved form handed to the document serializer. Elements
/// that still need a pixel capture are represented by `extractor::Candidate::Pending`
/// until the fallback rasterizer replaces them with one of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAttributes {
    /// Lower-cased source tag.
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    /// Geometry. Page-relative while extracting, slide-relative once emitted.
    pub position: Rect,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    /// Per-corner radius: top-left, top-right, bottom-right, bottom-left.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<[f64; 4]>,

    pub z_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,

    /// Plain text, or verbatim inline markup for collapsed formatting containers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_text: Option<String>,
    /// URL, data URI or local path of the image painted by this element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<ObjectFit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    pub text_wrap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Spacing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Spacing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_path: Option<String>,
}

impl ElementAttributes {
    pub fn has_text(&self) -> bool {
        self.inner_text
            .as_deref()
            .map_or(false, |text| !text.trim().is_empty())
    }

    pub fn background_color(&self) -> Option<&str> {
        self.background.as_ref().and_then(|bg| bg.color.as_deref())
    }

    /// Vector graphics, canvas and table elements are captured as images.
    pub fn is_opaque(&self) -> bool {
        matches!(self.tag_name.as_str(), "svg" | "canvas" | "table")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_and_skips_absent_fields() {
        let attrs = ElementAttributes {
            tag_name: "div".to_string(),
            position: Rect::new(10.0, 20.0, 100.0, 50.0),
            border_radius: Some([4.0, 4.0, 4.0, 4.0]),
            text_wrap: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(json["tagName"], "div");
        assert_eq!(json["position"]["width"], 100.0);
        assert_eq!(json["borderRadius"][0], 4.0);
        assert_eq!(json["zIndex"], 0);
        assert!(json.get("font").is_none());
        assert!(json.get("imageSrc").is_none());
    }

    #[test]
    fn test_has_text_ignores_whitespace() {
        let mut attrs = ElementAttributes {
            inner_text: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!attrs.has_text());
        attrs.inner_text = Some(" Title ".to_string());
        assert!(attrs.has_text());
    }
}

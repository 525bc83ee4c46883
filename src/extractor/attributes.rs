//! Builds the attribute record of a single element from its geometry and computed style.

use once_cell::sync::Lazy;
use regex::Regex;

use super::policy::{self, LineMetrics};
use crate::errors::Result;
use crate::host::{NodeInfo, RenderingHost};
use crate::models::attributes::{ElementAttributes, Shape};
use crate::models::style::{ComputedStyle, Rect};
use crate::parsers::{parse_box_shadow, parse_css_number, style::*};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static LINE_BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));

/// An element's attribute record plus whether the host reported a layout box for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedElement {
    pub attributes: ElementAttributes,
    /// `false` means `attributes.position` is a zero placeholder.
    pub has_layout_box: bool,
}

/// Queries the host for one element and runs every primitive parser over the result.
///
/// Geometry is page-relative here; the walker translates it into slide coordinates.
pub async fn extract_attributes<H: RenderingHost>(
    host: &H,
    element: &H::Handle,
) -> Result<ExtractedElement> {
    let info = host.node_info(element).await?;
    let style = host.computed_style(element).await?;
    let layout_box = host.bounding_box(element).await?.map(Rect::sanitized);

    Ok(ExtractedElement {
        attributes: build_attributes(&info, &style, layout_box.unwrap_or_default()),
        has_layout_box: layout_box.is_some(),
    })
}

/// Pure part of [`extract_attributes`].
pub fn build_attributes(info: &NodeInfo, style: &ComputedStyle, position: Rect) -> ElementAttributes {
    let tag_name = info.tag_name.to_ascii_lowercase();

    let metrics = LineMetrics {
        font_size: parse_css_number(style.get("font-size")),
        line_height: parse_css_number(style.get("line-height")),
        offset_height: info.offset_height,
        scroll_height: info.scroll_height,
        client_height: info.client_height,
    };
    let multiline = policy::is_multiline(&info.text_content, &metrics);

    let border_radius =
        parse_border_radius(style.get("border-radius"), position.width, position.height);
    let shape = if tag_name == "img" {
        Some(if policy::is_circle(border_radius.as_ref()) {
            Shape::Circle
        } else {
            Shape::Rectangle
        })
    } else {
        None
    };

    let inner_text = if info.has_only_text_nodes {
        Some(clean_inner_text(&info.text_content)).filter(|text| !text.is_empty())
    } else {
        None
    };

    let image_src = info
        .image_src
        .clone()
        .filter(|src| !src.is_empty())
        .or_else(|| parse_background_image(style));

    ElementAttributes {
        id: info.id.clone(),
        class_name: info.class_name.clone().filter(|class| !class.is_empty()),
        position,
        font: parse_font(style),
        background: parse_background(style),
        border: parse_border(style),
        shadow: parse_box_shadow(style.get("box-shadow")),
        border_radius,
        z_index: parse_z_index(style),
        opacity: parse_opacity(style),
        inner_text,
        image_src,
        object_fit: parse_object_fit(style),
        shape,
        text_align: parse_text_align(style),
        text_wrap: parse_text_wrap(style),
        line_height: parse_line_height(style, multiline),
        margin: parse_spacing(style, "margin"),
        padding: parse_spacing(style, "padding"),
        filters: parse_filters(style),
        clip_path: parse_clip_path(style),
        tag_name,
    }
}

/// Normalizes text content: literal newlines dropped, whitespace runs collapsed, and
/// `<br>` markup turned into a single newline.
pub fn clean_inner_text(text: &str) -> String {
    let without_newlines = text.replace('\n', "");
    let collapsed = WHITESPACE_RUN.replace_all(without_newlines.trim(), " ");
    LINE_BREAK_TAG.replace_all(&collapsed, "\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attributes::{ObjectFit, TextAlign};

    fn style(pairs: &[(&str, &str)]) -> ComputedStyle {
        pairs.iter().copied().collect()
    }

    fn info(tag: &str) -> NodeInfo {
        NodeInfo {
            tag_name: tag.to_string(),
            has_only_text_nodes: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_inner_text() {
        assert_eq!(clean_inner_text("  Hello\n   world  "), "Hello world");
        assert_eq!(clean_inner_text("line one<br/>line two"), "line one\nline two");
        assert_eq!(clean_inner_text("a<BR>b"), "a\nb");
    }

    #[test]
    fn test_text_element() {
        let mut node = info("P");
        node.text_content = "  Quarterly   results ".to_string();
        node.offset_height = 24.0;
        node.scroll_height = 24.0;
        node.client_height = 24.0;
        let s = style(&[
            ("font-family", "Roboto, sans-serif"),
            ("font-size", "20px"),
            ("color", "rgb(255, 255, 255)"),
            ("text-align", "center"),
            ("line-height", "24px"),
            ("white-space", "normal"),
            ("opacity", "1"),
        ]);
        let attrs = build_attributes(&node, &s, Rect::new(10.0, 10.0, 300.0, 24.0));
        assert_eq!(attrs.tag_name, "p");
        assert_eq!(attrs.inner_text.as_deref(), Some("Quarterly results"));
        assert_eq!(attrs.font.as_ref().unwrap().name.as_deref(), Some("Roboto"));
        assert_eq!(attrs.text_align, Some(TextAlign::Center));
        assert_eq!(attrs.line_height, None);
        assert_eq!(attrs.opacity, Some(1.0));
        assert!(attrs.text_wrap);
        assert_eq!(attrs.shape, None);
    }

    #[test]
    fn test_line_height_for_wrapped_text() {
        let mut node = info("p");
        node.text_content = "A long paragraph".to_string();
        node.offset_height = 90.0;
        node.scroll_height = 90.0;
        node.client_height = 90.0;
        let s = style(&[("font-size", "16px"), ("line-height", "30px")]);
        let attrs = build_attributes(&node, &s, Rect::new(0.0, 0.0, 200.0, 90.0));
        assert_eq!(attrs.line_height, Some(30.0));
    }

    #[test]
    fn test_image_shape_and_source() {
        let mut node = info("img");
        node.image_src = Some("https://example.com/photo.jpg".to_string());
        let s = style(&[("border-radius", "50px"), ("object-fit", "cover")]);
        let attrs = build_attributes(&node, &s, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(attrs.shape, Some(Shape::Circle));
        assert_eq!(attrs.object_fit, Some(ObjectFit::Cover));
        assert_eq!(attrs.image_src.as_deref(), Some("https://example.com/photo.jpg"));

        let s = style(&[("border-radius", "8px")]);
        let attrs = build_attributes(&node, &s, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(attrs.shape, Some(Shape::Rectangle));
    }

    #[test]
    fn test_background_image_fallback() {
        let node = info("div");
        let s = style(&[("background-image", "url(\"/static/bg.png\")")]);
        let attrs = build_attributes(&node, &s, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(attrs.image_src.as_deref(), Some("/static/bg.png"));
    }

    #[test]
    fn test_mixed_children_have_no_inner_text() {
        let mut node = info("div");
        node.has_only_text_nodes = false;
        node.text_content = "Title".to_string();
        let attrs = build_attributes(&node, &ComputedStyle::new(), Rect::default());
        assert_eq!(attrs.inner_text, None);
    }
}

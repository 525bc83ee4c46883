//! Classification heuristics used while walking a slide.
//!
//! Kept apart from the traversal so each threshold can be tuned and tested on its own.

/// Tags that never paint anything worth extracting.
pub const NON_VISUAL_TAGS: &[&str] = &["style", "script", "link", "meta", "path"];

/// Tags skipped when they appear inside an `<svg>`; the svg is captured as a whole.
pub const SVG_INTERNAL_TAGS: &[&str] = &["text", "g"];

/// Class names of overlays injected by charting libraries (hover tooltips).
pub const NOISE_CLASS_MARKERS: &[&str] = &["recharts-tooltip-wrapper"];

/// Inline formatting tags a text container may hold and still be emitted as one leaf.
pub const INLINE_FORMATTING_TAGS: &[&str] = &["strong", "u", "em", "code", "s", "br"];

/// Containers eligible for the inline-formatting collapse.
pub const COLLAPSIBLE_CONTAINER_TAGS: &[&str] = &["p", "div"];

/// Line height assumed for `line-height: normal`, as a multiple of the font size.
pub const NORMAL_LINE_HEIGHT_FACTOR: f64 = 1.2;

/// An element taller than this many single lines is treated as wrapped text.
pub const WRAPPED_TEXT_LINE_FACTOR: f64 = 2.0;

/// Corner radius, in pixels, at which an image is treated as a circle.
pub const CIRCLE_CORNER_RADIUS: f64 = 50.0;

/// True if the element contributes nothing visual and is skipped with its subtree.
pub fn is_non_visual(tag_name: &str, inside_svg: bool, class_name: Option<&str>) -> bool {
    if NON_VISUAL_TAGS.contains(&tag_name) {
        return true;
    }
    if inside_svg && SVG_INTERNAL_TAGS.contains(&tag_name) {
        return true;
    }
    class_name.map_or(false, |class| {
        NOISE_CLASS_MARKERS
            .iter()
            .any(|marker| class.contains(marker))
    })
}

/// True if `tag_name` is a container whose descendants are all inline formatting tags,
/// so its inner markup can stand in for the whole subtree.
pub fn collapses_to_leaf(tag_name: &str, descendant_tags: &[String]) -> bool {
    COLLAPSIBLE_CONTAINER_TAGS.contains(&tag_name)
        && !descendant_tags.is_empty()
        && descendant_tags
            .iter()
            .all(|tag| INLINE_FORMATTING_TAGS.contains(&tag.as_str()))
}

/// Layout facts needed to decide whether text spans several lines.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineMetrics {
    pub font_size: Option<f64>,
    pub line_height: Option<f64>,
    pub offset_height: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

/// True if the text has explicit line breaks, is taller than
/// [`WRAPPED_TEXT_LINE_FACTOR`] single lines, or overflows its box.
pub fn is_multiline(text_content: &str, metrics: &LineMetrics) -> bool {
    let has_line_breaks = text_content.contains('\n') || text_content.contains('\r');

    let single_line = metrics
        .line_height
        .or_else(|| metrics.font_size.map(|size| size * NORMAL_LINE_HEIGHT_FACTOR));
    let wraps = single_line.map_or(false, |line| {
        metrics.offset_height > line * WRAPPED_TEXT_LINE_FACTOR
    });
    let overflows = metrics.scroll_height > metrics.client_height;

    has_line_breaks || wraps || overflows
}

/// Images whose four corners all equal [`CIRCLE_CORNER_RADIUS`] are drawn as circles.
pub fn is_circle(border_radius: Option<&[f64; 4]>) -> bool {
    border_radius.map_or(false, |corners| {
        corners.iter().all(|radius| *radius == CIRCLE_CORNER_RADIUS)
    })
}

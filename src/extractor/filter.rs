//! Slide-level post-processing of the walked candidate list: background inference,
//! filtering of elements that paint nothing, paint ordering and shadow back-fill.

use log::debug;

use super::candidate::{Candidate, PendingSlide, WalkEntry};
use crate::models::attributes::{Background, ElementAttributes};

/// Size of the slide root, against which full-bleed elements are detected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideBounds {
    pub width: f64,
    pub height: f64,
}

impl SlideBounds {
    /// True if the element exactly covers the slide.
    pub fn is_full_bleed(&self, attributes: &ElementAttributes) -> bool {
        attributes.position.covers(self.width, self.height)
    }
}

/// Background color of the slide: the first full-bleed element (in traversal order)
/// with a background color, else the background inherited into the root.
pub fn infer_background_color<Hd>(
    entries: &[WalkEntry<Hd>],
    bounds: &SlideBounds,
    root_background: Option<&str>,
) -> Option<String> {
    entries
        .iter()
        .map(|entry| entry.candidate.attributes())
        .filter(|attributes| bounds.is_full_bleed(attributes))
        .find_map(|attributes| attributes.background_color())
        .or(root_background)
        .map(str::to_string)
}

/// Images, svg, canvas and tables are kept wherever they sit.
pub fn has_special_content(attributes: &ElementAttributes) -> bool {
    attributes.image_src.is_some() || attributes.is_opaque()
}

/// A background color, border color, shadow or non-empty text.
pub fn has_visual_properties(attributes: &ElementAttributes) -> bool {
    attributes.background_color().is_some()
        || attributes
            .border
            .as_ref()
            .map_or(false, |border| border.color.is_some())
        || attributes.shadow.is_some()
        || attributes.has_text()
}

/// Whether a candidate survives into the slide. Full-bleed decoration is dropped; it
/// is represented by the slide background instead.
pub fn keep_candidate(attributes: &ElementAttributes, bounds: &SlideBounds) -> bool {
    (has_visual_properties(attributes) && !bounds.is_full_bleed(attributes))
        || has_special_content(attributes)
}

/// Stable sort by z-index, lowest first. Equal z-indices keep traversal order.
pub fn order_by_z_index<Hd>(candidates: &mut [Candidate<Hd>]) {
    candidates.sort_by_key(|candidate| candidate.attributes().z_index);
}

/// Shadow casters without a background of their own get the slide background, so the
/// shape the shadow belongs to is not transparent.
pub fn backfill_shadow_backgrounds<Hd>(
    candidates: &mut [Candidate<Hd>],
    background_color: Option<&str>,
) {
    let Some(color) = background_color else {
        return;
    };
    for candidate in candidates.iter_mut() {
        let attributes = candidate.attributes_mut();
        if attributes.shadow.is_some() && attributes.background_color().is_none() {
            attributes.background = Some(Background {
                color: Some(color.to_string()),
                opacity: None,
            });
        }
    }
}

/// Runs the whole root-level pass over one slide's walked candidates.
pub fn finalize_slide<Hd>(
    entries: Vec<WalkEntry<Hd>>,
    bounds: &SlideBounds,
    root_background: Option<&str>,
) -> PendingSlide<Hd> {
    let background_color = infer_background_color(&entries, bounds, root_background);

    let total = entries.len();
    let mut candidates: Vec<Candidate<Hd>> = entries
        .into_iter()
        .map(|entry| entry.candidate)
        .filter(|candidate| keep_candidate(candidate.attributes(), bounds))
        .collect();
    debug!("Kept {} of {} candidates", candidates.len(), total);

    order_by_z_index(&mut candidates);
    backfill_shadow_backgrounds(&mut candidates, background_color.as_deref());

    PendingSlide {
        candidates,
        background_color,
    }
}

//! Records that may still be waiting for a pixel capture.

use crate::models::attributes::ElementAttributes;

/// An extracted element before the fallback rasterizer has run.
///
/// `Pending` elements hold a reference into the rendering host and must be captured as
/// images; only `Resolved` records can become part of a [`crate::models::SlideResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate<Hd> {
    Resolved(ElementAttributes),
    Pending {
        attributes: ElementAttributes,
        handle: Hd,
    },
}

impl<Hd> Candidate<Hd> {
    pub fn attributes(&self) -> &ElementAttributes {
        match self {
            Candidate::Resolved(attributes) | Candidate::Pending { attributes, .. } => attributes,
        }
    }

    pub fn attributes_mut(&mut self) -> &mut ElementAttributes {
        match self {
            Candidate::Resolved(attributes) | Candidate::Pending { attributes, .. } => attributes,
        }
    }

    /// True if the element must be replaced by a captured image.
    pub fn should_screenshot(&self) -> bool {
        matches!(self, Candidate::Pending { .. })
    }
}

/// A walked candidate with its nesting depth below the slide root (direct children are 0).
///
/// The depth annotates the entry only: slide-level filtering treats the whole walked
/// list alike and does not read it.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkEntry<Hd> {
    pub candidate: Candidate<Hd>,
    pub depth: usize,
}

/// One slide after filtering and ordering, before rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSlide<Hd> {
    /// Candidates in paint order.
    pub candidates: Vec<Candidate<Hd>>,
    pub background_color: Option<String>,
}

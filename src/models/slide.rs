// src/models/slide.rs

use serde::{Deserialize, Serialize};

use crate::models::attributes::ElementAttributes;

/// Everything extracted from one slide root, ready for the document serializer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideResult {
    /// Elements in paint order (back to front).
    pub elements: Vec<ElementAttributes>,

    /// Six-hex-digit background color inferred from full-bleed elements, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    /// Speaker note attached to the slide; empty when the slide has none.
    #[serde(default)]
    pub speaker_note: String,
}

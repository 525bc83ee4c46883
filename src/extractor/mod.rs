//! Structured extraction of slide element trees from a [`crate::host::RenderingHost`].

pub mod attributes;
pub mod candidate;
pub mod filter;
pub mod pipeline;
pub mod policy;
pub mod walker;

pub use attributes::{extract_attributes, ExtractedElement};
pub use candidate::{Candidate, PendingSlide, WalkEntry};
pub use filter::SlideBounds;
pub use pipeline::Extractor;
pub use walker::{InheritedStyle, TreeWalker};

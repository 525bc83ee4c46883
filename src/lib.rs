pub mod config;
pub mod errors;
pub mod extractor;
pub mod host;
pub mod models;
pub mod parsers;
pub mod raster;

pub use config::ExtractorConfig;
pub use errors::{ErrorCategory, ExtractionError, Result};
pub use extractor::Extractor;
pub use host::{RenderingHost, SnapshotHost};
pub use models::{ElementAttributes, SlideResult};
pub use raster::Rasterizer;

#[cfg(feature = "raster")]
pub use raster::ResvgRasterizer;

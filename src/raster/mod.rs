//! Turning vector graphics and captured regions into PNG files on disk.

pub mod fallback;
pub mod markup;
pub mod source;
pub mod store;

use crate::errors::{ExtractionError, Result};

pub use fallback::FallbackRasterizer;
pub use markup::prepare_svg_markup;
pub use source::{is_svg_source, SvgSourceLoader};
pub use store::ScreenshotStore;

/// Renders SVG documents to PNG.
///
/// The output is `width * scale` by `height * scale` pixels, with the drawing scaled to
/// cover that area and centered (overflow cropped).
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, svg: &[u8], width: u32, height: u32, scale: u32) -> Result<Vec<u8>>;
}

/// Pixel size of a layout dimension: rounded, never below one pixel.
pub fn pixel_extent(length: f64) -> u32 {
    if length.is_finite() && length >= 1.0 {
        length.round() as u32
    } else {
        1
    }
}

/// `extent * scale` in pixels, both floored at 1.
///
/// # Errors
///
/// Returns `ExtractionError::Rasterization` if the product does not fit in a `u32`.
pub fn oversampled_extent(extent: u32, scale: u32) -> Result<u32> {
    extent.max(1).checked_mul(scale.max(1)).ok_or_else(|| {
        ExtractionError::Rasterization(format!("{}px at {}x is too large", extent, scale))
    })
}

#[cfg(feature = "raster")]
pub use self::resvg_backend::ResvgRasterizer;

#[cfg(feature = "raster")]
mod resvg_backend {
    use resvg::{tiny_skia, usvg};

    use super::{oversampled_extent, Rasterizer};
    use crate::errors::{ExtractionError, Result};

    /// [`Rasterizer`] backed by `resvg`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ResvgRasterizer;

    impl ResvgRasterizer {
        pub fn new() -> Self {
            Self
        }
    }

    impl Rasterizer for ResvgRasterizer {
        fn rasterize(&self, svg: &[u8], width: u32, height: u32, scale: u32) -> Result<Vec<u8>> {
            let options = usvg::Options::default();
            let tree = usvg::Tree::from_data(svg, &options)
                .map_err(|e| ExtractionError::Rasterization(format!("invalid SVG: {}", e)))?;

            let target_width = oversampled_extent(width, scale)?;
            let target_height = oversampled_extent(height, scale)?;
            let mut pixmap = tiny_skia::Pixmap::new(target_width, target_height).ok_or_else(|| {
                ExtractionError::Rasterization(format!(
                    "cannot allocate {}x{} pixmap",
                    target_width, target_height
                ))
            })?;

            let size = tree.size();
            let source_width = size.width().max(f32::EPSILON);
            let source_height = size.height().max(f32::EPSILON);
            let fit = (target_width as f32 / source_width).max(target_height as f32 / source_height);
            let offset_x = (target_width as f32 - source_width * fit) / 2.0;
            let offset_y = (target_height as f32 - source_height * fit) / 2.0;
            let transform = tiny_skia::Transform::from_row(fit, 0.0, 0.0, fit, offset_x, offset_y);

            resvg::render(&tree, transform, &mut pixmap.as_mut());
            pixmap
                .encode_png()
                .map_err(|e| ExtractionError::Rasterization(format!("PNG encoding failed: {}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_extent() {
        assert_eq!(pixel_extent(99.6), 100);
        assert_eq!(pixel_extent(0.2), 1);
        assert_eq!(pixel_extent(f64::NAN), 1);
    }

    #[test]
    fn test_oversampled_extent_rejects_overflow() {
        assert_eq!(oversampled_extent(100, 2).unwrap(), 200);
        assert_eq!(oversampled_extent(0, 0).unwrap(), 1);
        let err = oversampled_extent(pixel_extent(5e9), 2).unwrap_err();
        assert!(matches!(err, ExtractionError::Rasterization(_)));
    }

    #[cfg(feature = "raster")]
    #[test]
    fn test_resvg_huge_extent_is_an_error() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"/>"#;
        let err = ResvgRasterizer::new()
            .rasterize(svg, pixel_extent(5e9), 10, 2)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Rasterization(_)));
    }

    #[cfg(feature = "raster")]
    fn png_dimensions(png: &[u8]) -> (u32, u32) {
        let read = |at: usize| u32::from_be_bytes([png[at], png[at + 1], png[at + 2], png[at + 3]]);
        (read(16), read(20))
    }

    #[cfg(feature = "raster")]
    #[test]
    fn test_resvg_output_is_oversampled() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#ff0000"/></svg>"##;
        let png = ResvgRasterizer::new().rasterize(svg, 100, 50, 2).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert_eq!(png_dimensions(&png), (200, 100));
    }

    #[cfg(feature = "raster")]
    #[test]
    fn test_resvg_rejects_garbage() {
        let err = ResvgRasterizer::new()
            .rasterize(b"not svg", 10, 10, 2)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Rasterization(_)));
    }
}

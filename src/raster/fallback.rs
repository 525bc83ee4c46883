//! The post-pass that replaces everything the structured extractor cannot express with
//! raster images.

use futures::future::join_all;
use log::{debug, warn};
use tokio::sync::Mutex;

use super::markup::prepare_svg_markup;
use super::source::{is_svg_source, SvgSourceLoader};
use super::store::ScreenshotStore;
use super::{pixel_extent, Rasterizer};
use crate::errors::{ExtractionError, Result};
use crate::extractor::candidate::{Candidate, PendingSlide};
use crate::host::RenderingHost;
use crate::models::attributes::{ElementAttributes, ObjectFit};
use crate::models::slide::SlideResult;

/// Resolves the capture candidates of a slide and rasterizes vector image sources.
///
/// Holds the isolation lock shared by every slide of a presentation, so that at most one
/// element at a time has the rendering surface isolated.
pub struct FallbackRasterizer<R> {
    rasterizer: R,
    store: ScreenshotStore,
    loader: SvgSourceLoader,
    oversample: u32,
    isolation: Mutex<()>,
}

impl<R: Rasterizer> FallbackRasterizer<R> {
    pub fn new(rasterizer: R, store: ScreenshotStore, loader: SvgSourceLoader, oversample: u32) -> Self {
        Self {
            rasterizer,
            store,
            loader,
            oversample: oversample.max(1),
            isolation: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &ScreenshotStore {
        &self.store
    }

    /// Turns one filtered slide into its final, handle-free form.
    ///
    /// Captures run one after another in paint order; vector sources are then
    /// rasterized concurrently. Only capture failures are fatal.
    pub async fn resolve_slide<H: RenderingHost>(
        &self,
        host: &H,
        slide: PendingSlide<H::Handle>,
        speaker_note: String,
    ) -> Result<SlideResult> {
        let mut elements = Vec::with_capacity(slide.candidates.len());
        let mut captured = Vec::with_capacity(slide.candidates.len());
        for candidate in slide.candidates {
            match candidate {
                Candidate::Pending { attributes, handle } => {
                    elements.push(self.capture(host, attributes, &handle).await?);
                    captured.push(true);
                }
                Candidate::Resolved(attributes) => {
                    elements.push(attributes);
                    captured.push(false);
                }
            }
        }

        let elements = join_all(
            elements
                .into_iter()
                .zip(captured)
                .map(|(attributes, was_captured)| async move {
                    if was_captured {
                        attributes
                    } else {
                        self.rasterize_vector_source(attributes).await
                    }
                }),
        )
        .await;

        Ok(SlideResult {
            elements,
            background_color: slide.background_color,
            speaker_note,
        })
    }

    async fn capture<H: RenderingHost>(
        &self,
        host: &H,
        mut attributes: ElementAttributes,
        handle: &H::Handle,
    ) -> Result<ElementAttributes> {
        let png = if attributes.tag_name == "svg" {
            self.rasterize_inline_svg(host, &attributes, handle).await?
        } else {
            self.capture_isolated(host, &attributes, handle).await?
        };
        attributes.image_src = Some(self.store.save_png(&png)?);
        attributes.object_fit = Some(ObjectFit::Cover);
        Ok(attributes)
    }

    async fn rasterize_inline_svg<H: RenderingHost>(
        &self,
        host: &H,
        attributes: &ElementAttributes,
        handle: &H::Handle,
    ) -> Result<Vec<u8>> {
        let markup = host.outer_html(handle).await?;
        let width = pixel_extent(attributes.position.width);
        let height = pixel_extent(attributes.position.height);
        let color = attributes.font.as_ref().and_then(|font| font.color.as_deref());
        let prepared = prepare_svg_markup(&markup, width, height, color)?;
        debug!("Rasterizing inline <svg> at {}x{}", width, height);
        self.rasterizer
            .rasterize(prepared.as_bytes(), width, height, self.oversample)
    }

    /// Screenshots an element with every unrelated element's paint suppressed.
    ///
    /// The surface is restored whether or not the capture succeeded.
    async fn capture_isolated<H: RenderingHost>(
        &self,
        host: &H,
        attributes: &ElementAttributes,
        handle: &H::Handle,
    ) -> Result<Vec<u8>> {
        let _session = self.isolation.lock().await;
        host.isolate(handle).await?;
        let screenshot = host.screenshot(handle).await;
        let restored = host.restore(handle).await;

        let png = screenshot?;
        restored?;
        debug!("Captured <{}> in isolation", attributes.tag_name);
        png.filter(|bytes| !bytes.is_empty()).ok_or_else(|| {
            ExtractionError::CaptureFailed(format!(
                "no screenshot data for <{}>",
                attributes.tag_name
            ))
        })
    }

    /// Replaces a vector `imageSrc` with a rasterized copy. Failures leave the record
    /// untouched.
    async fn rasterize_vector_source(&self, mut attributes: ElementAttributes) -> ElementAttributes {
        let Some(src) = attributes.image_src.clone() else {
            return attributes;
        };
        let position = attributes.position;
        if !is_svg_source(&src) || position.width <= 0.0 || position.height <= 0.0 {
            return attributes;
        }

        let rasterized = async {
            let svg = self.loader.load(&src).await?;
            let png = self.rasterizer.rasterize(
                &svg,
                pixel_extent(position.width),
                pixel_extent(position.height),
                self.oversample,
            )?;
            self.store.save_png(&png)
        }
        .await;

        match rasterized {
            Ok(path) => {
                attributes.image_src = Some(path);
                if attributes.object_fit.is_none() {
                    attributes.object_fit = Some(ObjectFit::Contain);
                }
            }
            Err(e) => warn!("Keeping vector image source {}: {}", abbreviate(&src), e),
        }
        attributes
    }
}

/// Data URIs can be huge; log only their head.
fn abbreviate(src: &str) -> String {
    const MAX_CHARS: usize = 80;
    if src.chars().count() <= MAX_CHARS {
        src.to_string()
    } else {
        format!("{}...", src.chars().take(MAX_CHARS).collect::<String>())
    }
}

use futures::future::{join_all, try_join_all};
use log::{debug, info};

use super::attributes::extract_attributes;
use super::candidate::PendingSlide;
use super::filter::{finalize_slide, SlideBounds};
use super::walker::{InheritedStyle, TreeWalker};
use crate::config::ExtractorConfig;
use crate::errors::{ExtractionError, Result};
use crate::host::RenderingHost;
use crate::models::slide::SlideResult;
use crate::models::style::Rect;
use crate::raster::{FallbackRasterizer, Rasterizer, ScreenshotStore, SvgSourceLoader};

/// Tag of the slide containers and of the slide roots inside them.
const SLIDE_TAG: &str = "div";

/// Extracts every slide of a rendered presentation into [`SlideResult`]s.
///
/// All slides are walked concurrently; within a slide the walk is sequential. Capture
/// of opaque elements is serialized across the whole presentation because isolation
/// acts on the shared rendering surface.
pub struct Extractor<H, R> {
    host: H,
    fallback: FallbackRasterizer<R>,
    config: ExtractorConfig,
}

impl<H: RenderingHost, R: Rasterizer> Extractor<H, R> {
    /// Creates an extractor, creating the screenshots directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Io` if the screenshots directory cannot be created.
    pub fn new(host: H, rasterizer: R, config: ExtractorConfig) -> Result<Self> {
        Self::with_http_client(host, rasterizer, config, reqwest::Client::new())
    }

    /// Like [`Extractor::new`], fetching remote vector images with `http_client`.
    pub fn with_http_client(
        host: H,
        rasterizer: R,
        config: ExtractorConfig,
        http_client: reqwest::Client,
    ) -> Result<Self> {
        let store = ScreenshotStore::new(config.screenshots_dir())?;
        let fallback = FallbackRasterizer::new(
            rasterizer,
            store,
            SvgSourceLoader::new(http_client),
            config.oversample,
        );
        Ok(Self {
            host,
            fallback,
            config,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Loads the presentation into the host and extracts all of its slides.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty id, `MissingAnchor` if the rendered page has no slides
    /// wrapper, and any host, capture or I/O failure.
    pub async fn extract_presentation(&self, presentation_id: &str) -> Result<Vec<SlideResult>> {
        let url = self.config.render_url(presentation_id)?;
        info!("Rendering presentation {} from {}", presentation_id.trim(), url);
        self.host.navigate(&url).await?;
        self.extract_loaded().await
    }

    /// Extracts all slides of the document currently loaded in the host.
    pub async fn extract_loaded(&self) -> Result<Vec<SlideResult>> {
        let wrapper = self
            .host
            .element_by_id(&self.config.slides_wrapper_id)
            .await?
            .ok_or_else(|| {
                ExtractionError::MissingAnchor(format!(
                    "slides wrapper #{}",
                    self.config.slides_wrapper_id
                ))
            })?;

        let speaker_notes = self
            .host
            .attribute_values(&wrapper, &self.config.speaker_note_attribute)
            .await?;
        let roots = self.slide_roots(&wrapper).await?;
        info!(
            "Extracting {} slides ({} speaker notes)",
            roots.len(),
            speaker_notes.len()
        );

        let pending = try_join_all(roots.iter().map(|root| self.extract_slide(root))).await?;

        // Every fallback pass runs to completion before an error is reported, so no
        // slide is dropped between isolating and restoring the surface.
        let slides = join_all(pending.into_iter().enumerate().map(|(index, slide)| {
            let note = speaker_notes.get(index).cloned().unwrap_or_default();
            self.fallback.resolve_slide(&self.host, slide, note)
        }))
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

        info!("Extracted {} slides", slides.len());
        Ok(slides)
    }

    /// `div` children of the `div` children of the wrapper, in document order.
    async fn slide_roots(&self, wrapper: &H::Handle) -> Result<Vec<H::Handle>> {
        let mut roots = Vec::new();
        for container in self.host.children(wrapper).await? {
            if !self.is_slide_tag(&container).await? {
                continue;
            }
            for child in self.host.children(&container).await? {
                if self.is_slide_tag(&child).await? {
                    roots.push(child);
                }
            }
        }
        Ok(roots)
    }

    async fn is_slide_tag(&self, element: &H::Handle) -> Result<bool> {
        Ok(self.host.node_info(element).await?.tag_name == SLIDE_TAG)
    }

    /// Walks one slide root and applies the slide-level filter and ordering.
    pub async fn extract_slide(&self, root: &H::Handle) -> Result<PendingSlide<H::Handle>> {
        let root_element = extract_attributes(&self.host, root).await?;
        let origin = if root_element.has_layout_box {
            root_element.attributes.position
        } else {
            let (width, height) = self.config.default_slide_size;
            debug!("Slide root has no layout box; assuming {}x{}", width, height);
            Rect::new(0.0, 0.0, width, height)
        };

        let inherited = InheritedStyle::from_root(&root_element.attributes);
        let entries = TreeWalker::new(&self.host, origin)
            .walk(root, 0, inherited)
            .await?;
        debug!("Walked {} candidates", entries.len());

        let bounds = SlideBounds {
            width: origin.width,
            height: origin.height,
        };
        Ok(finalize_slide(
            entries,
            &bounds,
            root_element.attributes.background_color(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::snapshot::SurfaceEvent;
    use crate::host::SnapshotHost;
    use crate::models::attributes::ObjectFit;
    use base64::Engine;
    use std::path::Path;

    struct StubRasterizer;

    impl Rasterizer for StubRasterizer {
        fn rasterize(&self, _svg: &[u8], _width: u32, _height: u32, _scale: u32) -> Result<Vec<u8>> {
            Ok(b"stub-png".to_vec())
        }
    }

    fn config(dir: &Path) -> ExtractorConfig {
        ExtractorConfig {
            temp_directory: dir.to_path_buf(),
            ..ExtractorConfig::default()
        }
    }

    fn snapshot() -> String {
        let b64 = base64::engine::general_purpose::STANDARD;
        let canvas_png = b64.encode(b"chart-pixels");
        let svg_uri = format!("data:image/svg+xml;base64,{}", b64.encode("<svg></svg>"));
        format!(
            r##"{{
            "tag": "body",
            "children": [{{
                "tag": "div",
                "id": "presentation-slides-wrapper",
                "children": [
                    {{
                        "tag": "div",
                        "attributes": {{"data-speaker-note": "Open with the numbers"}},
                        "children": [{{
                            "tag": "div",
                            "rect": {{"left": 100, "top": 50, "width": 1280, "height": 720}},
                            "style": {{"background-color": "rgb(255, 255, 255)"}},
                            "children": [
                                {{"tag": "script", "rect": {{"left": 0, "top": 0, "width": 0, "height": 0}}}},
                                {{
                                    "tag": "div",
                                    "rect": {{"left": 100, "top": 50, "width": 1280, "height": 720}},
                                    "style": {{"background-color": "rgb(16, 24, 32)"}}
                                }},
                                {{
                                    "tag": "div",
                                    "id": "card",
                                    "rect": {{"left": 200, "top": 150, "width": 300, "height": 200}},
                                    "style": {{"background-color": "rgb(255, 0, 0)"}},
                                    "children": [{{
                                        "tag": "p",
                                        "id": "title",
                                        "rect": {{"left": 220, "top": 170, "width": 200, "height": 30}},
                                        "style": {{"font-size": "24px", "color": "rgb(0, 0, 0)"}},
                                        "children": [{{"tag": "#text", "text": "Hello"}}]
                                    }}]
                                }},
                                {{
                                    "tag": "p",
                                    "id": "summary",
                                    "rect": {{"left": 300, "top": 400, "width": 400, "height": 60}},
                                    "style": {{"font-size": "16px"}},
                                    "children": [
                                        {{"tag": "#text", "text": "Revenue "}},
                                        {{"tag": "strong", "text": "up"}},
                                        {{"tag": "br"}}
                                    ]
                                }},
                                {{
                                    "tag": "canvas",
                                    "id": "chart",
                                    "rect": {{"left": 600, "top": 300, "width": 200, "height": 100}},
                                    "screenshot": "{canvas_png}"
                                }},
                                {{
                                    "tag": "img",
                                    "id": "logo",
                                    "attributes": {{"src": "{svg_uri}"}},
                                    "rect": {{"left": 900, "top": 100, "width": 100, "height": 50}}
                                }}
                            ]
                        }}]
                    }},
                    {{
                        "tag": "div",
                        "children": [{{
                            "tag": "div",
                            "rect": {{"left": 100, "top": 800, "width": 1280, "height": 720}},
                            "children": [{{
                                "tag": "h1",
                                "id": "closing",
                                "rect": {{"left": 140, "top": 840, "width": 500, "height": 40}},
                                "children": [{{"tag": "#text", "text": "Thanks"}}]
                            }}]
                        }}]
                    }}
                ]
            }}]
        }}"##
        )
    }

    fn extractor(dir: &Path) -> Extractor<SnapshotHost, StubRasterizer> {
        let host = SnapshotHost::from_json(&snapshot()).unwrap();
        Extractor::new(host, StubRasterizer, config(dir)).unwrap()
    }

    #[tokio::test]
    async fn test_extract_presentation_end_to_end() {
        let temp = tempfile::tempdir().unwrap();
        let extractor = extractor(temp.path());

        let slides = extractor.extract_presentation("deck-42").await.unwrap();
        assert_eq!(
            extractor.host().visited_urls(),
            vec!["http://localhost/pdf-maker?id=deck-42"]
        );
        assert_eq!(slides.len(), 2);

        let first = &slides[0];
        assert_eq!(first.background_color.as_deref(), Some("101820"));
        assert_eq!(first.speaker_note, "Open with the numbers");
        let ids: Vec<Option<&str>> = first.elements.iter().map(|e| e.id.as_deref()).collect();
        assert_eq!(
            ids,
            vec![Some("card"), Some("title"), Some("summary"), Some("chart"), Some("logo")]
        );

        let second = &slides[1];
        assert_eq!(second.speaker_note, "");
        assert_eq!(second.background_color, None);
        assert_eq!(second.elements.len(), 1);
        assert_eq!(second.elements[0].inner_text.as_deref(), Some("Thanks"));
    }

    #[tokio::test]
    async fn test_positions_are_relative_to_slide_root() {
        let temp = tempfile::tempdir().unwrap();
        let slides = extractor(temp.path()).extract_loaded().await.unwrap();

        let card = &slides[0].elements[0];
        assert_eq!(card.position, Rect::new(100.0, 100.0, 300.0, 200.0));
        let title = &slides[0].elements[1];
        assert_eq!(title.position, Rect::new(120.0, 120.0, 200.0, 30.0));
        let closing = &slides[1].elements[0];
        assert_eq!(closing.position, Rect::new(40.0, 40.0, 500.0, 40.0));
    }

    #[tokio::test]
    async fn test_inline_formatting_collapses_to_one_record() {
        let temp = tempfile::tempdir().unwrap();
        let slides = extractor(temp.path()).extract_loaded().await.unwrap();

        let summary = &slides[0].elements[2];
        assert_eq!(
            summary.inner_text.as_deref(),
            Some("Revenue <strong>up</strong><br>")
        );
        assert!(slides[0]
            .elements
            .iter()
            .all(|e| e.tag_name != "strong" && e.tag_name != "br"));
    }

    #[tokio::test]
    async fn test_fallbacks_replace_image_sources() {
        let temp = tempfile::tempdir().unwrap();
        let extractor = extractor(temp.path());
        let slides = extractor.extract_loaded().await.unwrap();

        let chart = &slides[0].elements[3];
        assert_eq!(chart.object_fit, Some(ObjectFit::Cover));
        let chart_path = chart.image_src.as_deref().unwrap();
        assert!(Path::new(chart_path).starts_with(extractor.config().screenshots_dir()));
        assert_eq!(std::fs::read(chart_path).unwrap(), b"chart-pixels");

        let logo = &slides[0].elements[4];
        assert_eq!(logo.object_fit, Some(ObjectFit::Contain));
        assert_eq!(std::fs::read(logo.image_src.as_deref().unwrap()).unwrap(), b"stub-png");

        let events = extractor.host().events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], SurfaceEvent::Isolated(_)));
        assert!(matches!(events[2], SurfaceEvent::Restored(_)));
        assert!(!extractor.host().is_isolated());
    }

    #[tokio::test]
    async fn test_missing_wrapper_is_client_error() {
        let temp = tempfile::tempdir().unwrap();
        let host = SnapshotHost::from_json(r#"{"tag": "body"}"#).unwrap();
        let extractor = Extractor::new(host, StubRasterizer, config(temp.path())).unwrap();

        let err = extractor.extract_loaded().await.unwrap_err();
        assert!(matches!(err, ExtractionError::MissingAnchor(_)));
        assert_eq!(err.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_presentation_id_is_rejected_before_navigation() {
        let temp = tempfile::tempdir().unwrap();
        let extractor = extractor(temp.path());
        let err = extractor.extract_presentation("  ").await.unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidInput(_)));
        assert!(extractor.host().visited_urls().is_empty());
    }

    /// Snapshot host whose screenshots suspend once and whose markup queries fail.
    struct SlowCaptureHost(SnapshotHost);

    #[async_trait::async_trait]
    impl RenderingHost for SlowCaptureHost {
        type Handle = <SnapshotHost as RenderingHost>::Handle;

        async fn navigate(&self, url: &str) -> Result<()> {
            self.0.navigate(url).await
        }
        async fn element_by_id(&self, id: &str) -> Result<Option<Self::Handle>> {
            self.0.element_by_id(id).await
        }
        async fn children(&self, element: &Self::Handle) -> Result<Vec<Self::Handle>> {
            self.0.children(element).await
        }
        async fn node_info(&self, element: &Self::Handle) -> Result<crate::host::NodeInfo> {
            self.0.node_info(element).await
        }
        async fn bounding_box(&self, element: &Self::Handle) -> Result<Option<Rect>> {
            self.0.bounding_box(element).await
        }
        async fn computed_style(
            &self,
            element: &Self::Handle,
        ) -> Result<crate::models::style::ComputedStyle> {
            self.0.computed_style(element).await
        }
        async fn descendant_tag_names(&self, element: &Self::Handle) -> Result<Vec<String>> {
            self.0.descendant_tag_names(element).await
        }
        async fn inner_html(&self, element: &Self::Handle) -> Result<String> {
            self.0.inner_html(element).await
        }
        async fn outer_html(&self, _element: &Self::Handle) -> Result<String> {
            Err(ExtractionError::Host("outer_html failed".to_string()))
        }
        async fn attribute_values(
            &self,
            scope: &Self::Handle,
            attribute: &str,
        ) -> Result<Vec<String>> {
            self.0.attribute_values(scope, attribute).await
        }
        async fn screenshot(&self, element: &Self::Handle) -> Result<Option<Vec<u8>>> {
            tokio::task::yield_now().await;
            self.0.screenshot(element).await
        }
        async fn isolate(&self, element: &Self::Handle) -> Result<()> {
            self.0.isolate(element).await
        }
        async fn restore(&self, element: &Self::Handle) -> Result<()> {
            self.0.restore(element).await
        }
    }

    #[tokio::test]
    async fn test_failed_slide_does_not_leave_surface_isolated() {
        let temp = tempfile::tempdir().unwrap();
        let canvas_png = base64::engine::general_purpose::STANDARD.encode(b"pixels");
        let snapshot = SnapshotHost::from_json(&format!(
            r#"{{
            "tag": "div",
            "id": "presentation-slides-wrapper",
            "children": [
                {{"tag": "div", "children": [{{
                    "tag": "div",
                    "rect": {{"left": 0, "top": 0, "width": 1280, "height": 720}},
                    "children": [{{
                        "tag": "canvas",
                        "id": "chart",
                        "rect": {{"left": 10, "top": 10, "width": 200, "height": 100}},
                        "screenshot": "{canvas_png}"
                    }}]
                }}]}},
                {{"tag": "div", "children": [{{
                    "tag": "div",
                    "rect": {{"left": 0, "top": 720, "width": 1280, "height": 720}},
                    "children": [{{
                        "tag": "svg",
                        "id": "icon",
                        "rect": {{"left": 10, "top": 730, "width": 24, "height": 24}}
                    }}]
                }}]}}
            ]
        }}"#
        ))
        .unwrap();
        let extractor =
            Extractor::new(SlowCaptureHost(snapshot), StubRasterizer, config(temp.path())).unwrap();

        let err = extractor.extract_loaded().await.unwrap_err();
        assert!(matches!(err, ExtractionError::Host(_)));

        let surface = &extractor.host().0;
        assert!(!surface.is_isolated());
        let events = surface.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], SurfaceEvent::Isolated(_)));
        assert!(matches!(events[2], SurfaceEvent::Restored(_)));
    }
}

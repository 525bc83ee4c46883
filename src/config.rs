//! Runtime configuration for an extraction pass.

use crate::errors::{ExtractionError, Result};
use std::env;
use std::path::PathBuf;

/// Environment variable naming the directory raster fallbacks are written under.
pub const TEMP_DIRECTORY_ENV: &str = "TEMP_DIRECTORY";
/// Environment variable overriding the page that renders a presentation.
pub const RENDER_URL_ENV: &str = "PDF_MAKER_URL";

const DEFAULT_RENDER_BASE_URL: &str = "http://localhost/pdf-maker";
const DEFAULT_SLIDES_WRAPPER_ID: &str = "presentation-slides-wrapper";
const DEFAULT_SPEAKER_NOTE_ATTRIBUTE: &str = "data-speaker-note";

/// Settings shared by every slide of one extraction request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Root of the scratch space. Screenshots land in `<temp_directory>/<screenshots_subdir>`.
    pub temp_directory: PathBuf,
    pub screenshots_subdir: String,
    /// Page that renders a presentation when given `?id=<presentation id>`.
    pub render_base_url: String,
    /// `id` of the element whose grandchildren are the slide roots.
    pub slides_wrapper_id: String,
    /// Attribute carrying each slide's speaker note.
    pub speaker_note_attribute: String,
    /// Slide size assumed when the root element has no layout box.
    pub default_slide_size: (f64, f64),
    /// Oversampling factor applied to every rasterized image.
    pub oversample: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            temp_directory: env::temp_dir(),
            screenshots_subdir: "screenshots".to_string(),
            render_base_url: DEFAULT_RENDER_BASE_URL.to_string(),
            slides_wrapper_id: DEFAULT_SLIDES_WRAPPER_ID.to_string(),
            speaker_note_attribute: DEFAULT_SPEAKER_NOTE_ATTRIBUTE.to_string(),
            default_slide_size: (1280.0, 720.0),
            oversample: 2,
        }
    }
}

impl ExtractorConfig {
    /// Builds a configuration from the process environment.
    ///
    /// `TEMP_DIRECTORY` is mandatory; `PDF_MAKER_URL` is optional.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::InvalidInput` if `TEMP_DIRECTORY` is unset or empty.
    pub fn from_env() -> Result<Self> {
        let temp_directory = env::var(TEMP_DIRECTORY_ENV)
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .ok_or_else(|| {
                ExtractionError::InvalidInput(format!(
                    "{} environment variable not set",
                    TEMP_DIRECTORY_ENV
                ))
            })?;

        let mut config = Self {
            temp_directory: PathBuf::from(temp_directory),
            ..Self::default()
        };
        if let Ok(url) = env::var(RENDER_URL_ENV) {
            if !url.trim().is_empty() {
                config.render_base_url = url;
            }
        }
        Ok(config)
    }

    /// Directory raster fallbacks are written to.
    pub fn screenshots_dir(&self) -> PathBuf {
        self.temp_directory.join(&self.screenshots_subdir)
    }

    /// URL the rendering host should load to lay out the given presentation.
    pub fn render_url(&self, presentation_id: &str) -> Result<String> {
        let id = presentation_id.trim();
        if id.is_empty() {
            return Err(ExtractionError::InvalidInput(
                "Presentation ID not found".to_string(),
            ));
        }
        let mut url = url::Url::parse(&self.render_base_url).map_err(|e| {
            ExtractionError::InvalidInput(format!(
                "Invalid render URL '{}': {}",
                self.render_base_url, e
            ))
        })?;
        url.query_pairs_mut().append_pair("id", id);
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_url_appends_id() {
        let config = ExtractorConfig::default();
        let url = config.render_url("abc-123").unwrap();
        assert_eq!(url, "http://localhost/pdf-maker?id=abc-123");
    }

    #[test]
    fn test_render_url_rejects_empty_id() {
        let config = ExtractorConfig::default();
        let err = config.render_url("  ").unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidInput(_)));
    }

    #[test]
    fn test_screenshots_dir_is_nested_in_temp_directory() {
        let config = ExtractorConfig {
            temp_directory: PathBuf::from("/tmp/work"),
            ..ExtractorConfig::default()
        };
        assert_eq!(config.screenshots_dir(), PathBuf::from("/tmp/work/screenshots"));
    }
}

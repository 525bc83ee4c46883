//! Recognizing and loading image sources that point at SVG documents.

use base64::Engine;
use log::debug;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::errors::{ExtractionError, Result};

const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml";
/// Path fragment of proxy endpoints that answer with (recolored) SVG.
const SVG_PROXY_PATH_MARKER: &str = "update-svg";
/// Query parameter through which such proxies receive the wrapped URL.
const WRAPPED_URL_PARAM: &str = "url";

fn has_svg_extension(path: &str) -> bool {
    let path = path.to_ascii_lowercase();
    path.ends_with(".svg") || path.ends_with(".svgz")
}

/// True if `src` is an SVG data URI, an absolute URL whose path ends in `.svg`/`.svgz`,
/// a known SVG proxy endpoint, or a URL wrapping an SVG URL in its `url` parameter.
///
/// Relative paths and unparsable strings are never SVG sources.
pub fn is_svg_source(src: &str) -> bool {
    if src.to_ascii_lowercase().starts_with(SVG_DATA_URI_PREFIX) {
        return true;
    }
    let Ok(url) = Url::parse(src) else {
        return false;
    };
    let path = url.path().to_ascii_lowercase();
    if has_svg_extension(&path) || path.contains(SVG_PROXY_PATH_MARKER) {
        return true;
    }
    url.query_pairs()
        .find(|(key, _)| key == WRAPPED_URL_PARAM)
        .and_then(|(_, inner)| Url::parse(&inner).ok())
        .map_or(false, |inner| has_svg_extension(inner.path()))
}

/// Decodes an `data:image/svg+xml` URI, base64 or percent-encoded.
pub fn decode_svg_data_uri(src: &str) -> Result<Vec<u8>> {
    let (meta, data) = src
        .split_once(',')
        .ok_or_else(|| ExtractionError::Decode("data URI without payload".to_string()))?;

    if meta.to_ascii_lowercase().contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| ExtractionError::Decode(format!("base64 SVG payload: {}", e)))
    } else {
        Ok(percent_decode_str(data).collect())
    }
}

/// Loads SVG bytes from data URIs or over HTTP.
#[derive(Debug, Clone, Default)]
pub struct SvgSourceLoader {
    http_client: reqwest::Client,
}

impl SvgSourceLoader {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Returns the raw SVG document behind `src`.
    ///
    /// # Errors
    ///
    /// `Decode` for malformed data URIs, `Network` for transport failures and
    /// `HttpStatus` when the server answers with a non-success status.
    pub async fn load(&self, src: &str) -> Result<Vec<u8>> {
        if src.to_ascii_lowercase().starts_with(SVG_DATA_URI_PREFIX) {
            return decode_svg_data_uri(src);
        }

        debug!("Fetching SVG source {}", src);
        let response = self
            .http_client
            .get(src)
            .send()
            .await
            .map_err(ExtractionError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::HttpStatus {
                status,
                url: src.to_string(),
            });
        }
        let bytes = response.bytes().await.map_err(ExtractionError::Network)?;
        Ok(bytes.to_vec())
    }
}

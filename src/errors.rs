use reqwest::StatusCode;
use thiserror::Error;

/// Who is to blame for a fatal extraction error.
///
/// The boundary that serves extraction requests uses this to pick a response code
/// without matching on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request itself was malformed or referenced something that does not exist.
    Client,
    /// Everything else.
    Internal,
}

/// Represents errors that can occur while extracting slides from a rendering host.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// An error indicating invalid input was provided (e.g. an empty presentation id).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required marker element was not present in the rendered document.
    #[error("Required element not found: {0}")]
    MissingAnchor(String),

    /// The rendering host returned no pixel data for an element that must be captured.
    #[error("Failed to capture element: {0}")]
    CaptureFailed(String),

    /// A failure reported by the rendering host while querying or commanding it.
    #[error("Rendering host error: {0}")]
    Host(String),

    /// Error originating from the underlying HTTP client (`reqwest`).
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// A vector source was fetched but the server answered with a non-success status.
    #[error("Fetching {url} returned status {status}")]
    HttpStatus { status: StatusCode, url: String },

    /// SVG parsing, rendering or PNG encoding failed.
    #[error("Rasterization failed: {0}")]
    Rasterization(String),

    /// A data URI or inline payload could not be decoded.
    #[error("Failed to decode payload: {0}")]
    Decode(String),

    /// Error occurred during (de)serialization of JSON data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred, typically while writing raster images.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Classifies the error as client-caused or internal.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExtractionError::InvalidInput(_) | ExtractionError::MissingAnchor(_) => {
                ErrorCategory::Client
            }
            _ => ErrorCategory::Internal,
        }
    }

    /// HTTP status an API boundary should answer with for this error.
    pub fn status(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Client => StatusCode::BAD_REQUEST,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A type alias for `Result<T, ExtractionError>` for convenience within the crate.
pub type Result<T> = std::result::Result<T, ExtractionError>;

//! The rendering host: whatever laid the slides out and can answer questions about the
//! resulting element tree (a headless browser in production, a recorded snapshot in tests).

pub mod snapshot;

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::Result;
use crate::models::style::{ComputedStyle, Rect};

pub use snapshot::{SnapshotHost, SnapshotNode};

/// Identity and text facts about one element, gathered in a single round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeInfo {
    /// Lower-cased tag name.
    pub tag_name: String,
    pub id: Option<String>,
    pub class_name: Option<String>,
    /// Resolved image source property (only image elements have one).
    pub image_src: Option<String>,
    /// Concatenated text of the whole subtree.
    pub text_content: String,
    /// True if the element has no element children (text nodes only, or nothing).
    pub has_only_text_nodes: bool,
    pub offset_height: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

/// Queries and commands the extractor issues against a laid-out document.
///
/// `Handle` is an opaque reference to one element of the host's tree. Implementations
/// must be safe to share between the concurrent per-slide tasks.
#[async_trait]
pub trait RenderingHost: Send + Sync {
    type Handle: Clone + Debug + Send + Sync;

    /// Loads the page at `url` and waits until it has settled.
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn element_by_id(&self, id: &str) -> Result<Option<Self::Handle>>;

    /// Direct element children, in document order.
    async fn children(&self, element: &Self::Handle) -> Result<Vec<Self::Handle>>;

    async fn node_info(&self, element: &Self::Handle) -> Result<NodeInfo>;

    /// Page-relative border box. `None` if the element has no layout box.
    async fn bounding_box(&self, element: &Self::Handle) -> Result<Option<Rect>>;

    async fn computed_style(&self, element: &Self::Handle) -> Result<ComputedStyle>;

    /// Lower-cased tag names of every descendant element.
    async fn descendant_tag_names(&self, element: &Self::Handle) -> Result<Vec<String>>;

    async fn inner_html(&self, element: &Self::Handle) -> Result<String>;

    async fn outer_html(&self, element: &Self::Handle) -> Result<String>;

    /// Values of `attribute` on every descendant of `scope` that carries it, in
    /// document order.
    async fn attribute_values(&self, scope: &Self::Handle, attribute: &str)
        -> Result<Vec<String>>;

    /// PNG capture of the element's box. `None` if the host produced no data.
    async fn screenshot(&self, element: &Self::Handle) -> Result<Option<Vec<u8>>>;

    /// Suppresses the paint of everything except `element`, its ancestors and its
    /// descendants. Not reentrant: callers must `restore` before isolating again.
    async fn isolate(&self, element: &Self::Handle) -> Result<()>;

    /// Undoes the last `isolate`.
    async fn restore(&self, element: &Self::Handle) -> Result<()>;
}

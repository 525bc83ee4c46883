//! An in-memory rendering host that replays a recorded DOM snapshot.
//!
//! A snapshot is a JSON tree of [`SnapshotNode`]s carrying each element's layout box,
//! computed style and (optionally) a pre-captured screenshot. It lets slide extraction run
//! offline against a page that was rendered elsewhere, and it is what the crate's tests
//! drive the extractor with.

use async_trait::async_trait;
use base64::Engine;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use super::{NodeInfo, RenderingHost};
use crate::errors::{ExtractionError, Result};
use crate::models::style::{ComputedStyle, Rect};

/// Tag used for text nodes inside `children`.
pub const TEXT_NODE_TAG: &str = "#text";

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// One recorded node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    /// Element tag, or `#text` for a text node.
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Markup attributes other than `id` and `class`, in source order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    /// Page-relative border box; absent for nodes without a layout box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
    #[serde(default)]
    pub style: ComputedStyle,
    /// Leading text of an element, or the content of a `#text` node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
    /// Base64-encoded PNG returned when the node is captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_height: Option<f64>,
}

impl SnapshotNode {
    pub fn element(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn text_node(text: &str) -> Self {
        Self {
            tag: TEXT_NODE_TAG.to_string(),
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    fn is_text(&self) -> bool {
        self.tag == TEXT_NODE_TAG
    }
}

/// Reference to a node of a [`SnapshotHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotHandle(usize);

/// Something the host was asked to do to its (virtual) rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Isolated(SnapshotHandle),
    Captured(SnapshotHandle),
    Restored(SnapshotHandle),
}

#[derive(Debug)]
struct Entry {
    node: SnapshotNode,
    children: Vec<usize>,
}

/// Rendering host backed by a [`SnapshotNode`] tree.
#[derive(Debug)]
pub struct SnapshotHost {
    entries: Vec<Entry>,
    isolated: Mutex<Option<SnapshotHandle>>,
    events: Mutex<Vec<SurfaceEvent>>,
    visited_urls: Mutex<Vec<String>>,
}

impl SnapshotHost {
    pub fn new(root: SnapshotNode) -> Self {
        let mut entries = Vec::new();
        flatten(root, &mut entries);
        Self {
            entries,
            isolated: Mutex::new(None),
            events: Mutex::new(Vec::new()),
            visited_urls: Mutex::new(Vec::new()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let root: SnapshotNode = serde_json::from_str(json)?;
        Ok(Self::new(root))
    }

    /// Surface commands received so far, oldest first.
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn visited_urls(&self) -> Vec<String> {
        self.visited_urls
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }

    /// True while an isolation is in effect.
    pub fn is_isolated(&self) -> bool {
        self.isolated.lock().map(|i| i.is_some()).unwrap_or(false)
    }

    fn entry(&self, handle: &SnapshotHandle) -> Result<&Entry> {
        self.entries
            .get(handle.0)
            .ok_or_else(|| ExtractionError::Host(format!("Unknown node handle {}", handle.0)))
    }

    fn element_children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.entries[index]
            .children
            .iter()
            .copied()
            .filter(move |child| !self.entries[*child].node.is_text())
    }

    /// Element descendants of `index` in document order.
    fn descendants(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.element_children(index).collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            out.push(current);
            let mut children: Vec<usize> = self.element_children(current).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    fn text_content(&self, index: usize) -> String {
        let entry = &self.entries[index];
        let mut text = entry.node.text.clone().unwrap_or_default();
        for child in &entry.children {
            text.push_str(&self.text_content(*child));
        }
        text
    }

    fn write_inner_html(&self, index: usize, out: &mut String) {
        let entry = &self.entries[index];
        if let Some(text) = &entry.node.text {
            out.push_str(&escape_html_text(text));
        }
        for child in &entry.children {
            self.write_outer_html(*child, out);
        }
    }

    fn write_outer_html(&self, index: usize, out: &mut String) {
        let node = &self.entries[index].node;
        if node.is_text() {
            out.push_str(&escape_html_text(node.text.as_deref().unwrap_or("")));
            return;
        }
        let tag = node.tag.to_ascii_lowercase();
        out.push('<');
        out.push_str(&tag);
        if let Some(id) = &node.id {
            push_attribute(out, "id", id);
        }
        if let Some(class) = &node.class_name {
            push_attribute(out, "class", class);
        }
        for (name, value) in &node.attributes {
            push_attribute(out, name, value);
        }
        out.push('>');
        if VOID_TAGS.contains(&tag.as_str()) {
            return;
        }
        self.write_inner_html(index, out);
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }

    fn record(&self, event: SurfaceEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| ExtractionError::Host("Surface event log poisoned".to_string()))?
            .push(event);
        Ok(())
    }
}

fn flatten(mut node: SnapshotNode, entries: &mut Vec<Entry>) -> usize {
    let index = entries.len();
    let children = std::mem::take(&mut node.children);
    entries.push(Entry {
        node,
        children: Vec::new(),
    });
    let child_indices: Vec<usize> = children
        .into_iter()
        .map(|child| flatten(child, entries))
        .collect();
    entries[index].children = child_indices;
    index
}

/// Escapes special XML characters (`&`, `<`, `>`) for text content.
fn escape_html_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html_text(value).replace('"', "&quot;"));
    out.push('"');
}

#[async_trait]
impl RenderingHost for SnapshotHost {
    type Handle = SnapshotHandle;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.visited_urls
            .lock()
            .map_err(|_| ExtractionError::Host("URL log poisoned".to_string()))?
            .push(url.to_string());
        Ok(())
    }

    async fn element_by_id(&self, id: &str) -> Result<Option<Self::Handle>> {
        Ok(self
            .entries
            .iter()
            .position(|entry| !entry.node.is_text() && entry.node.id.as_deref() == Some(id))
            .map(SnapshotHandle))
    }

    async fn children(&self, element: &Self::Handle) -> Result<Vec<Self::Handle>> {
        self.entry(element)?;
        Ok(self.element_children(element.0).map(SnapshotHandle).collect())
    }

    async fn node_info(&self, element: &Self::Handle) -> Result<NodeInfo> {
        let node = &self.entry(element)?.node;
        let tag_name = node.tag.to_ascii_lowercase();
        let image_src = if tag_name == "img" {
            node.attributes.get("src").cloned()
        } else {
            None
        };
        let offset_height = node
            .offset_height
            .or(node.rect.map(|r| r.height))
            .unwrap_or(0.0);

        Ok(NodeInfo {
            id: node.id.clone().filter(|id| !id.is_empty()),
            class_name: node.class_name.clone(),
            image_src,
            text_content: self.text_content(element.0),
            has_only_text_nodes: self.element_children(element.0).next().is_none(),
            offset_height,
            scroll_height: node.scroll_height.unwrap_or(offset_height),
            client_height: node.client_height.unwrap_or(offset_height),
            tag_name,
        })
    }

    async fn bounding_box(&self, element: &Self::Handle) -> Result<Option<Rect>> {
        Ok(self.entry(element)?.node.rect)
    }

    async fn computed_style(&self, element: &Self::Handle) -> Result<ComputedStyle> {
        Ok(self.entry(element)?.node.style.clone())
    }

    async fn descendant_tag_names(&self, element: &Self::Handle) -> Result<Vec<String>> {
        self.entry(element)?;
        Ok(self
            .descendants(element.0)
            .into_iter()
            .map(|index| self.entries[index].node.tag.to_ascii_lowercase())
            .collect())
    }

    async fn inner_html(&self, element: &Self::Handle) -> Result<String> {
        self.entry(element)?;
        let mut out = String::new();
        self.write_inner_html(element.0, &mut out);
        Ok(out)
    }

    async fn outer_html(&self, element: &Self::Handle) -> Result<String> {
        self.entry(element)?;
        let mut out = String::new();
        self.write_outer_html(element.0, &mut out);
        Ok(out)
    }

    async fn attribute_values(
        &self,
        scope: &Self::Handle,
        attribute: &str,
    ) -> Result<Vec<String>> {
        self.entry(scope)?;
        Ok(self
            .descendants(scope.0)
            .into_iter()
            .filter_map(|index| self.entries[index].node.attributes.get(attribute).cloned())
            .collect())
    }

    async fn screenshot(&self, element: &Self::Handle) -> Result<Option<Vec<u8>>> {
        let node = &self.entry(element)?.node;
        self.record(SurfaceEvent::Captured(*element))?;
        node.screenshot
            .as_deref()
            .map(|encoded| {
                base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|e| ExtractionError::Decode(format!("snapshot screenshot: {}", e)))
            })
            .transpose()
    }

    async fn isolate(&self, element: &Self::Handle) -> Result<()> {
        self.entry(element)?;
        let mut isolated = self
            .isolated
            .lock()
            .map_err(|_| ExtractionError::Host("Isolation state poisoned".to_string()))?;
        if let Some(current) = *isolated {
            return Err(ExtractionError::Host(format!(
                "Surface already isolated for node {}",
                current.0
            )));
        }
        *isolated = Some(*element);
        drop(isolated);
        self.record(SurfaceEvent::Isolated(*element))
    }

    async fn restore(&self, element: &Self::Handle) -> Result<()> {
        let mut isolated = self
            .isolated
            .lock()
            .map_err(|_| ExtractionError::Host("Isolation state poisoned".to_string()))?;
        *isolated = None;
        drop(isolated);
        self.record(SurfaceEvent::Restored(*element))
    }
}

//! Recursive descent over a slide's element tree.
//!
//! Each visited element is extracted, checked against the skip rules, given the styles
//! it inherits from its ancestors, translated into slide coordinates and then either
//! emitted as a leaf, emitted as a capture candidate, or emitted and descended into.

use futures::future::{BoxFuture, FutureExt};
use log::debug;

use super::attributes::{extract_attributes, ExtractedElement};
use super::candidate::{Candidate, WalkEntry};
use super::policy;
use crate::errors::Result;
use crate::host::RenderingHost;
use crate::models::attributes::{Background, ElementAttributes, Font};
use crate::models::style::Rect;

/// Styles handed down from the nearest ancestor that set each of them.
///
/// `z_index` and `clip_path` only travel down the tree; `apply_to` never copies them
/// onto a record, which keeps its own stacking and clipping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InheritedStyle {
    pub font: Option<Font>,
    pub background: Option<Background>,
    pub border_radius: Option<[f64; 4]>,
    pub z_index: Option<i32>,
    pub opacity: Option<f64>,
    pub inside_svg: bool,
    pub clip_path: Option<String>,
}

impl InheritedStyle {
    /// Context seeded from the slide root itself.
    pub fn from_root(root: &ElementAttributes) -> Self {
        Self {
            font: root.font.clone(),
            background: root.background.clone(),
            z_index: Some(root.z_index),
            opacity: root.opacity,
            ..Default::default()
        }
    }

    /// Fills in what `attributes` leaves unset:
    /// font only onto text-bearing elements, background only onto shadow casters,
    /// border radius whenever absent, and opacity unless the element authored its own.
    pub fn apply_to(&self, attributes: &mut ElementAttributes) {
        if attributes.font.is_none() && attributes.has_text() {
            attributes.font = self.font.clone();
        }
        if attributes.background.is_none() && attributes.shadow.is_some() {
            attributes.background = self.background.clone();
        }
        if attributes.border_radius.is_none() {
            attributes.border_radius = self.border_radius;
        }
        if self.opacity.is_some() && attributes.opacity.map_or(true, |o| o == 1.0) {
            attributes.opacity = self.opacity;
        }
    }

    /// Context for the children of the element described by `attributes`.
    ///
    /// A zero z-index or opacity does not override the inherited value.
    pub fn for_children(&self, attributes: &ElementAttributes) -> Self {
        Self {
            font: attributes.font.clone().or_else(|| self.font.clone()),
            background: attributes
                .background
                .clone()
                .or_else(|| self.background.clone()),
            border_radius: attributes.border_radius.or(self.border_radius),
            z_index: Some(attributes.z_index)
                .filter(|z| *z != 0)
                .or(self.z_index),
            opacity: attributes
                .opacity
                .filter(|o| *o != 0.0 && !o.is_nan())
                .or(self.opacity),
            inside_svg: self.inside_svg || attributes.tag_name == "svg",
            clip_path: attributes
                .clip_path
                .clone()
                .or_else(|| self.clip_path.clone()),
        }
    }
}

/// Walks the subtree of one slide root. The origin is fixed for the whole walk.
pub struct TreeWalker<'a, H: RenderingHost> {
    host: &'a H,
    origin: Rect,
}

impl<'a, H: RenderingHost> TreeWalker<'a, H> {
    pub fn new(host: &'a H, origin: Rect) -> Self {
        Self { host, origin }
    }

    pub fn origin(&self) -> Rect {
        self.origin
    }

    /// Visits the children of `element` and returns every emitted candidate, parents
    /// before their descendants.
    pub fn walk<'b>(
        &'b self,
        element: &'b H::Handle,
        depth: usize,
        inherited: InheritedStyle,
    ) -> BoxFuture<'b, Result<Vec<WalkEntry<H::Handle>>>> {
        async move {
            let mut entries = Vec::new();
            for child in self.host.children(element).await? {
                self.visit(child, depth, &inherited, &mut entries).await?;
            }
            Ok(entries)
        }
        .boxed()
    }

    async fn visit(
        &self,
        child: H::Handle,
        depth: usize,
        inherited: &InheritedStyle,
        entries: &mut Vec<WalkEntry<H::Handle>>,
    ) -> Result<()> {
        let ExtractedElement {
            mut attributes,
            has_layout_box,
        } = extract_attributes(self.host, &child).await?;

        if policy::is_non_visual(
            &attributes.tag_name,
            inherited.inside_svg,
            attributes.class_name.as_deref(),
        ) {
            return Ok(());
        }

        inherited.apply_to(&mut attributes);

        if !has_layout_box {
            debug!("Dropping <{}> without a layout box", attributes.tag_name);
            return Ok(());
        }
        attributes.position = attributes.position.relative_to(&self.origin);
        if attributes.tag_name == "svg"
            && (attributes.position.width == 0.0 || attributes.position.height == 0.0)
        {
            debug!("Dropping zero-area <svg>");
            return Ok(());
        }

        if policy::COLLAPSIBLE_CONTAINER_TAGS.contains(&attributes.tag_name.as_str()) {
            let descendant_tags = self.host.descendant_tag_names(&child).await?;
            if policy::collapses_to_leaf(&attributes.tag_name, &descendant_tags) {
                attributes.inner_text = Some(self.host.inner_html(&child).await?);
                debug!(
                    "Collapsed <{}> with inline formatting into one text leaf",
                    attributes.tag_name
                );
                entries.push(WalkEntry {
                    candidate: Candidate::Resolved(attributes),
                    depth,
                });
                return Ok(());
            }
        }

        let child_context = inherited.for_children(&attributes);
        let is_svg = attributes.tag_name == "svg";
        let opaque = attributes.is_opaque();

        let candidate = if opaque {
            debug!("Marking <{}> for capture", attributes.tag_name);
            Candidate::Pending {
                attributes,
                handle: child.clone(),
            }
        } else {
            Candidate::Resolved(attributes)
        };
        entries.push(WalkEntry { candidate, depth });

        // Canvas and table content is captured whole; svg children are still classified.
        if !opaque || is_svg {
            let nested = self.walk(&child, depth + 1, child_context).await?;
            entries.extend(nested);
        }
        Ok(())
    }
}

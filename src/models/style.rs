// src/models/style.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A laid-out box, as reported by the rendering host or after translation into
/// slide-local coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Replaces non-finite components with 0.
    pub fn sanitized(self) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            left: finite(self.left),
            top: finite(self.top),
            width: finite(self.width),
            height: finite(self.height),
        }
    }

    /// Expresses this box relative to `origin`'s top-left corner.
    pub fn relative_to(self, origin: &Rect) -> Self {
        Self {
            left: self.left - origin.left,
            top: self.top - origin.top,
            width: self.width,
            height: self.height,
        }
    }

    /// True if the box sits at (0, 0) with exactly the given size.
    pub fn covers(&self, width: f64, height: f64) -> bool {
        self.left == 0.0 && self.top == 0.0 && self.width == width && self.height == height
    }
}

/// The computed style of one element: CSS property names (kebab-case) mapped to their
/// resolved values, in the order the host reported them.
///
/// Missing properties read as the empty string, which every parser treats as "unset".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputedStyle(pub IndexMap<String, String>);

impl ComputedStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `property`, or `""` if the host did not report it.
    pub fn get(&self, property: &str) -> &str {
        self.0.get(property).map(|v| v.trim()).unwrap_or("")
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.0.insert(property.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ComputedStyle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_coerces_non_finite() {
        let rect = Rect::new(f64::NAN, 4.0, f64::INFINITY, 10.0).sanitized();
        assert_eq!(rect, Rect::new(0.0, 4.0, 0.0, 10.0));
    }

    #[test]
    fn test_relative_to_keeps_size() {
        let origin = Rect::new(100.0, 50.0, 1280.0, 720.0);
        let rect = Rect::new(130.0, 70.0, 40.0, 20.0).relative_to(&origin);
        assert_eq!(rect, Rect::new(30.0, 20.0, 40.0, 20.0));
    }

    #[test]
    fn test_missing_property_reads_empty() {
        let style: ComputedStyle = [("color", " rgb(0, 0, 0) ")].into_iter().collect();
        assert_eq!(style.get("color"), "rgb(0, 0, 0)");
        assert_eq!(style.get("box-shadow"), "");
    }
}

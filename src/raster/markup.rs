//! Normalization of inline `<svg>` markup before it is rasterized out of context.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::errors::{ExtractionError, Result};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

static SVG_OPEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<svg\b[^>]*>").expect("valid regex"));
static WIDTH_ATTR: Lazy<Regex> = Lazy::new(|| attribute_pattern("width"));
static HEIGHT_ATTR: Lazy<Regex> = Lazy::new(|| attribute_pattern("height"));
static COLOR_ATTR: Lazy<Regex> = Lazy::new(|| attribute_pattern("color"));
static XMLNS_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\sxmlns\s*=").expect("valid regex"));

/// Matches a whole `name="..."` attribute preceded by whitespace, so that e.g. `width`
/// does not match inside `stroke-width`.
fn attribute_pattern(name: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)(\s){}\s*=\s*("[^"]*"|'[^']*'|[^\s>/]+)"#,
        name
    ))
    .expect("valid regex")
}

/// Sets `name` on an opening tag, replacing the existing value or inserting the
/// attribute right after the tag name.
fn set_attribute(tag: &str, pattern: &Regex, name: &str, value: &str) -> String {
    if pattern.is_match(tag) {
        pattern
            .replacen(tag, 1, |caps: &Captures| {
                format!("{}{}=\"{}\"", &caps[1], name, value)
            })
            .into_owned()
    } else {
        // "<svg" is four bytes; the open-tag pattern guarantees the prefix.
        format!("{} {}=\"{}\"{}", &tag[..4], name, value, &tag[4..])
    }
}

/// Prepares the outer markup of an inline `<svg>` for standalone rendering.
///
/// The root element gets explicit `width`/`height` matching its laid-out size, an SVG
/// namespace if it lacks one, and, when known, the element's text color so that
/// `currentColor` fills resolve as they did on the page. Only the first opening
/// `<svg>` tag is touched.
///
/// # Errors
///
/// Returns `ExtractionError::Rasterization` if the markup has no `<svg>` tag.
pub fn prepare_svg_markup(
    markup: &str,
    width: u32,
    height: u32,
    color: Option<&str>,
) -> Result<String> {
    let open_tag = SVG_OPEN_TAG.find(markup).ok_or_else(|| {
        ExtractionError::Rasterization("markup contains no <svg> element".to_string())
    })?;

    let mut tag = open_tag.as_str().to_string();
    tag = set_attribute(&tag, &WIDTH_ATTR, "width", &width.to_string());
    tag = set_attribute(&tag, &HEIGHT_ATTR, "height", &height.to_string());
    if !XMLNS_ATTR.is_match(&tag) {
        tag = format!("{} xmlns=\"{}\"{}", &tag[..4], SVG_NAMESPACE, &tag[4..]);
    }
    if let Some(hex) = color.filter(|hex| !hex.is_empty()) {
        tag = set_attribute(&tag, &COLOR_ATTR, "color", &format!("#{}", hex));
    }

    let mut prepared = String::with_capacity(markup.len() + 64);
    prepared.push_str(&markup[..open_tag.start()]);
    prepared.push_str(&tag);
    prepared.push_str(&markup[open_tag.end()..]);
    Ok(prepared)
}

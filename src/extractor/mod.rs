//! HTML metadata extraction.
//!
//! Pure parsing, no I/O. Each field falls through an ordered chain of
//! sources and settles on the first non-empty value:
//!
//! - title: `og:title` → `<title>` → first `<h1>`
//! - excerpt: `og:description` → `meta[name=description]` → first paragraph
//! - preview image: `og:image` → `twitter:image`
//!
//! Values are trimmed but otherwise raw; sanitization (entity decoding,
//! markup stripping, length caps) happens in the orchestrators.

use scraper::{Html, Selector};

/// Metadata pulled from a fetched page. Discarded after consumption.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub preview_image_url: Option<String>,
}

/// Extract metadata from an HTML document.
pub fn extract(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    let title = meta_content(&document, &["property", "name"], "og:title")
        .or_else(|| first_text(&document, &["title"]))
        .or_else(|| first_text(&document, &["h1"]));

    let excerpt = meta_content(&document, &["property", "name"], "og:description")
        .or_else(|| meta_content(&document, &["name"], "description"))
        .or_else(|| first_text(&document, &["article p", "main p", ".content p", "p"]));

    let preview_image_url = meta_content(&document, &["property", "name"], "og:image")
        .or_else(|| meta_content(&document, &["name", "property"], "twitter:image"));

    PageMetadata {
        title,
        excerpt,
        preview_image_url,
    }
}

/// First non-empty `content` attribute of a `<meta>` tag matching `key`
/// under any of the given attribute names. Pages disagree on whether Open
/// Graph tags use `property` or `name`, so both are accepted.
fn meta_content(document: &Html, attrs: &[&str], key: &str) -> Option<String> {
    for attr in attrs {
        let css = format!("meta[{}=\"{}\"]", attr, key);
        let Ok(selector) = Selector::parse(&css) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(content) = element.value().attr("content") {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

/// First non-empty text content among the selectors, tried in order.
fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for css in selectors {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element.text().collect::<String>();
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

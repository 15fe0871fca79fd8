//! Sanitization of extracted metadata before it leaves the pipeline.
//!
//! Persisted values must be markup-free and length-capped: titles at most
//! 200 characters, excerpts and URLs at most 500.

/// Maximum characters for a sanitized title.
pub const TITLE_MAX: usize = 200;
/// Maximum characters for a sanitized excerpt.
pub const EXCERPT_MAX: usize = 500;
/// Maximum characters for a preview image URL.
pub const URL_MAX: usize = 500;
/// Maximum characters for a persisted error message.
pub const ERROR_MAX: usize = 500;

/// Sanitize free text: entity-decode, strip markup, collapse whitespace
/// runs to a single space, trim, then cap with a trailing `"..."`.
///
/// Returns `None` when nothing readable remains.
pub fn sanitize_text(raw: &str, cap: usize) -> Option<String> {
    let decoded = html_escape::decode_html_entities(raw);
    let stripped = strip_markup(&decoded);
    let collapsed = collapse_whitespace(&stripped);
    let trimmed = collapsed.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(truncate_with_ellipsis(trimmed, cap))
    }
}

/// Sanitize a URL value: trim and hard-truncate, no ellipsis (a mangled URL
/// with `"..."` appended would look fetchable but isn't, so it is cut flat).
pub fn sanitize_url(raw: &str, cap: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(cap).collect())
    }
}

/// Hard character truncation for persisted error messages.
pub fn truncate_chars(raw: &str, cap: usize) -> String {
    raw.chars().take(cap).collect()
}

/// Cap at `cap` characters; oversize input becomes `cap - 3` characters
/// plus `"..."`, so the output is exactly `cap` characters long.
fn truncate_with_ellipsis(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        return text.to_string();
    }
    let mut out: String = text.chars().take(cap.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out
}

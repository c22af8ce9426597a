//! Raw HTML sanitizing.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SanitizeError;

/// Elements removed together with their content.
const STRIPPED_ELEMENTS: &[&str] = &["script", "iframe", "style", "object", "embed"];

static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
});
static SCRIPT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(href|src|action)\s*=\s*(?:"\s*javascript:[^"]*"|'\s*javascript:[^']*'|javascript:[^\s>]*)"#)
        .unwrap()
});

/// Cleans raw HTML before it is written.
pub trait Sanitizer {
    /// Return `html` with unsafe content removed.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError`] carrying the best output produced so far when
    /// the input cannot be fully cleaned.
    fn sanitize(&self, html: &str) -> Result<String, SanitizeError>;
}

/// Strips script-like elements, `on*` event handler attributes and
/// `javascript:` URLs.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultSanitizer;

impl Sanitizer for DefaultSanitizer {
    fn sanitize(&self, html: &str) -> Result<String, SanitizeError> {
        let mut out = html.to_owned();
        for tag in STRIPPED_ELEMENTS {
            out = strip_element(&out, tag)?;
        }
        let out = EVENT_HANDLER.replace_all(&out, "");
        let out = SCRIPT_URL.replace_all(&out, "$1=\"\"");
        Ok(out.into_owned())
    }
}

/// Remove every `<tag ...>...</tag>` from `html`.
fn strip_element(html: &str, tag: &str) -> Result<String, SanitizeError> {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(found) = find_open(&lower[pos..], &open) {
        let start = pos + found;
        out.push_str(&html[pos..start]);
        let Some(end) = lower[start..].find(&close) else {
            return Err(SanitizeError::Unterminated {
                tag: tag.to_owned(),
                partial: out,
            });
        };
        pos = start + end + close.len();
    }
    out.push_str(&html[pos..]);
    Ok(out)
}

/// Position of `<tag` followed by whitespace, `>` or `/`.
fn find_open(haystack: &str, open: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = haystack[from..].find(open) {
        let at = from + found;
        let next = haystack.as_bytes().get(at + open.len()).copied();
        if matches!(next, None | Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r')) {
            return Some(at);
        }
        from = at + open.len();
    }
    None
}

//! MHTML unwrapping.

use std::sync::LazyLock;

use regex::Regex;

use htmlpack_shared::{HtmlpackError, Result};

/// The `<html ...>…</html>` region of an MHTML archive.
///
/// Spans from the first opening tag to the last closing tag so documents with
/// nested `<html>` fragments stay intact.
pub fn extract_html(mhtml: &str) -> Result<&str> {
    static HTML_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?is)<html\b[^>]*>.*</html\s*>").expect("valid regex"));

    HTML_RE
        .find(mhtml)
        .map(|m| m.as_str())
        .ok_or(HtmlpackError::MalformedMhtml)
}

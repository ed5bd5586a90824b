//! Textual section extraction from the entry document.
//!
//! These are regex scans over raw text, not a structural parse: the first match
//! wins and malformed or nested markup is not specially handled. Everything that
//! looks at document structure goes through [`extract_section`] so the matching
//! strategy can be swapped out in one place.

use std::sync::LazyLock;

use regex::Regex;

/// Structural sections we pull out of an entry document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Head,
    Body,
    Title,
}

impl Section {
    fn regex(self) -> &'static Regex {
        static HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?is)<head(?:\s[^>]*)?>(.*?)</head\s*>").expect("valid regex")
        });
        static BODY_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?is)<body(?:\s[^>]*)?>(.*?)</body\s*>").expect("valid regex")
        });
        static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?is)<title(?:\s[^>]*)?>(.*?)</title\s*>").expect("valid regex")
        });

        match self {
            Self::Head => &HEAD_RE,
            Self::Body => &BODY_RE,
            Self::Title => &TITLE_RE,
        }
    }
}

/// Inner text of the first `<tag ...>…</tag>` region, if any.
pub fn extract_section(html: &str, section: Section) -> Option<&str> {
    section
        .regex()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Head, body, and title text of an entry document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    /// Inner head text; empty when the document has no `<head>`.
    pub head: String,
    /// Inner body text; the whole document when it has no `<body>`.
    pub body: String,
    /// Trimmed title text, `None` when absent or blank.
    pub title: Option<String>,
}

/// Split an entry document into its sections.
pub fn extract_sections(html: &str) -> Sections {
    let head = extract_section(html, Section::Head).unwrap_or_default();
    let body = extract_section(html, Section::Body).unwrap_or(html);
    let title = extract_section(html, Section::Title)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);

    Sections {
        head: head.to_string(),
        body: body.to_string(),
        title,
    }
}

/// Remove `<html>`, `<head>`, `<body>` open/close tags so fragments cannot
/// reintroduce document structure.
pub fn strip_structural_tags(text: &str) -> String {
    static STRUCTURAL_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)</?(?:html|head|body)\b[^>]*>").expect("valid regex")
    });

    STRUCTURAL_RE.replace_all(text, "").into_owned()
}

/// Remove `<title>` elements; the assembled document emits its own.
pub fn strip_title(text: &str) -> String {
    Section::Title.regex().replace_all(text, "").into_owned()
}

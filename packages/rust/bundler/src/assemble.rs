//! Document assembly: the final bundle layout and the synthetic fallback.

use std::fmt::Write as _;

use htmlpack_shared::FileEntry;

use crate::sections::strip_structural_tags;

/// Placeholder body message for projects without an HTML entry point.
pub const PLACEHOLDER_MESSAGE: &str = "Your project has been deployed successfully!";

/// Doctype, opening tags, meta tags, and the title tag.
fn document_prologue(out: &mut String, title: &str) {
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"UTF-8\">\n");
    out.push_str(
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    let _ = writeln!(out, "  <title>{title}</title>");
}

/// One `<style>` block holding every given stylesheet, each behind a path
/// comment. Nothing is written for an empty list.
fn style_block(out: &mut String, indent: &str, styles: &[&FileEntry]) {
    if styles.is_empty() {
        return;
    }
    let _ = writeln!(out, "{indent}<style>");
    for entry in styles {
        let _ = write!(out, "/* {} */\n{}\n\n", entry.path, entry.content);
    }
    let _ = writeln!(out, "{indent}</style>");
}

/// One `<script>` block holding every given script, each behind a path
/// comment. Nothing is written for an empty list.
fn script_block(out: &mut String, indent: &str, scripts: &[&FileEntry]) {
    if scripts.is_empty() {
        return;
    }
    let _ = writeln!(out, "{indent}<script>");
    for entry in scripts {
        let _ = write!(out, "// {}\n{}\n\n", entry.path, entry.content);
    }
    let _ = writeln!(out, "{indent}</script>");
}

/// Pieces of a bundle built from an entry document.
#[derive(Debug)]
pub struct DocumentParts<'a> {
    pub title: &'a str,
    /// Head text after inlining.
    pub head: &'a str,
    /// Body text after inlining.
    pub body: &'a str,
    /// Stylesheets not inlined into head or body.
    pub leftover_styles: Vec<&'a FileEntry>,
    /// Scripts not inlined into head or body.
    pub leftover_scripts: Vec<&'a FileEntry>,
}

/// Assemble the bundle in fixed order: prologue, leftover styles, cleaned head,
/// body, leftover scripts. `head` must already be free of its `<title>`.
pub fn assemble_document(parts: &DocumentParts<'_>) -> String {
    let head = strip_structural_tags(parts.head);
    let body = strip_structural_tags(parts.body);

    let mut out = String::with_capacity(head.len() + body.len() + 512);
    document_prologue(&mut out, parts.title);
    style_block(&mut out, "  ", &parts.leftover_styles);
    out.push_str(&head);
    out.push_str("\n</head>\n<body>\n");
    out.push_str(&body);
    out.push('\n');
    script_block(&mut out, "", &parts.leftover_scripts);
    out.push_str("</body>\n</html>");
    out
}

/// Build a minimal document from loose stylesheets and scripts when the
/// project has no HTML entry point.
pub fn synthesize_document(title: &str, styles: &[&FileEntry], scripts: &[&FileEntry]) -> String {
    let mut out = String::new();
    document_prologue(&mut out, title);
    style_block(&mut out, "  ", styles);
    out.push_str("</head>\n<body>\n");
    out.push_str("  <div id=\"app\">\n");
    let _ = writeln!(out, "    <h1>{title}</h1>");
    let _ = writeln!(out, "    <p>{PLACEHOLDER_MESSAGE}</p>");
    out.push_str("  </div>\n\n");
    script_block(&mut out, "  ", scripts);
    out.push_str("</body>\n</html>");
    out
}

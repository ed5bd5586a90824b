//! Size-reduction passes for assembled HTML.
//!
//! Each pass is a function `&str -> String` applied in sequence. The passes are
//! textual: there is no tokenizer, so `//` inside a string literal or URL is
//! treated as a line comment and everything after it on that line is dropped,
//! and every `"` becomes `'` whether or not the distinction matters to the
//! content. Both are accepted approximations.

use std::sync::LazyLock;

use regex::Regex;

/// Full minification for assembled bundles: markup, CSS, and JS comments.
pub fn minify(html: &str) -> String {
    let mut result = html.to_string();

    result = strip_html_comments(&result);
    result = strip_block_comments(&result);
    result = tidy_self_closing(&result);
    result = strip_line_comments(&result);
    result = collapse_whitespace(&result);
    result = strip_inter_tag_whitespace(&result);
    result = result.trim().to_string();
    result = normalize_quotes(&result);

    result
}

/// Markup-only minification for raw HTML uploads; embedded CSS and JS
/// comments are left alone.
pub fn minify_markup(html: &str) -> String {
    let mut result = html.to_string();

    result = strip_html_comments(&result);
    result = collapse_whitespace(&result);
    result = strip_inter_tag_whitespace(&result);
    result = tidy_self_closing(&result);
    result = result.trim().to_string();
    result = normalize_quotes(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass: comments
// ---------------------------------------------------------------------------

/// Remove `<!-- ... -->` comments.
fn strip_html_comments(html: &str) -> String {
    static HTML_COMMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

    HTML_COMMENT_RE.replace_all(html, "").into_owned()
}

/// Remove `/* ... */` comments.
fn strip_block_comments(html: &str) -> String {
    static BLOCK_COMMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));

    BLOCK_COMMENT_RE.replace_all(html, "").into_owned()
}

/// Remove `//` to end of line.
///
/// Must run before whitespace collapsing, which joins lines.
fn strip_line_comments(html: &str) -> String {
    static LINE_COMMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)//.*$").expect("valid regex"));

    LINE_COMMENT_RE.replace_all(html, "").into_owned()
}

// ---------------------------------------------------------------------------
// Pass: whitespace
// ---------------------------------------------------------------------------

/// Collapse every whitespace run to one space.
fn collapse_whitespace(html: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS_RE.replace_all(html, " ").into_owned()
}

/// Drop whitespace between a `>` and the next `<`.
fn strip_inter_tag_whitespace(html: &str) -> String {
    static INTER_TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r">\s+<").expect("valid regex"));

    INTER_TAG_RE.replace_all(html, "><").into_owned()
}

/// `<br />` becomes `<br/>`.
fn tidy_self_closing(html: &str) -> String {
    static SELF_CLOSING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s*/>").expect("valid regex"));

    SELF_CLOSING_RE.replace_all(html, "/>").into_owned()
}

// ---------------------------------------------------------------------------
// Pass: quotes
// ---------------------------------------------------------------------------

/// Replace every double quote with a single quote.
fn normalize_quotes(html: &str) -> String {
    html.replace('"', "'")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_all_comment_styles() {
        let input = "<!-- note --><style>/* c */a{}</style><script>\nx(); // trailing\n</script>";
        let result = minify(input);
        assert_eq!(result, "<style>a{}</style><script> x(); </script>");
    }

    #[test]
    fn collapses_whitespace_and_inter_tag_gaps() {
        let input = "<div>\n\n   <p>a    b</p>\n\t</div>";
        assert_eq!(minify(input), "<div><p>a b</p></div>");
    }

    #[test]
    fn tidies_self_closing_tags() {
        assert_eq!(minify("<br />\n<img src=\"a.png\"   />"), "<br/><img src='a.png'/>");
    }

    #[test]
    fn normalizes_double_quotes() {
        let result = minify(r#"<meta charset="UTF-8"><p class="x">"hi"</p>"#);
        assert!(!result.contains('"'));
        assert_eq!(result, "<meta charset='UTF-8'><p class='x'>'hi'</p>");
    }

    #[test]
    fn minify_is_a_fixpoint() {
        let input = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Demo</title>
  <style>
/* a.css */
body { margin: 0 }  /* reset */

  </style>
</head>
<body>
  <!-- banner -->
  <h1>Hello   world</h1>
  <br />
<script>
// app.js
let n = 1; // counter
console.log(n);
</script>
</body>
</html>"#;
        let once = minify(input);
        let twice = minify(&once);
        assert_eq!(once, twice);
        assert!(once.len() < input.len());
    }

    #[test]
    fn markup_minify_is_a_fixpoint() {
        let input = "<html>\n<!-- c -->\n<body class=\"a\">\n  <p>x  y</p>\n</body>\n</html>";
        let once = minify_markup(input);
        assert_eq!(once, "<html><body class='a'><p>x y</p></body></html>");
        assert_eq!(minify_markup(&once), once);
    }

    #[test]
    fn markup_minify_keeps_script_comments() {
        let input = "<script>\n// keep\nrun()\n</script>";
        assert_eq!(minify_markup(input), "<script> // keep run() </script>");
    }

    // Known-fragile boundary: the passes are textual, not tokenized.

    #[test]
    fn line_comment_pass_truncates_urls() {
        let input = "<a href=\"https://example.com\">link</a>\n<p>next</p>";
        let result = minify(input);
        assert_eq!(result, "<a href='https: <p>next</p>");
    }

    #[test]
    fn line_comment_pass_truncates_string_literals() {
        let input = "<script>\nconst re = \"a//b\"; run();\n</script>";
        let result = minify(input);
        assert_eq!(result, "<script> const re = 'a </script>");
    }

    #[test]
    fn quote_normalization_changes_nested_quotes() {
        let input = r#"<script>const s = "it's";</script>"#;
        assert_eq!(minify(input), "<script>const s = 'it's';</script>");
    }
}

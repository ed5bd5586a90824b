//! Asset reference discovery, path resolution, and inlining.
//!
//! Stylesheet `<link>` tags and external `<script src>` tags are located by
//! pattern matching, resolved against the [`FileSet`] with a three-tier path
//! match, and replaced in place with inline `<style>`/`<script>` blocks.
//! References that do not resolve are left untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use htmlpack_shared::{AssetKind, AssetReference, FileEntry, FileSet, ResolvedAsset};

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b([^>]*)>").expect("valid regex"));

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("valid regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid regex")
});

// ---------------------------------------------------------------------------
// Reference discovery
// ---------------------------------------------------------------------------

/// Find every stylesheet link and external script reference in `markup`,
/// in document order per kind (stylesheets first).
pub fn find_asset_references(markup: &str) -> Vec<AssetReference> {
    let stylesheets = LINK_RE
        .captures_iter(markup)
        .filter_map(|c| stylesheet_href(&c[1]))
        .map(|locator| AssetReference {
            kind: AssetKind::Stylesheet,
            locator,
        });

    let scripts = SCRIPT_RE
        .captures_iter(markup)
        .filter_map(|c| attribute(&c[1], "src"))
        .map(|locator| AssetReference {
            kind: AssetKind::Script,
            locator,
        });

    stylesheets.chain(scripts).collect()
}

/// The `href` of a `<link>` whose `rel` is `stylesheet`.
fn stylesheet_href(attrs: &str) -> Option<String> {
    let rel = attribute(attrs, "rel")?;
    if !rel.trim().eq_ignore_ascii_case("stylesheet") {
        return None;
    }
    attribute(attrs, "href")
}

/// Value of the named attribute in a raw attribute string.
///
/// Bare attributes (no `=value`) yield an empty string.
fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTR_RE
        .captures_iter(attrs)
        .find(|c| c[1].eq_ignore_ascii_case(name))
        .map(|c| {
            c.get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        })
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

/// Match a locator against the file set.
///
/// A file whose path is exactly the locator (ignoring a leading `./` or `/`)
/// always wins. Otherwise tiers are tried in order across the whole file set,
/// and within a tier the first file in file set order wins:
/// 1. the path with its leading segment stripped equals the locator
/// 2. the path ends with the locator
/// 3. the path contains the locator with any leading `./` removed
///
/// Remote locators (`scheme://`, `//host`, `data:`) and empty locators never
/// resolve. A `?query` or `#fragment` suffix is ignored.
pub fn resolve_locator<'a>(files: &'a FileSet, locator: &str) -> Option<&'a FileEntry> {
    let locator = strip_query(locator.trim());
    if locator.is_empty() || is_remote(locator) {
        return None;
    }

    if let Some(entry) = files.entry(root_relative(locator)) {
        return Some(entry);
    }

    if let Some(entry) = files.iter().find(|e| strip_root_segment(&e.path) == locator) {
        return Some(entry);
    }

    if let Some(entry) = files.iter().find(|e| e.path.ends_with(locator)) {
        return Some(entry);
    }

    let mut bare = locator;
    while let Some(rest) = bare.strip_prefix("./") {
        bare = rest;
    }
    if bare.is_empty() {
        return None;
    }
    files.iter().find(|e| e.path.contains(bare))
}

/// Resolve a reference into a [`ResolvedAsset`].
pub fn resolve(files: &FileSet, reference: AssetReference) -> ResolvedAsset {
    let path = resolve_locator(files, &reference.locator).map(|e| e.path.clone());
    ResolvedAsset { reference, path }
}

fn root_relative(locator: &str) -> &str {
    let mut rest = locator;
    loop {
        if let Some(r) = rest.strip_prefix("./") {
            rest = r;
        } else if let Some(r) = rest.strip_prefix('/') {
            rest = r;
        } else {
            return rest;
        }
    }
}

fn strip_root_segment(path: &str) -> &str {
    path.split_once('/').map_or(path, |(_, rest)| rest)
}

fn strip_query(locator: &str) -> &str {
    locator
        .find(['?', '#'])
        .map_or(locator, |idx| &locator[..idx])
}

fn is_remote(locator: &str) -> bool {
    locator.contains("://") || locator.starts_with("//") || locator.starts_with("data:")
}

// ---------------------------------------------------------------------------
// Inlining
// ---------------------------------------------------------------------------

/// Replace resolvable stylesheet links, then resolvable external scripts,
/// with inline blocks. Every reference seen is appended to `log`.
pub fn inline_assets(markup: &str, files: &FileSet, log: &mut Vec<ResolvedAsset>) -> String {
    let styled = inline_stylesheets(markup, files, log);
    inline_scripts(&styled, files, log)
}

fn inline_stylesheets(markup: &str, files: &FileSet, log: &mut Vec<ResolvedAsset>) -> String {
    LINK_RE
        .replace_all(markup, |caps: &Captures| {
            let Some(href) = stylesheet_href(&caps[1]) else {
                return caps[0].to_string();
            };
            let entry = resolve_locator(files, &href);
            let replacement = match entry {
                Some(entry) => {
                    debug!(%href, path = %entry.path, "inlining stylesheet");
                    style_block(&entry.path, &entry.content)
                }
                None => {
                    warn!(%href, "unresolved stylesheet reference left in place");
                    caps[0].to_string()
                }
            };
            log.push(ResolvedAsset {
                reference: AssetReference {
                    kind: AssetKind::Stylesheet,
                    locator: href,
                },
                path: entry.map(|e| e.path.clone()),
            });
            replacement
        })
        .into_owned()
}

fn inline_scripts(markup: &str, files: &FileSet, log: &mut Vec<ResolvedAsset>) -> String {
    SCRIPT_RE
        .replace_all(markup, |caps: &Captures| {
            let attrs = &caps[1];
            let Some(src) = attribute(attrs, "src") else {
                return caps[0].to_string();
            };
            let entry = resolve_locator(files, &src);
            let replacement = match entry {
                Some(entry) => {
                    debug!(%src, path = %entry.path, "inlining script");
                    script_block(&entry.path, &entry.content, attribute(attrs, "type").as_deref())
                }
                None => {
                    warn!(%src, "unresolved script reference left in place");
                    caps[0].to_string()
                }
            };
            log.push(ResolvedAsset {
                reference: AssetReference {
                    kind: AssetKind::Script,
                    locator: src,
                },
                path: entry.map(|e| e.path.clone()),
            });
            replacement
        })
        .into_owned()
}

fn style_block(path: &str, content: &str) -> String {
    format!("<style>\n/* {path} */\n{content}\n</style>")
}

/// Inline script block. A `type` attribute survives so module scripts keep
/// module semantics.
fn script_block(path: &str, content: &str, script_type: Option<&str>) -> String {
    match script_type {
        Some(t) if !t.is_empty() => format!("<script type=\"{t}\">\n// {path}\n{content}\n</script>"),
        _ => format!("<script>\n// {path}\n{content}\n</script>"),
    }
}

// ---------------------------------------------------------------------------
// Leftover assets
// ---------------------------------------------------------------------------

/// Asset files of `kind` whose content appears in none of `sections`.
///
/// Dependency-cache paths are always excluded.
pub fn unconsumed<'a>(files: &'a FileSet, kind: AssetKind, sections: &[&str]) -> Vec<&'a FileEntry> {
    files
        .with_suffix(kind.suffix())
        .filter(|e| !e.is_dependency_cache())
        .filter(|e| !sections.iter().any(|s| s.contains(e.content.as_str())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(entries: &[(&str, &str)]) -> FileSet {
        entries.iter().copied().collect()
    }

    #[test]
    fn finds_stylesheets_and_scripts() {
        let markup = r#"
            <link rel="icon" href="favicon.ico">
            <link href='a.css' rel='stylesheet'>
            <LINK REL=stylesheet HREF=b.css>
            <script src="app.js"></script>
            <script>inline()</script>
        "#;
        let refs = find_asset_references(markup);
        let locators: Vec<_> = refs.iter().map(|r| (r.kind, r.locator.as_str())).collect();
        assert_eq!(
            locators,
            [
                (AssetKind::Stylesheet, "a.css"),
                (AssetKind::Stylesheet, "b.css"),
                (AssetKind::Script, "app.js"),
            ]
        );
    }

    #[test]
    fn resolve_strips_archive_root_segment() {
        let fs = files(&[("projectroot/style.css", "x"), ("other/style.css", "y")]);
        let entry = resolve_locator(&fs, "style.css").unwrap();
        assert_eq!(entry.path, "projectroot/style.css");
    }

    #[test]
    fn resolve_exact_tier_beats_earlier_suffix_match() {
        let fs = files(&[("root/vendor/css/main.css", "a"), ("root/css/main.css", "b")]);
        let entry = resolve_locator(&fs, "css/main.css").unwrap();
        assert_eq!(entry.path, "root/css/main.css");
    }

    #[test]
    fn resolve_prefers_exact_path_over_nested_match() {
        let fs = files(&[("a/style.css", "WRONG{}"), ("index.html", ""), ("style.css", "RIGHT{}")]);
        assert_eq!(resolve_locator(&fs, "style.css").unwrap().content, "RIGHT{}");
        assert_eq!(resolve_locator(&fs, "./style.css").unwrap().content, "RIGHT{}");
        assert_eq!(resolve_locator(&fs, "/style.css").unwrap().content, "RIGHT{}");
        assert_eq!(resolve_locator(&fs, "a/style.css").unwrap().content, "WRONG{}");
    }

    #[test]
    fn resolve_absolute_locator_by_suffix() {
        let fs = files(&[("site-abc123/assets/app.js", "x")]);
        let entry = resolve_locator(&fs, "/assets/app.js").unwrap();
        assert_eq!(entry.path, "site-abc123/assets/app.js");
    }

    #[test]
    fn resolve_dot_slash_by_substring() {
        let fs = files(&[("repo/js/app.js", "x")]);
        assert_eq!(resolve_locator(&fs, "./js/app.js").unwrap().path, "repo/js/app.js");
        assert_eq!(resolve_locator(&fs, "././app.js").unwrap().path, "repo/js/app.js");
    }

    #[test]
    fn resolve_ignores_query_and_fragment() {
        let fs = files(&[("p/s.css", "x")]);
        assert!(resolve_locator(&fs, "s.css?v=3").is_some());
        assert!(resolve_locator(&fs, "s.css#top").is_some());
    }

    #[test]
    fn remote_and_empty_locators_never_resolve() {
        let fs = files(&[("p/cdn.example.com/lib.js", "x")]);
        assert!(resolve_locator(&fs, "https://cdn.example.com/lib.js").is_none());
        assert!(resolve_locator(&fs, "//cdn.example.com/lib.js").is_none());
        assert!(resolve_locator(&fs, "").is_none());
        assert!(resolve_locator(&fs, "./").is_none());
    }

    #[test]
    fn inlines_stylesheet_in_place() {
        let fs = files(&[("proj/s.css", "body{color:red}")]);
        let mut log = Vec::new();
        let out = inline_assets("<a><link rel='stylesheet' href='s.css'><b>", &fs, &mut log);
        assert_eq!(out, "<a><style>\n/* proj/s.css */\nbody{color:red}\n</style><b>");
        assert_eq!(log.len(), 1);
        assert!(log[0].is_resolved());
    }

    #[test]
    fn inlines_script_and_keeps_type() {
        let fs = files(&[("proj/app.js", "run()")]);
        let mut log = Vec::new();
        let out = inline_assets(
            r#"<script type="module" src="./app.js" defer></script>"#,
            &fs,
            &mut log,
        );
        assert_eq!(out, "<script type=\"module\">\n// proj/app.js\nrun()\n</script>");
    }

    #[test]
    fn script_with_body_text_is_still_inlined() {
        let fs = files(&[("p/a.js", "real()")]);
        let mut log = Vec::new();
        let out = inline_assets(r#"<script src="a.js">fallback()</script>"#, &fs, &mut log);
        assert_eq!(out, "<script>\n// p/a.js\nreal()\n</script>");
        assert!(!out.contains("fallback()"));
        assert!(log[0].is_resolved());
    }

    #[test]
    fn unresolved_references_are_left_untouched() {
        let fs = files(&[("proj/s.css", "x")]);
        let markup = r#"<link rel="stylesheet" href="missing.css"><script src="gone.js"></script>"#;
        let mut log = Vec::new();
        let out = inline_assets(markup, &fs, &mut log);
        assert_eq!(out, markup);
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|r| !r.is_resolved()));
    }

    #[test]
    fn replacement_content_is_literal() {
        let fs = files(&[("p/a.js", "let price = '$1.00'; // ${x}")]);
        let mut log = Vec::new();
        let out = inline_assets(r#"<script src="a.js"></script>"#, &fs, &mut log);
        assert!(out.contains("let price = '$1.00'; // ${x}"));
    }

    #[test]
    fn repeated_reference_is_inlined_each_time() {
        let fs = files(&[("p/a.css", "a{}")]);
        let mut log = Vec::new();
        let out = inline_assets(
            r#"<link rel="stylesheet" href="a.css"><link rel="stylesheet" href="a.css">"#,
            &fs,
            &mut log,
        );
        assert_eq!(out.matches("a{}").count(), 2);
        assert!(!out.contains("<link"));
    }

    #[test]
    fn unconsumed_skips_inlined_and_dependency_cache() {
        let fs = files(&[
            ("p/used.css", "used{}"),
            ("p/extra.css", "extra{}"),
            ("p/node_modules/lib/x.css", "dep{}"),
            ("p/app.js", "app()"),
        ]);
        let left = unconsumed(&fs, AssetKind::Stylesheet, &["<style>used{}</style>", ""]);
        let paths: Vec<_> = left.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["p/extra.css"]);
    }
}

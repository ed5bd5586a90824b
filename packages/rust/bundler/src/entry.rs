//! Entry document selection.

use htmlpack_shared::FileSet;
use tracing::debug;

/// Pick the HTML file that seeds the bundle.
///
/// Candidates are paths ending in `.html` or `.htm`. Priority, first match wins:
/// 1. a path whose final segment is exactly `index.html`
/// 2. a path containing `index` (case-insensitive)
/// 3. the first candidate in file set order
///
/// Returns `None` when the file set has no HTML at all.
pub fn select_entry(files: &FileSet) -> Option<&str> {
    let candidates: Vec<&str> = files
        .paths()
        .filter(|p| p.ends_with(".html") || p.ends_with(".htm"))
        .collect();

    debug!(candidates = candidates.len(), "selecting entry document");

    candidates
        .iter()
        .find(|p| final_segment(p) == "index.html")
        .or_else(|| {
            candidates
                .iter()
                .find(|p| p.to_ascii_lowercase().contains("index"))
        })
        .or_else(|| candidates.first())
        .copied()
}

fn final_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

//! Local directory and single-file reading.

use std::path::{Component, Path};

use htmlpack_shared::{FileSet, HtmlpackError, Result};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::archive::strip_bom;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &[".git"];

/// Read every text file under `root`.
///
/// Paths are relative to `root`, joined with `/`, and visited in sorted order
/// so the resulting set is the same on every platform.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn read_dir(root: &Path) -> Result<FileSet> {
    if !root.is_dir() {
        return Err(HtmlpackError::input_unavailable(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut files = FileSet::new();
    let mut skipped = 0usize;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir()
                && SKIPPED_DIRS.iter().any(|d| e.file_name() == *d))
        });

    for entry in walker {
        let entry = entry.map_err(|e| {
            HtmlpackError::input_unavailable(format!("failed to walk {}: {e}", root.display()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = slash_path(relative);
        let bytes = std::fs::read(entry.path()).map_err(|e| HtmlpackError::io(entry.path(), e))?;

        match String::from_utf8(bytes) {
            Ok(text) => files.insert(name, strip_bom(text)),
            Err(_) => {
                debug!(%name, "skipping non-text file");
                skipped += 1;
            }
        }
    }

    debug!(files = files.len(), skipped, "directory read");
    Ok(files)
}

/// Read one text file as a single-entry set keyed by its file name.
pub fn read_file(path: &Path) -> Result<FileSet> {
    let bytes = std::fs::read(path).map_err(|e| HtmlpackError::io(path, e))?;
    let text = String::from_utf8(bytes).map_err(|_| {
        HtmlpackError::input_unavailable(format!("{} is not UTF-8 text", path.display()))
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| slash_path(path));
    Ok(FileSet::single(name, strip_bom(text)))
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

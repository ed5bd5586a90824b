//! Core domain types for htmlpack bundling runs.

use std::collections::HashMap;
use std::fmt;

/// Title used when the entry document carries no `<title>`.
pub const DEFAULT_TITLE: &str = "Deployed Project";

/// Hard size ceiling for a finished bundle, in KB.
pub const DEFAULT_MAX_SIZE_KB: u64 = 100;

/// Bundles above this size are flagged as approaching the ceiling, in KB.
pub const DEFAULT_WARN_SIZE_KB: u64 = 90;

/// Paths containing this marker are never concatenated into fallback blocks.
pub const DEPENDENCY_CACHE_MARKER: &str = "node_modules";

// ---------------------------------------------------------------------------
// FileSet
// ---------------------------------------------------------------------------

/// A single project file: relative path plus text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Forward-slash separated relative path (may carry an archive root segment).
    pub path: String,
    /// Raw text content.
    pub content: String,
}

impl FileEntry {
    /// Whether the path sits inside a dependency cache directory.
    pub fn is_dependency_cache(&self) -> bool {
        self.path.contains(DEPENDENCY_CACHE_MARKER)
    }
}

/// Mapping from relative path to text content for one bundling run.
///
/// Iteration follows insertion order (archive order, or sorted order for
/// directory walks), so identical input always bundles identically.
/// Paths are unique; inserting an existing path replaces its content in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    entries: Vec<FileEntry>,
    /// Path to position in `entries`.
    index: HashMap<String, usize>,
}

impl FileSet {
    /// Create an empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A file set holding exactly one file.
    pub fn single(path: impl Into<String>, content: impl Into<String>) -> Self {
        let mut files = Self::new();
        files.insert(path, content);
        files
    }

    /// Insert a file, replacing the content of an existing path.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        match self.index.get(&path) {
            Some(&i) => self.entries[i].content = content,
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push(FileEntry { path, content });
            }
        }
    }

    /// Look up a file by exact path.
    pub fn entry(&self, path: &str) -> Option<&FileEntry> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    /// Look up a file's content by exact path.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entry(path).map(|e| e.content.as_str())
    }

    /// Iterate over files in stable order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileEntry> {
        self.entries.iter()
    }

    /// Iterate over paths in stable order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    /// Files whose path ends with `suffix` (case-sensitive).
    pub fn with_suffix<'a>(&'a self, suffix: &'a str) -> impl Iterator<Item = &'a FileEntry> {
        self.entries.iter().filter(move |e| e.path.ends_with(suffix))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total content size in bytes.
    pub fn total_bytes(&self) -> usize {
        self.entries.iter().map(|e| e.content.len()).sum()
    }
}

impl<P: Into<String>, C: Into<String>> FromIterator<(P, C)> for FileSet {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut files = Self::new();
        for (path, content) in iter {
            files.insert(path, content);
        }
        files
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a FileEntry;
    type IntoIter = std::slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Asset references
// ---------------------------------------------------------------------------

/// Kind of an inlinable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Stylesheet,
    Script,
}

impl AssetKind {
    /// File suffix identifying assets of this kind in a [`FileSet`].
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Stylesheet => ".css",
            Self::Script => ".js",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stylesheet => f.write_str("stylesheet"),
            Self::Script => f.write_str("script"),
        }
    }
}

/// A stylesheet or script locator as written in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub kind: AssetKind,
    /// Raw `href`/`src` attribute value.
    pub locator: String,
}

/// An [`AssetReference`] paired with the file it resolved to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub reference: AssetReference,
    /// Matched [`FileSet`] path; `None` leaves the reference untouched.
    pub path: Option<String>,
}

impl ResolvedAsset {
    pub fn is_resolved(&self) -> bool {
        self.path.is_some()
    }
}

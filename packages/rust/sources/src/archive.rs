//! Zip archive reading.
//!
//! Entries keep archive order. Only UTF-8 text is collected; images, fonts and
//! other binary members are skipped since nothing in a bundle can reference
//! them by inlining.

use std::io::{Cursor, Read};
use std::path::Path;

use htmlpack_shared::{FileSet, HtmlpackError, Result};
use tracing::{debug, instrument};
use zip::ZipArchive;

/// Ceiling on the total decompressed size of one archive (64 MB).
const MAX_EXTRACTED_BYTES: u64 = 64 * 1024 * 1024;

/// Read every text member of an in-memory zip archive.
#[instrument(skip_all, fields(bytes = bytes.len()))]
pub fn read_zip(bytes: &[u8]) -> Result<FileSet> {
    read_zip_capped(bytes, MAX_EXTRACTED_BYTES)
}

/// [`read_zip`] with an explicit ceiling on decompressed bytes. Exceeding it
/// fails the whole read; declared member sizes are not trusted.
fn read_zip_capped(bytes: &[u8], max_bytes: u64) -> Result<FileSet> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| HtmlpackError::Archive(format!("failed to open zip: {e}")))?;

    let mut files = FileSet::new();
    let mut skipped = 0usize;
    let mut remaining = max_bytes;

    for i in 0..archive.len() {
        let mut member = archive
            .by_index(i)
            .map_err(|e| HtmlpackError::Archive(format!("entry {i}: {e}")))?;
        if member.is_dir() {
            continue;
        }

        let name = member.name().replace('\\', "/");
        let mut buf = Vec::new();
        (&mut member)
            .take(remaining.saturating_add(1))
            .read_to_end(&mut buf)
            .map_err(|e| HtmlpackError::Archive(format!("{name}: {e}")))?;
        let read = buf.len() as u64;
        if read > remaining {
            return Err(HtmlpackError::Archive(format!(
                "archive expands beyond {max_bytes} bytes (at {name})"
            )));
        }
        remaining -= read;

        match String::from_utf8(buf) {
            Ok(text) => files.insert(name, strip_bom(text)),
            Err(_) => {
                debug!(%name, "skipping non-text archive member");
                skipped += 1;
            }
        }
    }

    debug!(files = files.len(), skipped, "archive read");
    Ok(files)
}

/// Read a zip archive from disk.
pub fn read_zip_file(path: &Path) -> Result<FileSet> {
    let bytes = std::fs::read(path).map_err(|e| HtmlpackError::io(path, e))?;
    read_zip(&bytes)
}

pub(crate) fn strip_bom(text: String) -> String {
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

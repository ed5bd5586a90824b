//! Error types for htmlpack.
//!
//! Library crates use [`HtmlpackError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all htmlpack operations.
#[derive(Debug, thiserror::Error)]
pub enum HtmlpackError {
    /// The project files could not be obtained (download, extraction, read).
    #[error("could not obtain input: {message}")]
    InputUnavailable { message: String },

    /// The collected file set has no files at all.
    #[error("could not obtain input: the project contains no files")]
    EmptyInput,

    /// MHTML input without an `<html>...</html>` region.
    #[error("malformed input: no HTML content found in MHTML input")]
    MalformedMhtml,

    /// The finished bundle is larger than the configured ceiling.
    #[error("input too large: bundle size ({size_kb:.2}KB) exceeds {limit_kb}KB limit")]
    SizeExceeded { size_kb: f64, limit_kb: u64 },

    /// Network/HTTP error while downloading a project archive.
    #[error("network error: {0}")]
    Network(String),

    /// Zip archive could not be read.
    #[error("archive error: {0}")]
    Archive(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid argument or unsupported input.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HtmlpackError>;

impl HtmlpackError {
    /// Create an input-unavailable error from any displayable message.
    pub fn input_unavailable(msg: impl Into<String>) -> Self {
        Self::InputUnavailable {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the input could not be obtained at all.
    pub fn is_input_unavailable(&self) -> bool {
        matches!(
            self,
            Self::InputUnavailable { .. }
                | Self::EmptyInput
                | Self::Network(_)
                | Self::Archive(_)
                | Self::Io { .. }
        )
    }
}

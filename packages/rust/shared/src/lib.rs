//! Shared types, error model, and configuration for htmlpack.
//!
//! This crate is the foundation depended on by all other htmlpack crates.
//! It provides:
//! - [`HtmlpackError`], the unified error type
//! - Domain types ([`FileSet`], [`AssetReference`], [`ResolvedAsset`])
//! - Configuration ([`AppConfig`], [`BundleOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BundleConfig, BundleOptions, GithubConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{HtmlpackError, Result};
pub use types::{
    AssetKind, AssetReference, DEPENDENCY_CACHE_MARKER, DEFAULT_MAX_SIZE_KB, DEFAULT_TITLE,
    DEFAULT_WARN_SIZE_KB, FileEntry, FileSet, ResolvedAsset,
};

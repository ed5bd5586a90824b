//! Core pipeline orchestration for htmlpack.
//!
//! This crate ties together source collection, bundling, and the size check
//! into end-to-end workflows (e.g., `build`).

pub mod pipeline;

pub use pipeline::{
    BuildMethod, BuildOptions, BuildResult, Inspection, ProgressReporter, SilentProgress, Source,
    build, digest, inspect,
};

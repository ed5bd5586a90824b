//! Framework detection for collected projects.
//!
//! Framework projects need a build step this tool does not run; detecting
//! them lets callers warn that the bundle is best effort.

use std::fmt;

use tracing::debug;

use htmlpack_shared::FileSet;

/// Kind of project a file set looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    NextJs,
    React,
    Vue,
    Vite,
    Static,
}

impl ProjectType {
    /// Whether the project normally needs a build pipeline before serving.
    pub fn needs_build(self) -> bool {
        !matches!(self, Self::Static)
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NextJs => "nextjs",
            Self::React => "react",
            Self::Vue => "vue",
            Self::Vite => "vite",
            Self::Static => "static",
        };
        f.write_str(name)
    }
}

/// Classify a file set from its `package.json` dependencies, then from
/// framework config file names.
pub fn detect_project_type(files: &FileSet) -> ProjectType {
    let manifest = files
        .iter()
        .find(|e| e.path.ends_with("package.json") && !e.is_dependency_cache());

    if let Some(manifest) = manifest {
        match serde_json::from_str::<serde_json::Value>(&manifest.content) {
            Ok(json) => {
                if let Some(deps) = json.get("dependencies").and_then(|d| d.as_object()) {
                    for (name, kind) in [
                        ("next", ProjectType::NextJs),
                        ("react", ProjectType::React),
                        ("vue", ProjectType::Vue),
                    ] {
                        if deps.contains_key(name) {
                            return kind;
                        }
                    }
                }
            }
            Err(e) => {
                debug!(path = %manifest.path, error = %e, "ignoring unparseable package.json");
            }
        }
    }

    if files.paths().any(|p| p.contains("next.config")) {
        ProjectType::NextJs
    } else if files.paths().any(|p| p.contains("vite.config")) {
        ProjectType::Vite
    } else {
        ProjectType::Static
    }
}

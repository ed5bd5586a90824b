//! Application configuration for htmlpack.
//!
//! User config lives at `~/.htmlpack/htmlpack.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HtmlpackError, Result};
use crate::types::{DEFAULT_MAX_SIZE_KB, DEFAULT_TITLE, DEFAULT_WARN_SIZE_KB};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "htmlpack.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".htmlpack";

// ---------------------------------------------------------------------------
// Config structs (matching htmlpack.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bundling defaults.
    #[serde(default)]
    pub bundle: BundleConfig,

    /// GitHub archive download settings.
    #[serde(default)]
    pub github: GithubConfig,
}

/// `[bundle]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Title used when the entry document has none.
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Hard ceiling for the finished bundle, in KB.
    #[serde(default = "default_max_size_kb")]
    pub max_size_kb: u64,

    /// Bundles above this size are reported as approaching the ceiling.
    #[serde(default = "default_warn_size_kb")]
    pub warn_size_kb: u64,

    /// Run the minifier over the assembled document.
    #[serde(default = "default_true")]
    pub minify: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            max_size_kb: default_max_size_kb(),
            warn_size_kb: default_warn_size_kb(),
            minify: true,
        }
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.into()
}
fn default_max_size_kb() -> u64 {
    DEFAULT_MAX_SIZE_KB
}
fn default_warn_size_kb() -> u64 {
    DEFAULT_WARN_SIZE_KB
}
fn default_true() -> bool {
    true
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Base URL of the GitHub REST API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Timeout for the archive download, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".into()
}
fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Bundle options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime bundling options, merged from config file and CLI flags.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    /// Title used when the entry document has none.
    pub default_title: String,
    /// Hard ceiling for the finished bundle, in KB.
    pub max_size_kb: u64,
    /// Soft threshold for the "approaching the limit" warning, in KB.
    pub warn_size_kb: u64,
    /// Run the minifier over the assembled document.
    pub minify: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for BundleOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            default_title: config.bundle.default_title.clone(),
            max_size_kb: config.bundle.max_size_kb,
            warn_size_kb: config.bundle.warn_size_kb,
            minify: config.bundle.minify,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.htmlpack/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| HtmlpackError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.htmlpack/htmlpack.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| HtmlpackError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        HtmlpackError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    if config.bundle.warn_size_kb > config.bundle.max_size_kb {
        return Err(HtmlpackError::config(format!(
            "warn_size_kb ({}) must not exceed max_size_kb ({})",
            config.bundle.warn_size_kb, config.bundle.max_size_kb
        )));
    }

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| HtmlpackError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| HtmlpackError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| HtmlpackError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

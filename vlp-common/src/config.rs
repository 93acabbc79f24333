//! Configuration loading and directory resolution
//!
//! Bootstrap configuration comes from an optional TOML file. A missing file is
//! never fatal: programs log a warning and run on compiled defaults. A file
//! that exists but does not parse is a configuration error.
//!
//! **Config file priority:**
//! 1. Command-line argument (highest priority)
//! 2. `VLP_CONFIG` environment variable
//! 3. `<platform config dir>/vlp/config.toml`
//! 4. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "VLP_CONFIG";

/// Environment variable overriding the bundled content root
pub const CONTENT_ROOT_ENV_VAR: &str = "VLP_CONTENT_ROOT";

/// Environment variable overriding the batch validator's lessons root
pub const LESSONS_ROOT_ENV_VAR: &str = "VLP_LESSONS_ROOT";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where lesson content is fetched from
    #[serde(default)]
    pub content: ContentConfig,

    /// Cache and retry settings of the lesson loader
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Lesson path resolution tables, merged over the compiled snapshot
    #[serde(default)]
    pub paths: PathsConfig,

    /// Batch validator settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Kind of content source, in the order the loader tries them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Lesson JSON shipped alongside the application
    Bundled,
    /// Lesson JSON fetched over HTTP
    Network,
}

/// Content source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Root directory of bundled lesson assets
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Base URL for the network source (network source disabled when absent)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Source order tried within one load attempt
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceKind>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: None,
            base_url: None,
            sources: default_sources(),
        }
    }
}

/// Loader cache and retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Maximum number of cached lesson documents
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Maximum load attempts per lesson
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit; attempt N waits N × base_delay_ms before the next try
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// Path resolution tables
///
/// Scalar fields replace the compiled value when present. Map entries are
/// merged over the compiled tables, and `verbatim_folders` entries are added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub module_prefix: Option<String>,
    #[serde(default)]
    pub default_module_folder: Option<String>,
    /// lessonId → full path, exact match wins unconditionally
    #[serde(default)]
    pub lesson_overrides: BTreeMap<String, String>,
    /// Normalized slug → canonical file name
    #[serde(default)]
    pub slug_aliases: BTreeMap<String, String>,
    /// moduleId → folder name
    #[serde(default)]
    pub module_folders: BTreeMap<String, String>,
    /// Folders whose files are named exactly after the lessonId
    #[serde(default)]
    pub verbatim_folders: Vec<String>,
    /// Slug → sub-category folder for the module-03 tree
    #[serde(default)]
    pub category_overrides: BTreeMap<String, String>,
}

/// Batch validator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Directory scanned for lesson JSON files
    #[serde(default)]
    pub lessons_root: Option<PathBuf>,

    /// External JSON Schema document (bundled schema used when absent)
    #[serde(default)]
    pub schema_path: Option<PathBuf>,

    /// File name prefixes excluded from scanning (`schema` skips `schema*.json`)
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            lessons_root: None,
            schema_path: None,
            exclude: default_exclude(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sources() -> Vec<SourceKind> {
    vec![SourceKind::Bundled, SourceKind::Network]
}

fn default_cache_capacity() -> usize {
    50
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_exclude() -> Vec<String> {
    vec![
        "schema".to_string(),
        "metadata".to_string(),
        "index".to_string(),
    ]
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Locate the config file following the priority order
///
/// Returns `None` when no candidate exists on disk.
pub fn locate_config_file(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    dirs::config_dir()
        .map(|d| d.join("vlp").join("config.toml"))
        .filter(|p| p.exists())
}

/// Load configuration, degrading to compiled defaults when no file exists
pub fn load_or_default(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = locate_config_file(cli_arg) else {
        info!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} not found, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let config = load_toml_config(&path)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolve a directory setting
///
/// **Priority:** CLI argument → environment variable → TOML → compiled default
pub fn resolve_dir(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_value: Option<&Path>,
    default: &str,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    PathBuf::from(default)
}

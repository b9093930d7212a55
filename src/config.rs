//! Configuration for the code-intelligence index engine.
//!
//! A layered `figment` stack: built-in defaults, an optional TOML file, then
//! environment variables prefixed `LCI_` with `__` separating nested keys
//! (e.g. `LCI_COORDINATOR__LOCK_TIMEOUT_MS=2000`). The knobs here are the
//! operator-tunable ones the engine itself reads: the content loader's size
//! limit and worker count, the walker's exclusion patterns, the coordinator's
//! lock timeouts, and logging verbosity.

use crate::coordinator::LockOrderingStrategy;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub file_service: FileServiceConfig,

    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    #[serde(default)]
    pub semantic_search: SemanticSearchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FileServiceConfig {
    /// Maximum file size the loader will read, in bytes. Larger files are
    /// skipped with a `FileTooLarge` error rather than loaded.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,

    /// Size of the bounded worker pool used for batch loads.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Additional glob-style exclusion patterns, layered on top of
    /// `.gitignore`/`.git/info/exclude`.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Follow symlinks while walking. Off by default; the walker still
    /// guards against cycles via canonicalized-path tracking regardless.
    #[serde(default = "default_false")]
    pub follow_links: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoordinatorConfig {
    /// How long a lock acquisition spins/waits before returning
    /// `LockTimeout`.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Extra buffer added between successive locks in a multi-lock
    /// acquisition, to reduce thundering-herd retries.
    #[serde(default = "default_multi_lock_buffer_ms")]
    pub multi_lock_buffer_ms: u64,

    /// Depth of the in-memory status-snapshot history ring.
    #[serde(default = "default_status_history_len")]
    pub status_history_len: usize,

    /// Lock ordering strategy used when a caller must hold more than one
    /// index lock at a time.
    #[serde(default)]
    pub lock_ordering: LockOrderingStrategy,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SemanticSearchConfig {
    /// Minimum word length considered for stemming/phonetic indexing;
    /// shorter tokens are kept only in the exact-word index.
    #[serde(default = "default_min_word_length")]
    pub min_word_length: usize,

    /// Whether the abbreviation/translation dictionary's reverse index is
    /// consulted during lookup.
    #[serde(default = "default_true")]
    pub enable_abbreviations: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level filter, e.g. `"info"`, `"debug"`.
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module overrides, e.g. `{"codanna_lci::coordinator": "debug"}`.
    #[serde(default)]
    pub modules: HashMap<String, String>,

    /// Suppress INFO-level spans when the engine is embedded as a library
    /// inside another process's logging setup.
    #[serde(default = "default_false")]
    pub embedded_mode: bool,
}

fn default_version() -> u32 {
    1
}
fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}
fn default_worker_count() -> usize {
    10
}
fn default_lock_timeout_ms() -> u64 {
    5_000
}
fn default_multi_lock_buffer_ms() -> u64 {
    100
}
fn default_status_history_len() -> usize {
    50
}
fn default_min_word_length() -> usize {
    2
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            file_service: FileServiceConfig::default(),
            coordinator: CoordinatorConfig::default(),
            semantic_search: SemanticSearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for FileServiceConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
            worker_count: default_worker_count(),
            exclude_patterns: vec![
                "target/**".to_string(),
                "node_modules/**".to_string(),
                ".git/**".to_string(),
            ],
            follow_links: false,
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            multi_lock_buffer_ms: default_multi_lock_buffer_ms(),
            status_history_len: default_status_history_len(),
            lock_ordering: LockOrderingStrategy::default(),
        }
    }
}

impl Default for SemanticSearchConfig {
    fn default() -> Self {
        Self {
            min_word_length: default_min_word_length(),
            enable_abbreviations: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
            embedded_mode: false,
        }
    }
}

impl Settings {
    /// Load configuration from defaults, an optional workspace config file,
    /// then environment overrides.
    pub fn load() -> Result<Self, figment::Error> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".code-intelligence/settings.toml"));
        Self::build(config_path).extract()
    }

    /// Load configuration from a specific file, skipping workspace discovery.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, figment::Error> {
        Self::build(path).extract()
    }

    fn build(config_path: impl AsRef<std::path::Path>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(
                Env::prefixed("LCI_")
                    .map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
    }

    /// Search from the current directory upward for a `.code-intelligence`
    /// workspace marker.
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".code-intelligence");
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }
        None
    }

    /// Root directory of the enclosing `.code-intelligence` workspace, if any.
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            if ancestor.join(".code-intelligence").is_dir() {
                return Some(ancestor.to_path_buf());
            }
        }
        None
    }

    /// Write the current settings to `path` as TOML, creating parent
    /// directories as needed.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }
}

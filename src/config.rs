//! YAML configuration file support for neardup.
//!
//! A single file describes the cache construction parameters, the per-call
//! defaults and the log level used by the binary.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # neardup configuration
//! version: "1"
//!
//! cache:
//!   num_seeds: 100
//!   num_bands: 10
//!   char_ngram: 8
//!   hashbytes: 8
//!   random_state: 42
//!   storage: "zstd"
//!   zstd_level: 9
//!   use_parallel: false
//!   normalize:
//!     strip_chars: ".,;:-+=&*!?><()"
//!     lowercase: true
//!
//! check:
//!   min_similarity: 0.65
//!   update: true
//!
//! log_level: "info"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use canonical::NormalizeConfig;
use index::{EntryCodec, ZSTD_LEVELS};

use crate::{CacheConfig, CheckOptions, DEFAULT_MIN_SIMILARITY};

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NeardupConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub cache: CacheYamlConfig,

    #[serde(default)]
    pub check: CheckYamlConfig,

    /// `EnvFilter` directive used by the binary.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl NeardupConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: NeardupConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.cache.validate()?;
        self.check.validate()?;
        Ok(())
    }

    /// Cache construction parameters described by this file.
    pub fn cache_config(&self) -> CacheConfig {
        let cache = &self.cache;
        CacheConfig {
            num_seeds: cache.num_seeds,
            num_bands: cache.num_bands,
            char_ngram: cache.char_ngram,
            random_state: cache.random_state,
            hashbytes: cache.hashbytes,
            seeds: cache.seeds.clone(),
            storage: cache.entry_codec(),
            normalize: cache.normalize.clone(),
            use_parallel: cache.use_parallel,
        }
    }

    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            min_similarity: self.check.min_similarity,
            update: self.check.update,
        }
    }
}

impl Default for NeardupConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            cache: CacheYamlConfig::default(),
            check: CheckYamlConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Cache YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheYamlConfig {
    #[serde(default = "default_num_seeds")]
    pub num_seeds: usize,

    #[serde(default = "default_num_bands")]
    pub num_bands: usize,

    #[serde(default = "default_char_ngram")]
    pub char_ngram: usize,

    #[serde(default = "default_hashbytes")]
    pub hashbytes: usize,

    #[serde(default)]
    pub random_state: Option<u64>,

    #[serde(default)]
    pub seeds: Option<Vec<u32>>,

    /// "plain", "zstd" or "shingles"
    #[serde(default = "default_storage")]
    pub storage: String,

    #[serde(default = "default_zstd_level")]
    pub zstd_level: i32,

    #[serde(default)]
    pub use_parallel: bool,

    #[serde(default)]
    pub normalize: NormalizeConfig,
}

impl CacheYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.seeds.is_none() && self.num_seeds == 0 {
            return Err(ConfigLoadError::Validation(
                "cache.num_seeds must be >= 1".to_string(),
            ));
        }
        if self.num_bands == 0 {
            return Err(ConfigLoadError::Validation(
                "cache.num_bands must be >= 1".to_string(),
            ));
        }
        let signature_len = self.seeds.as_ref().map_or(self.num_seeds, Vec::len);
        if signature_len % self.num_bands != 0 {
            return Err(ConfigLoadError::Validation(format!(
                "cache.num_bands ({}) must divide the signature length ({signature_len})",
                self.num_bands
            )));
        }
        if self.char_ngram == 0 {
            return Err(ConfigLoadError::Validation(
                "cache.char_ngram must be >= 1".to_string(),
            ));
        }
        // 16 parses here and is rejected as unsupported when the cache is built.
        if !matches!(self.hashbytes, 4 | 8 | 16) {
            return Err(ConfigLoadError::Validation(format!(
                "cache.hashbytes must be 4, 8 or 16 (got {})",
                self.hashbytes
            )));
        }
        match self.storage.as_str() {
            "plain" | "shingles" => {}
            "zstd" => {
                if !ZSTD_LEVELS.contains(&self.zstd_level) {
                    return Err(ConfigLoadError::Validation(format!(
                        "cache.zstd_level must be in 1..=22 (got {})",
                        self.zstd_level
                    )));
                }
            }
            other => {
                return Err(ConfigLoadError::Validation(format!(
                    "cache.storage must be one of: plain, zstd, shingles (got {other})"
                )));
            }
        }
        self.normalize
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("cache.normalize: {e}")))
    }

    fn entry_codec(&self) -> EntryCodec {
        match self.storage.as_str() {
            "plain" => EntryCodec::Plain,
            "shingles" => EntryCodec::Shingles,
            _ => EntryCodec::Zstd {
                level: self.zstd_level,
            },
        }
    }
}

impl Default for CacheYamlConfig {
    fn default() -> Self {
        Self {
            num_seeds: default_num_seeds(),
            num_bands: default_num_bands(),
            char_ngram: default_char_ngram(),
            hashbytes: default_hashbytes(),
            random_state: None,
            seeds: None,
            storage: default_storage(),
            zstd_level: default_zstd_level(),
            use_parallel: false,
            normalize: NormalizeConfig::default(),
        }
    }
}

/// Per-call defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckYamlConfig {
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,

    #[serde(default = "true_value")]
    pub update: bool,
}

impl CheckYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if !self.min_similarity.is_finite() || !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(ConfigLoadError::Validation(format!(
                "check.min_similarity must be within [0, 1] (got {})",
                self.min_similarity
            )));
        }
        Ok(())
    }
}

impl Default for CheckYamlConfig {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
            update: true,
        }
    }
}

fn default_num_seeds() -> usize {
    100
}
fn default_num_bands() -> usize {
    10
}
fn default_char_ngram() -> usize {
    8
}
fn default_hashbytes() -> usize {
    8
}
fn default_storage() -> String {
    "zstd".to_string()
}
fn default_zstd_level() -> i32 {
    9
}
fn default_min_similarity() -> f64 {
    DEFAULT_MIN_SIMILARITY
}
fn true_value() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

//! Configuration types for text normalization.
//!
//! This module defines [`NormalizeConfig`], which controls how raw document
//! text is turned into the byte sequence that the shingler consumes.
//!
//! # Versioning
//!
//! Any change to normalization behavior must be accompanied by a version
//! bump. Stored documents are compared by re-shingling their normalized
//! bytes, so two caches that disagree on normalization will never agree on
//! a duplicate decision.
//!
//! # Examples
//!
//! ```rust
//! use canonical::NormalizeConfig;
//!
//! let config = NormalizeConfig::default();
//! assert_eq!(config.version, 1);
//! assert!(config.lowercase);
//! assert_eq!(config.strip_chars, ".,;:-+=&*!?><()");
//! ```
//!
//! ## Keeping punctuation
//!
//! ```rust
//! use canonical::NormalizeConfig;
//!
//! let config = NormalizeConfig::default().with_strip_chars("");
//! assert!(config.strip_chars.is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// The punctuation set removed by default.
pub const DEFAULT_STRIP_CHARS: &str = ".,;:-+=&*!?><()";

/// Configuration for the normalization step.
///
/// # Serialization
///
/// ```json
/// {
///   "version": 1,
///   "newline_to_space": true,
///   "strip_chars": ".,;:-+=&*!?><()",
///   "lowercase": true,
///   "trim": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Version of the normalization behavior.
    ///
    /// Must be >= 1; version 0 is reserved and rejected by [`validate`](Self::validate).
    pub version: u32,

    /// Replace every `\n` with a single ASCII space.
    pub newline_to_space: bool,

    /// Characters deleted from the text. Each `char` is matched individually.
    pub strip_chars: String,

    /// Apply locale-free Unicode lowercasing.
    pub lowercase: bool,

    /// Trim ASCII whitespace from both ends of the encoded bytes.
    pub trim: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            newline_to_space: true,
            strip_chars: DEFAULT_STRIP_CHARS.to_string(),
            lowercase: true,
            trim: true,
        }
    }
}

impl NormalizeConfig {
    /// Create a new configuration with the default normalization rules.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strip_chars(mut self, chars: impl Into<String>) -> Self {
        self.strip_chars = chars.into();
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_newline_to_space(mut self, enabled: bool) -> Self {
        self.newline_to_space = enabled;
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), CanonicalError> {
        if self.version == 0 {
            return Err(CanonicalError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        if self.strip_chars.chars().any(char::is_whitespace) {
            return Err(CanonicalError::InvalidConfig(
                "strip_chars must not contain whitespace".into(),
            ));
        }
        Ok(())
    }

    /// Returns true when `ch` is in the strip set.
    #[inline]
    pub(crate) fn strips(&self, ch: char) -> bool {
        self.strip_chars.contains(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_rules() {
        let cfg = NormalizeConfig::default();
        assert_eq!(cfg.version, 1);
        assert!(cfg.newline_to_space);
        assert!(cfg.lowercase);
        assert!(cfg.trim);
        assert_eq!(cfg.strip_chars, DEFAULT_STRIP_CHARS);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn version_zero_rejected() {
        let cfg = NormalizeConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(CanonicalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn whitespace_in_strip_set_rejected() {
        let cfg = NormalizeConfig::new().with_strip_chars(".,\t");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn builder_chain() {
        let cfg = NormalizeConfig::new()
            .with_strip_chars("!")
            .with_lowercase(false)
            .with_newline_to_space(false)
            .with_trim(false);
        assert_eq!(cfg.strip_chars, "!");
        assert!(!cfg.lowercase);
        assert!(!cfg.newline_to_space);
        assert!(!cfg.trim);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: NormalizeConfig = serde_json::from_str(r#"{"lowercase": false}"#).unwrap();
        assert!(!cfg.lowercase);
        assert_eq!(cfg.strip_chars, DEFAULT_STRIP_CHARS);
        assert_eq!(cfg.version, 1);
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = NormalizeConfig::new().with_strip_chars("?!");
        let json = serde_json::to_string(&cfg).unwrap();
        let back: NormalizeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}

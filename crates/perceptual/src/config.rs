//! Configuration and error types for the MinHash signature engine.
//!
//! This module defines the public configuration surface of the engine. It is
//! free of I/O so that signatures are a pure function of
//! `(normalized_text, config)` once the seed vector is fixed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width of each signature element.
///
/// 16-byte hashes are part of the configuration vocabulary but not
/// implemented; requesting them fails engine construction with
/// [`PerceptualError::UnsupportedHashWidth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum HashWidth {
    Bytes4,
    Bytes8,
    Bytes16,
}

impl HashWidth {
    /// Width in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            HashWidth::Bytes4 => 4,
            HashWidth::Bytes8 => 8,
            HashWidth::Bytes16 => 16,
        }
    }

    /// Largest value a signature element of this width can hold.
    ///
    /// Used as the signature value for documents with no shingles. Wider
    /// hashes are truncated to 64 bits.
    pub const fn max_value(self) -> u64 {
        match self {
            HashWidth::Bytes4 => u32::MAX as u64,
            HashWidth::Bytes8 | HashWidth::Bytes16 => u64::MAX,
        }
    }
}

impl TryFrom<usize> for HashWidth {
    type Error = PerceptualError;

    fn try_from(bytes: usize) -> Result<Self, Self::Error> {
        match bytes {
            4 => Ok(HashWidth::Bytes4),
            8 => Ok(HashWidth::Bytes8),
            16 => Ok(HashWidth::Bytes16),
            other => Err(PerceptualError::InvalidHashWidth { bytes: other }),
        }
    }
}

impl From<HashWidth> for usize {
    fn from(width: HashWidth) -> Self {
        width.bytes()
    }
}

/// Configuration for a [`MinHasher`](crate::MinHasher).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MinHasherConfig {
    /// Signature length. Ignored when `seeds` is set.
    pub num_seeds: usize,
    /// Explicit seed vector. Must be non-empty and free of repeats.
    pub seeds: Option<Vec<u32>>,
    /// Shingle window length in bytes.
    pub char_ngram: usize,
    /// Signature element width in bytes: 4, 8 or (reserved) 16.
    pub hashbytes: usize,
    /// Starting state for seed generation.
    ///
    /// Two configs with the same `random_state` and `num_seeds` produce the
    /// same seed vector. `None` draws a fresh state from the OS.
    pub random_state: Option<u64>,
    /// Evaluate seeds in parallel with Rayon. Output is bit-identical to the
    /// sequential path.
    pub use_parallel: bool,
}

impl Default for MinHasherConfig {
    fn default() -> Self {
        Self {
            num_seeds: 100,
            seeds: None,
            char_ngram: 8,
            hashbytes: 8,
            random_state: None,
            use_parallel: false,
        }
    }
}

impl MinHasherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signature length. Typical values: 64-256.
    pub fn with_num_seeds(mut self, num_seeds: usize) -> Self {
        self.num_seeds = num_seeds;
        self
    }

    /// Supply the seed vector explicitly instead of generating it.
    pub fn with_seeds(mut self, seeds: Vec<u32>) -> Self {
        self.seeds = Some(seeds);
        self
    }

    /// Set the shingle length in bytes. Typical values: 5-10.
    pub fn with_char_ngram(mut self, k: usize) -> Self {
        self.char_ngram = k;
        self
    }

    pub fn with_hashbytes(mut self, hashbytes: usize) -> Self {
        self.hashbytes = hashbytes;
        self
    }

    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Signature length this config produces.
    pub fn signature_len(&self) -> usize {
        self.seeds.as_ref().map_or(self.num_seeds, Vec::len)
    }

    /// Resolve the configured width, rejecting reserved and unknown widths.
    pub fn hash_width(&self) -> Result<HashWidth, PerceptualError> {
        match HashWidth::try_from(self.hashbytes)? {
            HashWidth::Bytes16 => Err(PerceptualError::UnsupportedHashWidth { bytes: 16 }),
            width => Ok(width),
        }
    }

    /// Validate configuration parameters.
    ///
    /// The hash width is checked first so that a reserved width is reported
    /// even when other parameters are also wrong.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        self.hash_width()?;
        if self.char_ngram == 0 {
            return Err(PerceptualError::InvalidNgram { k: self.char_ngram });
        }
        let count = self.signature_len();
        if count == 0 || count > u32::MAX as usize {
            return Err(PerceptualError::InvalidSeedCount { count });
        }
        Ok(())
    }
}

/// Errors returned by the signature engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("invalid config: hash width must be 4, 8 or 16 bytes (got {bytes})")]
    InvalidHashWidth { bytes: usize },

    #[error("unsupported feature: {bytes}-byte hashes are not implemented")]
    UnsupportedHashWidth { bytes: usize },

    #[error("invalid config: char_ngram must be >= 1 (got {k})")]
    InvalidNgram { k: usize },

    #[error("invalid config: seed count must be in 1..=2^32-1 (got {count})")]
    InvalidSeedCount { count: usize },

    #[error("invalid config: seed {seed} appears more than once")]
    DuplicateSeed { seed: u32 },

    #[error("signature length mismatch: {left} vs {right}")]
    SignatureLengthMismatch { left: usize, right: usize },

    #[error("signature width mismatch: {left} vs {right} bytes")]
    SignatureWidthMismatch { left: usize, right: usize },
}

impl PerceptualError {
    /// True for errors caused by requesting a reserved feature.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, PerceptualError::UnsupportedHashWidth { .. })
    }
}

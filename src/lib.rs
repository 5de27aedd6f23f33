//! Workspace umbrella crate for neardup.
//!
//! This crate stitches normalization, MinHash fingerprinting and the banding
//! index into a single [`DuplicateCache`] whose one meaningful operation is
//! [`DuplicateCache::is_duplicate`]: has a sufficiently similar document been
//! seen before?
//!
//! ```
//! use neardup::{CacheConfig, DuplicateCache};
//!
//! let cache = DuplicateCache::new(CacheConfig::default().with_random_state(42)).unwrap();
//!
//! assert!(!cache.is_duplicate("This is a simple document").unwrap());
//! assert!(cache.is_duplicate("This is a simple document").unwrap());
//! assert_eq!(cache.duplicate_count(), 1);
//! ```
//!
//! Detection is approximate. Candidates come from LSH buckets, so a pair
//! whose shingle sets overlap above the threshold can still be missed when
//! none of their bands agree; every reported duplicate is confirmed by an
//! exact Jaccard comparison.

mod cache;
pub mod config;

pub use canonical::{CanonicalError, DEFAULT_STRIP_CHARS, NormalizeConfig, normalize};
pub use index::{BandIndex, EntryCodec, IndexError, IndexStats, StoredEntry};
pub use perceptual::{
    HashFamily, HashWidth, MinHasher, MinHasherConfig, PerceptualError, Signature, XxHashFamily,
    jaccard, shingles,
};

pub use crate::cache::{CacheStats, DuplicateCache};
pub use crate::config::{ConfigLoadError, NeardupConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default threshold for [`CheckOptions::min_similarity`].
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.65;

/// Errors surfaced by [`DuplicateCache`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CacheError {
    /// Rejected configuration. Raised at construction or on invalid call options.
    #[error("configuration error: {0}")]
    Config(String),

    /// A reserved feature was requested.
    #[error("{0}")]
    Unsupported(String),

    /// A stored entry could not be decoded during verification.
    #[error("corrupt cache state: {0}")]
    Corrupt(String),

    /// A previous holder of the state lock panicked.
    #[error("cache state lock poisoned")]
    Poisoned,
}

impl CacheError {
    pub fn is_config(&self) -> bool {
        matches!(self, CacheError::Config(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, CacheError::Unsupported(_))
    }
}

impl From<PerceptualError> for CacheError {
    fn from(value: PerceptualError) -> Self {
        if value.is_unsupported() {
            CacheError::Unsupported(value.to_string())
        } else {
            CacheError::Config(value.to_string())
        }
    }
}

impl From<IndexError> for CacheError {
    fn from(value: IndexError) -> Self {
        if value.is_config() {
            CacheError::Config(value.to_string())
        } else {
            CacheError::Corrupt(value.to_string())
        }
    }
}

impl From<CanonicalError> for CacheError {
    fn from(value: CanonicalError) -> Self {
        CacheError::Config(value.to_string())
    }
}

/// Construction parameters for a [`DuplicateCache`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Signature length `S`. Ignored when `seeds` is set.
    pub num_seeds: usize,
    /// Band count `B`; must divide the signature length.
    pub num_bands: usize,
    /// Shingle window length in bytes.
    pub char_ngram: usize,
    /// Seeds the seed-vector generator. `None` draws a fresh state.
    pub random_state: Option<u64>,
    /// Signature element width: 4, 8 or (reserved) 16.
    pub hashbytes: usize,
    /// Explicit seed vector, used verbatim.
    pub seeds: Option<Vec<u32>>,
    /// How non-duplicate documents are retained for verification.
    pub storage: EntryCodec,
    pub normalize: NormalizeConfig,
    pub use_parallel: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            num_seeds: 100,
            num_bands: 10,
            char_ngram: 8,
            random_state: None,
            hashbytes: 8,
            seeds: None,
            storage: EntryCodec::default(),
            normalize: NormalizeConfig::default(),
            use_parallel: false,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_seeds(mut self, num_seeds: usize) -> Self {
        self.num_seeds = num_seeds;
        self
    }

    pub fn with_num_bands(mut self, num_bands: usize) -> Self {
        self.num_bands = num_bands;
        self
    }

    pub fn with_char_ngram(mut self, k: usize) -> Self {
        self.char_ngram = k;
        self
    }

    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    pub fn with_hashbytes(mut self, hashbytes: usize) -> Self {
        self.hashbytes = hashbytes;
        self
    }

    pub fn with_seeds(mut self, seeds: Vec<u32>) -> Self {
        self.seeds = Some(seeds);
        self
    }

    pub fn with_storage(mut self, storage: EntryCodec) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_normalize(mut self, normalize: NormalizeConfig) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Signature-engine view of this config.
    pub fn minhasher_config(&self) -> MinHasherConfig {
        MinHasherConfig {
            num_seeds: self.num_seeds,
            seeds: self.seeds.clone(),
            char_ngram: self.char_ngram,
            hashbytes: self.hashbytes,
            random_state: self.random_state,
            use_parallel: self.use_parallel,
        }
    }
}

/// Per-call options for [`DuplicateCache::check`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// A candidate at or above this exact Jaccard similarity is a duplicate.
    pub min_similarity: f64,
    /// Insert the document when it is not a duplicate.
    pub update: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            update: true,
        }
    }
}

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    pub fn validate(&self) -> Result<(), CacheError> {
        if !self.min_similarity.is_finite() || !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(CacheError::Config(format!(
                "min_similarity must be within [0, 1] (got {})",
                self.min_similarity
            )));
        }
        Ok(())
    }
}

/// Outcome of a single [`DuplicateCache::check`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub duplicate: bool,
    /// Exact similarity of the first candidate that reached the threshold.
    pub similarity: Option<f64>,
    /// Whether the document was added to the index.
    pub inserted: bool,
}

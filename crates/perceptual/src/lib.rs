//! # neardup perceptual layer
//!
//! Turns normalized text into a fixed-length MinHash signature whose
//! agreement with another signature estimates the Jaccard similarity of the
//! two documents' shingle sets.
//!
//! ## Contract
//!
//! - Input is the normalized byte sequence produced upstream; no further
//!   normalization happens here.
//! - For a fixed seed vector, `fingerprint` is a pure function of the text.
//! - Every signature produced by one [`MinHasher`] has exactly
//!   `num_seeds()` elements.
//!
//! ## Core Pipeline
//!
//! 1.  **Shingling**: every contiguous `char_ngram`-byte window of the text
//!     is collected into a set. Text shorter than the window has no shingles.
//!
//! 2.  **MinHashing**: for each seed `s_i`, slot `i` is the minimum of
//!     `hash(s_i, shingle)` over the set. Cost is `O(len × seeds)`; the seed
//!     loop can be spread across Rayon workers.
//!
//! The shingle set is also what exact verification compares, via [`jaccard`].
//!
//! ## Example Usage
//!
//! ```
//! use perceptual::{MinHasher, MinHasherConfig};
//!
//! let cfg = MinHasherConfig::new().with_num_seeds(64).with_random_state(7);
//! let hasher = MinHasher::new(&cfg).unwrap();
//!
//! let a = hasher.fingerprint(b"the quick brown fox jumps over the lazy dog");
//! let b = hasher.fingerprint(b"the quick brown fox jumped over the lazy dog");
//!
//! assert_eq!(a.len(), 64);
//! assert!(a.estimate_jaccard(&b).unwrap() > 0.3);
//! ```

pub mod config;
pub mod fingerprint;
mod hash;
mod minhash;
mod shingles;

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

pub use crate::config::{HashWidth, MinHasherConfig, PerceptualError};
pub use crate::fingerprint::Signature;
pub use crate::hash::{HashFamily, XxHashFamily};
pub use crate::minhash::SeedVector;
pub use crate::shingles::{jaccard, owned_shingles, shingles, OwnedShingleSet, ShingleSet};

use crate::minhash::minhash_signature;

/// MinHash signature engine.
///
/// Holds the seed vector, window length and hash width for its whole
/// lifetime; cloning is cheap and shares the hash family.
#[derive(Clone)]
pub struct MinHasher {
    seeds: SeedVector,
    char_ngram: usize,
    width: HashWidth,
    use_parallel: bool,
    family: Arc<dyn HashFamily>,
}

impl MinHasher {
    /// Build an engine backed by [`XxHashFamily`].
    pub fn new(cfg: &MinHasherConfig) -> Result<Self, PerceptualError> {
        Self::with_family(cfg, Arc::new(XxHashFamily))
    }

    /// Build an engine with a caller-supplied hash family.
    ///
    /// All validation happens here, before any hashing.
    pub fn with_family(
        cfg: &MinHasherConfig,
        family: Arc<dyn HashFamily>,
    ) -> Result<Self, PerceptualError> {
        cfg.validate()?;
        let width = cfg.hash_width()?;
        let seeds = match &cfg.seeds {
            Some(explicit) => SeedVector::from_seeds(explicit.clone())?,
            None => SeedVector::generate(cfg.num_seeds, cfg.random_state)?,
        };
        Ok(Self {
            seeds,
            char_ngram: cfg.char_ngram,
            width,
            use_parallel: cfg.use_parallel,
            family,
        })
    }

    /// Signature length.
    pub fn num_seeds(&self) -> usize {
        self.seeds.len()
    }

    pub fn seeds(&self) -> &[u32] {
        self.seeds.as_slice()
    }

    pub fn char_ngram(&self) -> usize {
        self.char_ngram
    }

    pub fn width(&self) -> HashWidth {
        self.width
    }

    /// Shingle `text` with this engine's window length.
    pub fn shingles<'a>(&self, text: &'a [u8]) -> ShingleSet<'a> {
        shingles(text, self.char_ngram)
    }

    /// Compute the signature of normalized `text`.
    pub fn fingerprint(&self, text: &[u8]) -> Signature {
        self.fingerprint_shingles(&self.shingles(text))
    }

    /// Compute the signature of an already shingled document.
    pub fn fingerprint_shingles<S>(&self, set: &HashSet<S>) -> Signature
    where
        S: Borrow<[u8]> + Eq + Hash,
    {
        let windows: Vec<&[u8]> = set.iter().map(|s| Borrow::<[u8]>::borrow(s)).collect();
        let values = minhash_signature(
            &windows,
            self.seeds.as_slice(),
            self.width,
            self.family.as_ref(),
            self.use_parallel,
        );
        Signature::new(values, self.width)
    }
}

impl fmt::Debug for MinHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinHasher")
            .field("num_seeds", &self.seeds.len())
            .field("char_ngram", &self.char_ngram)
            .field("width", &self.width)
            .field("use_parallel", &self.use_parallel)
            .finish_non_exhaustive()
    }
}

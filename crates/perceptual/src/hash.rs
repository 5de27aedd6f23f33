//! Seeded hash family used to realize each MinHash permutation.

use xxhash_rust::xxh3::xxh3_64_with_seed;
use xxhash_rust::xxh32::xxh32;

use crate::config::HashWidth;

/// A deterministic family of hash functions indexed by a 32-bit seed.
///
/// Implementations must return a value that fits in `width`
/// (`<= width.max_value()`), and must behave as independent functions across
/// seeds for signature agreement to estimate Jaccard similarity.
pub trait HashFamily: Send + Sync {
    fn hash(&self, seed: u32, window: &[u8], width: HashWidth) -> u64;
}

/// xxHash-backed family: XXH32 for 4-byte signatures, XXH3-64 otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XxHashFamily;

impl HashFamily for XxHashFamily {
    #[inline]
    fn hash(&self, seed: u32, window: &[u8], width: HashWidth) -> u64 {
        match width {
            HashWidth::Bytes4 => u64::from(xxh32(window, seed)),
            HashWidth::Bytes8 | HashWidth::Bytes16 => xxh3_64_with_seed(window, u64::from(seed)),
        }
    }
}

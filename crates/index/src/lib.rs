//! # neardup index
//!
//! Banding LSH over MinHash signatures. A signature of length `S` is cut
//! into `B` contiguous bands of `S / B` values; each band is reduced to a
//! bucket key and the payload is appended to that band's bucket. Two
//! documents become lookup candidates as soon as they agree on every value
//! of at least one band.
//!
//! ## Core Features
//!
//! - **Grow-only**: payloads are appended, never updated or removed.
//! - **Deterministic lookups**: [`BandIndex::candidates`] yields band 0..B-1,
//!   and within a bucket, insertion order.
//! - **Pluggable storage**: bucket tables sit behind [`BucketStore`], so a
//!   bounding or eviction policy can be layered on without changing lookups.
//!   [`InMemoryBuckets`] is the default.
//! - **Stored entries**: [`StoredEntry`] keeps either the normalized text
//!   (plain or zstd) or its shingle set for exact verification.
//!
//! ## Example Usage
//!
//! ```
//! use index::BandIndex;
//! use perceptual::{MinHasher, MinHasherConfig};
//!
//! let hasher = MinHasher::new(&MinHasherConfig::new().with_random_state(1)).unwrap();
//! let mut index = BandIndex::new(10, hasher.num_seeds()).unwrap();
//!
//! let sig = hasher.fingerprint(b"this is a simple document");
//! index.insert(&sig, "doc-1").unwrap();
//!
//! let hits: Vec<_> = index.candidates(&sig).unwrap().collect();
//! assert_eq!(hits.len(), 10);
//! assert!(hits.iter().all(|p| ***p == "doc-1"));
//! ```

mod backend;
mod entry;
mod query;

use std::sync::Arc;

use perceptual::Signature;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

pub use crate::backend::{BucketStore, InMemoryBuckets};
pub use crate::entry::{EntryCodec, StoredEntry, ZSTD_LEVELS};
pub use crate::query::bucket_key;

/// Errors raised by the banding index and stored entries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("invalid config: num_bands must be >= 1 (got {bands})")]
    InvalidBands { bands: usize },
    #[error("invalid config: signature length {signature_len} is not divisible by {bands} bands")]
    BandsNotDivisor { signature_len: usize, bands: usize },
    #[error("invalid config: zstd level must be in 1..=22 (got {level})")]
    InvalidCompressionLevel { level: i32 },
    #[error("signature length mismatch: expected {expected}, got {got}")]
    SignatureLength { expected: usize, got: usize },
    #[error("bucket store error: {0}")]
    Backend(String),
    #[error("compression error: {0}")]
    Compression(String),
    #[error("corrupt stored entry: {0}")]
    CorruptEntry(String),
}

impl IndexError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    /// True for errors raised while validating configuration.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            IndexError::InvalidBands { .. }
                | IndexError::BandsNotDivisor { .. }
                | IndexError::InvalidCompressionLevel { .. }
        )
    }
}

/// Banding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandConfig {
    pub num_bands: usize,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self { num_bands: 10 }
    }
}

impl BandConfig {
    /// Check that `signature_len` splits evenly into `num_bands` bands and
    /// return the rows per band.
    pub fn rows_per_band(&self, signature_len: usize) -> Result<usize, IndexError> {
        if self.num_bands == 0 {
            return Err(IndexError::InvalidBands {
                bands: self.num_bands,
            });
        }
        if signature_len == 0 || signature_len % self.num_bands != 0 {
            return Err(IndexError::BandsNotDivisor {
                signature_len,
                bands: self.num_bands,
            });
        }
        Ok(signature_len / self.num_bands)
    }
}

/// Point-in-time counters for a [`BandIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub bands: usize,
    pub rows_per_band: usize,
    /// Non-empty buckets across all bands.
    pub buckets: usize,
    /// Payload references across all buckets (`stored × bands`).
    pub entries: usize,
    /// Distinct payloads inserted.
    pub stored: usize,
}

/// Banding LSH index.
///
/// Mutation takes `&mut self`; callers sharing an index across threads
/// must serialize access themselves.
pub struct BandIndex<P> {
    num_bands: usize,
    rows_per_band: usize,
    store: Box<dyn BucketStore<P>>,
    stored: usize,
}

impl<P: Send + Sync + 'static> BandIndex<P> {
    /// Build an index with in-memory bucket tables.
    pub fn new(num_bands: usize, signature_len: usize) -> Result<Self, IndexError> {
        let rows_per_band = BandConfig { num_bands }.rows_per_band(signature_len)?;
        Ok(Self {
            num_bands,
            rows_per_band,
            store: Box::new(InMemoryBuckets::new(num_bands)),
            stored: 0,
        })
    }
}

impl<P> BandIndex<P> {
    /// Build an index over a custom bucket store.
    pub fn with_store(
        num_bands: usize,
        signature_len: usize,
        store: Box<dyn BucketStore<P>>,
    ) -> Result<Self, IndexError> {
        let rows_per_band = BandConfig { num_bands }.rows_per_band(signature_len)?;
        Ok(Self {
            num_bands,
            rows_per_band,
            store,
            stored: 0,
        })
    }

    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    pub fn rows_per_band(&self) -> usize {
        self.rows_per_band
    }

    pub fn signature_len(&self) -> usize {
        self.num_bands * self.rows_per_band
    }

    /// Number of payloads inserted.
    pub fn len(&self) -> usize {
        self.stored
    }

    pub fn is_empty(&self) -> bool {
        self.stored == 0
    }

    /// Append `payload` to the bucket of every band of `signature`.
    pub fn insert(&mut self, signature: &Signature, payload: P) -> Result<(), IndexError> {
        self.check_len(signature)?;
        let payload = Arc::new(payload);
        for (band, values) in signature
            .as_slice()
            .chunks_exact(self.rows_per_band)
            .enumerate()
        {
            let key = bucket_key(values);
            trace!(band, key, "index.append");
            self.store.append(band, key, Arc::clone(&payload))?;
        }
        self.stored += 1;
        Ok(())
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            bands: self.num_bands,
            rows_per_band: self.rows_per_band,
            buckets: self.store.bucket_count(),
            entries: self.store.entry_count(),
            stored: self.stored,
        }
    }

    fn check_len(&self, signature: &Signature) -> Result<(), IndexError> {
        let expected = self.signature_len();
        if signature.len() != expected {
            return Err(IndexError::SignatureLength {
                expected,
                got: signature.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perceptual::HashWidth;

    fn sig(values: Vec<u64>) -> Signature {
        Signature::new(values, HashWidth::Bytes8)
    }

    #[test]
    fn rows_per_band_divides_signature() {
        let index: BandIndex<u32> = BandIndex::new(10, 100).unwrap();
        assert_eq!(index.rows_per_band(), 10);
        assert_eq!(index.signature_len(), 100);
        assert!(index.is_empty());
    }

    #[test]
    fn indivisible_signature_rejected() {
        let err = BandIndex::<u32>::new(7, 100).err().unwrap();
        assert_eq!(
            err,
            IndexError::BandsNotDivisor {
                signature_len: 100,
                bands: 7
            }
        );
        assert!(err.is_config());
    }

    #[test]
    fn zero_bands_rejected() {
        let err = BandIndex::<u32>::new(0, 100).err().unwrap();
        assert_eq!(err, IndexError::InvalidBands { bands: 0 });
    }

    #[test]
    fn insert_touches_every_band() {
        let mut index = BandIndex::new(4, 8).unwrap();
        index.insert(&sig((0..8).collect()), 'x').unwrap();
        let stats = index.stats();
        assert_eq!(stats.stored, 1);
        assert_eq!(stats.entries, 4);
        assert_eq!(stats.buckets, 4);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn identical_signatures_share_buckets() {
        let mut index = BandIndex::new(4, 8).unwrap();
        index.insert(&sig(vec![5; 8]), 1u8).unwrap();
        index.insert(&sig(vec![5; 8]), 2u8).unwrap();
        // The four bands of [5; 8] are identical, so all land on one key per band.
        assert_eq!(index.stats().buckets, 4);
        assert_eq!(index.stats().entries, 8);
    }

    #[test]
    fn insert_rejects_wrong_length() {
        let mut index = BandIndex::new(2, 4).unwrap();
        let err = index.insert(&sig(vec![1, 2, 3]), 0u8).unwrap_err();
        assert_eq!(err, IndexError::SignatureLength { expected: 4, got: 3 });
        assert!(index.is_empty());
    }

    #[test]
    fn custom_store_is_used() {
        let store: Box<dyn BucketStore<u8>> = Box::new(InMemoryBuckets::new(2));
        let mut index = BandIndex::with_store(2, 2, store).unwrap();
        index.insert(&sig(vec![1, 2]), 9).unwrap();
        assert_eq!(index.stats().entries, 2);
    }
}

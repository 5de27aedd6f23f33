use std::sync::Arc;

use perceptual::Signature;
use xxhash_rust::xxh3::Xxh3;

use crate::{BandIndex, IndexError};

/// Deterministic bucket key for one band.
///
/// XXH3 over the little-endian bytes of the band's values. Identical bands
/// always share a key; distinct bands collide far less often than they would
/// under a plain sum.
pub fn bucket_key(band: &[u64]) -> u64 {
    let mut hasher = Xxh3::new();
    for value in band {
        hasher.update(&value.to_le_bytes());
    }
    hasher.digest()
}

impl<P> BandIndex<P> {
    /// Payloads sharing at least one band bucket with `signature`.
    ///
    /// Yields band 0 first, then band 1, and so on; within a bucket, oldest
    /// payload first. A payload that collides in several bands is yielded
    /// once per band. The iterator is lazy; call again to restart.
    pub fn candidates<'a>(
        &'a self,
        signature: &'a Signature,
    ) -> Result<impl Iterator<Item = &'a Arc<P>> + 'a, IndexError> {
        self.check_len(signature)?;
        let store = self.store.as_ref();
        Ok(signature
            .as_slice()
            .chunks_exact(self.rows_per_band)
            .enumerate()
            .flat_map(move |(band, values)| store.bucket(band, bucket_key(values)).iter()))
    }
}

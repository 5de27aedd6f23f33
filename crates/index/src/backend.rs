use std::sync::Arc;

use hashbrown::HashMap;

use crate::IndexError;

/// Storage for the per-band bucket tables.
///
/// A bucket is the ordered list of payloads appended under one
/// `(band, key)` pair. Implementations must return payloads in append order;
/// candidate iteration order depends on it. Bounding or eviction policies
/// belong here: the index only ever appends and looks up.
pub trait BucketStore<P>: Send + Sync {
    /// Append `payload` to the bucket at `(band, key)`.
    fn append(&mut self, band: usize, key: u64, payload: Arc<P>) -> Result<(), IndexError>;
    /// Payloads in the bucket at `(band, key)`, oldest first. Missing buckets are empty.
    fn bucket(&self, band: usize, key: u64) -> &[Arc<P>];
    /// Number of non-empty buckets across all bands.
    fn bucket_count(&self) -> usize;
    /// Number of payload references across all buckets.
    fn entry_count(&self) -> usize;
}

/// One `HashMap<key, Vec<payload>>` per band.
pub struct InMemoryBuckets<P> {
    bands: Vec<HashMap<u64, Vec<Arc<P>>>>,
    entries: usize,
}

impl<P> InMemoryBuckets<P> {
    pub fn new(num_bands: usize) -> Self {
        Self {
            bands: (0..num_bands).map(|_| HashMap::new()).collect(),
            entries: 0,
        }
    }
}

impl<P: Send + Sync> BucketStore<P> for InMemoryBuckets<P> {
    fn append(&mut self, band: usize, key: u64, payload: Arc<P>) -> Result<(), IndexError> {
        let table = self
            .bands
            .get_mut(band)
            .ok_or_else(|| IndexError::backend(format!("band {band} out of range")))?;
        table.entry(key).or_default().push(payload);
        self.entries += 1;
        Ok(())
    }

    fn bucket(&self, band: usize, key: u64) -> &[Arc<P>] {
        self.bands
            .get(band)
            .and_then(|table| table.get(&key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn bucket_count(&self) -> usize {
        self.bands.iter().map(HashMap::len).sum()
    }

    fn entry_count(&self) -> usize {
        self.entries
    }
}

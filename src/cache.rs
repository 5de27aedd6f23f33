use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, debug_span, info, warn};

use canonical::normalize;
use index::{BandIndex, IndexStats, StoredEntry};
use perceptual::{HashFamily, MinHasher, Signature, XxHashFamily};

use crate::{CacheConfig, CacheError, CheckOptions, Decision};

/// Mutable state of a cache. Only touched with the lock held.
struct CacheState {
    index: BandIndex<StoredEntry>,
    duplicates: u64,
    stored_bytes: usize,
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub duplicates: u64,
    /// Bytes retained by stored entries, after encoding.
    pub stored_bytes: usize,
    #[serde(flatten)]
    pub index: IndexStats,
}

/// Near-duplicate detector over a growing corpus.
///
/// Every [`check`](Self::check) runs its lookup, verification and
/// conditional insert under one exclusive lock, so concurrent calls with the
/// same new content never both insert it. Normalization and fingerprinting
/// happen before the lock is taken.
///
/// The cache is `Send + Sync`; share it through an [`Arc`].
pub struct DuplicateCache {
    config: CacheConfig,
    hasher: MinHasher,
    state: Mutex<CacheState>,
}

impl DuplicateCache {
    /// Build a cache backed by [`XxHashFamily`].
    ///
    /// Fails with [`CacheError::Unsupported`] for 16-byte hashes and with
    /// [`CacheError::Config`] for any other invalid parameter, before any
    /// hashing takes place.
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        Self::with_hash_family(config, Arc::new(XxHashFamily))
    }

    /// Build a cache with a caller-supplied hash family.
    pub fn with_hash_family(
        config: CacheConfig,
        family: Arc<dyn HashFamily>,
    ) -> Result<Self, CacheError> {
        let hasher = MinHasher::with_family(&config.minhasher_config(), family)?;
        let index = BandIndex::new(config.num_bands, hasher.num_seeds())?;
        config.normalize.validate()?;
        config.storage.validate()?;

        info!(
            num_seeds = hasher.num_seeds(),
            num_bands = config.num_bands,
            rows_per_band = index.rows_per_band(),
            char_ngram = hasher.char_ngram(),
            hashbytes = hasher.width().bytes(),
            storage = ?config.storage,
            "duplicate cache created"
        );

        Ok(Self {
            config,
            hasher,
            state: Mutex::new(CacheState {
                index,
                duplicates: 0,
                stored_bytes: 0,
            }),
        })
    }

    /// `check` with `min_similarity = 0.65` and `update = true`.
    pub fn is_duplicate(&self, text: &str) -> Result<bool, CacheError> {
        self.is_duplicate_with(text, &CheckOptions::default())
    }

    pub fn is_duplicate_with(&self, text: &str, opts: &CheckOptions) -> Result<bool, CacheError> {
        self.check(text, opts).map(|decision| decision.duplicate)
    }

    /// Decide whether `text` duplicates a stored document.
    ///
    /// The first candidate whose exact Jaccard similarity reaches
    /// `opts.min_similarity` makes `text` a duplicate, which is never
    /// inserted. Otherwise `text` is inserted when `opts.update` is set.
    /// With `update = false` nothing is modified, the duplicate counter
    /// included.
    ///
    /// A stored entry that fails to decode aborts the call with
    /// [`CacheError::Corrupt`].
    pub fn check(&self, text: &str, opts: &CheckOptions) -> Result<Decision, CacheError> {
        opts.validate()?;
        let span = debug_span!(
            "neardup.check",
            bytes = text.len(),
            min_similarity = opts.min_similarity,
            update = opts.update
        );
        let _enter = span.enter();

        let normalized = normalize(text, &self.config.normalize);
        let query = self.hasher.shingles(&normalized);
        let signature = self.hasher.fingerprint_shingles(&query);
        let k = self.hasher.char_ngram();

        let mut state = self.lock()?;

        let mut matched = None;
        let mut seen: HashSet<*const StoredEntry> = HashSet::new();
        let mut verified = 0usize;
        for candidate in state.index.candidates(&signature)? {
            // A document colliding in several bands is yielded once per band.
            if !seen.insert(Arc::as_ptr(candidate)) {
                continue;
            }
            verified += 1;
            let similarity = candidate.similarity(&query, k).inspect_err(|err| {
                warn!(error = %err, "stored entry failed verification");
            })?;
            if similarity >= opts.min_similarity {
                matched = Some(similarity);
                break;
            }
        }

        if let Some(similarity) = matched {
            if opts.update {
                state.duplicates += 1;
            }
            debug!(similarity, verified, "duplicate");
            return Ok(Decision {
                duplicate: true,
                similarity: Some(similarity),
                inserted: false,
            });
        }

        let inserted = if opts.update {
            let entry = StoredEntry::encode(&normalized, self.config.storage, k)?;
            let bytes = entry.stored_bytes();
            state.index.insert(&signature, entry)?;
            state.stored_bytes += bytes;
            true
        } else {
            false
        };
        debug!(verified, inserted, "not a duplicate");
        Ok(Decision {
            duplicate: false,
            similarity: None,
            inserted,
        })
    }

    /// Signature of `text` after normalization.
    pub fn fingerprint(&self, text: &str) -> Signature {
        self.hasher.fingerprint(&normalize(text, &self.config.normalize))
    }

    /// Number of duplicates reported by calls made with `update = true`.
    pub fn duplicate_count(&self) -> u64 {
        self.read().duplicates
    }

    /// Number of stored (non-duplicate) documents.
    pub fn len(&self) -> usize {
        self.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.read();
        CacheStats {
            duplicates: state.duplicates,
            stored_bytes: state.stored_bytes,
            index: state.index.stats(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn hasher(&self) -> &MinHasher {
        &self.hasher
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheState>, CacheError> {
        self.state.lock().map_err(|_| CacheError::Poisoned)
    }

    /// Counters stay readable after a panic elsewhere; they are only ever
    /// incremented after a completed decision.
    fn read(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DuplicateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateCache")
            .field("config", &self.config)
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use index::EntryCodec;

    fn cache(storage: EntryCodec) -> DuplicateCache {
        DuplicateCache::new(
            CacheConfig::default()
                .with_random_state(7)
                .with_storage(storage),
        )
        .unwrap()
    }

    #[test]
    fn second_sighting_is_duplicate() {
        for storage in [
            EntryCodec::Plain,
            EntryCodec::Zstd { level: 9 },
            EntryCodec::Shingles,
        ] {
            let cache = cache(storage);
            let first = cache
                .check("This is a simple document", &CheckOptions::default())
                .unwrap();
            assert_eq!(
                first,
                Decision {
                    duplicate: false,
                    similarity: None,
                    inserted: true
                }
            );
            let second = cache
                .check("This is a simple document", &CheckOptions::default())
                .unwrap();
            assert!(second.duplicate, "{storage:?}");
            assert_eq!(second.similarity, Some(1.0));
            assert!(!second.inserted);
            assert_eq!(cache.duplicate_count(), 1);
            assert_eq!(cache.len(), 1);
        }
    }

    #[test]
    fn normalization_applies_before_comparison() {
        let cache = cache(EntryCodec::default());
        assert!(!cache.is_duplicate("Hello, World! How are you today?").unwrap());
        assert!(cache.is_duplicate("hello world how are you today").unwrap());
    }

    #[test]
    fn corrupted_entry_is_surfaced() {
        let cache = cache(EntryCodec::default());
        let text = "a stored document whose bytes are about to be damaged";
        let signature = cache.fingerprint(text);
        {
            let mut state = cache.state.lock().unwrap();
            let garbage = StoredEntry::Zstd(vec![0x00, 0x01, 0x02, 0x03].into_boxed_slice());
            state.index.insert(&signature, garbage).unwrap();
        }
        let err = cache.is_duplicate(text).unwrap_err();
        assert!(matches!(err, CacheError::Corrupt(_)), "{err}");
        assert_eq!(cache.duplicate_count(), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalid_options_fail_before_lookup() {
        let cache = cache(EntryCodec::default());
        let opts = CheckOptions::new().with_min_similarity(2.0);
        assert!(cache.check("anything at all here", &opts).unwrap_err().is_config());
        assert!(cache.is_empty());
    }

    #[test]
    fn stats_track_inserts_and_duplicates() {
        let cache = cache(EntryCodec::Plain);
        cache.is_duplicate("first document in the corpus").unwrap();
        cache.is_duplicate("first document in the corpus").unwrap();
        let stats = cache.stats();
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.index.stored, 1);
        assert_eq!(stats.index.entries, 10);
        assert_eq!(stats.stored_bytes, "first document in the corpus".len());
    }

    #[test]
    fn stored_bytes_reflect_compression() {
        let text = "the same sentence again and again. ".repeat(40);
        let plain = cache(EntryCodec::Plain);
        let packed = cache(EntryCodec::Zstd { level: 9 });
        plain.is_duplicate(&text).unwrap();
        packed.is_duplicate(&text).unwrap();
        assert!(packed.stats().stored_bytes < plain.stats().stored_bytes);

        // Duplicates and peeks add nothing.
        let before = plain.stats().stored_bytes;
        plain.is_duplicate(&text).unwrap();
        plain
            .is_duplicate_with("never stored at all", &CheckOptions::new().with_update(false))
            .unwrap();
        assert_eq!(plain.stats().stored_bytes, before);
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let cache = Arc::new(cache(EntryCodec::default()));
        let poisoner = Arc::clone(&cache);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.state.lock().unwrap();
            panic!("poison the state lock");
        })
        .join();
        assert_eq!(
            cache.is_duplicate("some text to check").unwrap_err(),
            CacheError::Poisoned
        );
        assert_eq!(cache.duplicate_count(), 0);
    }
}

//! Thread safety of a shared cache.

use std::sync::{Arc, Barrier};
use std::thread;

use neardup::{CacheConfig, DuplicateCache};

fn shared_cache() -> Arc<DuplicateCache> {
    Arc::new(DuplicateCache::new(CacheConfig::default().with_random_state(99)).unwrap())
}

#[test]
fn identical_new_content_is_stored_once() {
    let cache = shared_cache();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache
                    .is_duplicate("identical content submitted from every thread at once")
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let stored = results.iter().filter(|dup| !**dup).count();
    assert_eq!(stored, 1, "exactly one thread should store the document");
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.duplicate_count(), (threads - 1) as u64);
}

#[test]
fn distinct_content_from_many_threads() {
    let cache = shared_cache();
    let handles: Vec<_> = (0..16u32)
        .map(|i| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let text: Vec<String> = (0..12u32)
                    .map(|j| format!("{:08x}", (i * 100 + j).wrapping_mul(0x9E37_79B1)))
                    .collect();
                cache.is_duplicate(&text.join(" ")).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(!handle.join().unwrap());
    }
    assert_eq!(cache.len(), 16);
    assert_eq!(cache.duplicate_count(), 0);
}

#[test]
fn parallel_fingerprinting_matches_sequential() {
    let text = "signatures computed on worker threads must equal the sequential result";
    let sequential = DuplicateCache::new(CacheConfig::default().with_random_state(4)).unwrap();
    let parallel = DuplicateCache::new(
        CacheConfig::default()
            .with_random_state(4)
            .with_parallel(true),
    )
    .unwrap();
    assert_eq!(sequential.fingerprint(text), parallel.fingerprint(text));
}

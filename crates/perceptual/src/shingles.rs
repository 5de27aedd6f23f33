//! Byte shingling and exact set similarity.
//!
//! A shingle is a contiguous `k`-byte window over normalized text. Windows
//! are taken at every byte offset, so multi-byte UTF-8 characters may be
//! split across shingles; that is harmless because shingles are only ever
//! hashed or compared, never decoded.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;

/// Set of shingles borrowed from the text they were cut from.
pub type ShingleSet<'a> = HashSet<&'a [u8]>;

/// Set of shingles that owns its bytes.
pub type OwnedShingleSet = HashSet<Box<[u8]>>;

/// All distinct length-`k` byte windows of `text`.
///
/// Returns the empty set when `k == 0` or `text.len() < k`.
pub fn shingles(text: &[u8], k: usize) -> ShingleSet<'_> {
    if k == 0 || text.len() < k {
        return HashSet::new();
    }
    let mut set = HashSet::with_capacity(text.len() - k + 1);
    set.extend(text.windows(k));
    set
}

/// Same as [`shingles`] but copies each window.
pub fn owned_shingles(text: &[u8], k: usize) -> OwnedShingleSet {
    shingles(text, k)
        .into_iter()
        .map(Box::<[u8]>::from)
        .collect()
}

/// Exact Jaccard similarity `|A ∩ B| / |A ∪ B|`.
///
/// Two empty sets have similarity `0.0`, so a pair of documents that are
/// both shorter than the shingle window never counts as a duplicate.
pub fn jaccard<A, B>(a: &HashSet<A>, b: &HashSet<B>) -> f64
where
    A: Borrow<[u8]> + Eq + Hash,
    B: Borrow<[u8]> + Eq + Hash,
{
    // Look up the members of the smaller set in the larger one.
    let intersection = if a.len() <= b.len() {
        a.iter()
            .filter(|s| b.contains(Borrow::<[u8]>::borrow(*s)))
            .count()
    } else {
        b.iter()
            .filter(|s| a.contains(Borrow::<[u8]>::borrow(*s)))
            .count()
    };
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorter_than_window_is_empty() {
        assert!(shingles(b"", 8).is_empty());
        assert!(shingles(b"1234567", 8).is_empty());
    }

    #[test]
    fn zero_window_is_empty() {
        assert!(shingles(b"abc", 0).is_empty());
    }

    #[test]
    fn exact_window_yields_one() {
        let set = shingles(b"12345678", 8);
        assert_eq!(set.len(), 1);
        assert!(set.contains(&b"12345678"[..]));
    }

    #[test]
    fn count_without_repeats() {
        let text = b"abcdefghij";
        assert_eq!(shingles(text, 3).len(), text.len() - 3 + 1);
    }

    #[test]
    fn repeated_windows_collapse() {
        // "aaaaaa" has four 3-windows, all identical.
        assert_eq!(shingles(b"aaaaaa", 3).len(), 1);
        assert_eq!(shingles(b"abababab", 2).len(), 2);
    }

    #[test]
    fn owned_matches_borrowed() {
        let text = b"the quick brown fox";
        let borrowed = shingles(text, 4);
        let owned = owned_shingles(text, 4);
        assert_eq!(borrowed.len(), owned.len());
        for s in &borrowed {
            assert!(owned.contains(*s));
        }
    }

    #[test]
    fn jaccard_identical_is_one() {
        let a = shingles(b"identical text here", 4);
        let b = shingles(b"identical text here", 4);
        assert_eq!(jaccard(&a, &b), 1.0);
    }

    #[test]
    fn jaccard_disjoint_is_zero() {
        let a = shingles(b"aaaaaaa", 3);
        let b = shingles(b"bbbbbbb", 3);
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn jaccard_both_empty_is_zero_not_nan() {
        let a = shingles(b"ab", 8);
        let b = shingles(b"cd", 8);
        let sim = jaccard(&a, &b);
        assert!(!sim.is_nan());
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn jaccard_one_empty_is_zero() {
        let a = shingles(b"ab", 8);
        let b = shingles(b"long enough text", 8);
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn jaccard_known_ratio() {
        // {ab, bc, cd} vs {bc, cd, de}: 2 shared of 4 total.
        let a = shingles(b"abcd", 2);
        let b = shingles(b"bcde", 2);
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn jaccard_is_symmetric_across_set_kinds() {
        let text_a = b"symmetric similarity check";
        let text_b = b"symmetric similarity test";
        let a = shingles(text_a, 5);
        let b = owned_shingles(text_b, 5);
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
    }
}

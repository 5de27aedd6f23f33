//! MinHash computation and seed-vector derivation.
//!
//! Each signature slot `i` is the minimum of `family.hash(seeds[i], shingle)`
//! over the document's shingle set. Seeds come from a pinned SplitMix64
//! stream so that a `random_state` reproduces the same seed vector on every
//! platform and release of this crate.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::config::{HashWidth, PerceptualError};
use crate::hash::HashFamily;

/// Ordered vector of distinct 32-bit seeds, one per signature slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedVector(Vec<u32>);

impl SeedVector {
    /// Derive `count` distinct seeds from `random_state`.
    ///
    /// The stream is SplitMix64 started at `random_state`; each output
    /// contributes its high 32 bits and repeats are skipped. With
    /// `random_state = None` the starting state is drawn from `rand`.
    pub fn generate(count: usize, random_state: Option<u64>) -> Result<Self, PerceptualError> {
        if count == 0 || count > u32::MAX as usize {
            return Err(PerceptualError::InvalidSeedCount { count });
        }
        let state = random_state.unwrap_or_else(rand::random::<u64>);
        let mut stream = SplitMix64::new(state);
        let mut seen = HashSet::with_capacity(count);
        let mut seeds = Vec::with_capacity(count);
        while seeds.len() < count {
            let seed = (stream.next_u64() >> 32) as u32;
            if seen.insert(seed) {
                seeds.push(seed);
            }
        }
        Ok(Self(seeds))
    }

    /// Use an explicit seed vector.
    pub fn from_seeds(seeds: Vec<u32>) -> Result<Self, PerceptualError> {
        if seeds.is_empty() || seeds.len() > u32::MAX as usize {
            return Err(PerceptualError::InvalidSeedCount { count: seeds.len() });
        }
        let mut seen = HashSet::with_capacity(seeds.len());
        for &seed in &seeds {
            if !seen.insert(seed) {
                return Err(PerceptualError::DuplicateSeed { seed });
            }
        }
        Ok(Self(seeds))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

/// Compute a MinHash signature (parallel over seeds if `parallel = true`).
///
/// An empty shingle list yields `width.max_value()` in every slot.
pub(crate) fn minhash_signature<F>(
    shingles: &[&[u8]],
    seeds: &[u32],
    width: HashWidth,
    family: &F,
    parallel: bool,
) -> Vec<u64>
where
    F: HashFamily + ?Sized,
{
    if shingles.is_empty() {
        return vec![width.max_value(); seeds.len()];
    }

    if parallel {
        let mut result = Vec::with_capacity(seeds.len());
        seeds
            .par_iter()
            .map(|&seed| compute_slot(shingles, seed, width, family))
            .collect_into_vec(&mut result);
        return result;
    }

    // Shingle-major order keeps each window hot in cache while every seed
    // is applied to it.
    let mut mins = vec![width.max_value(); seeds.len()];
    for &shingle in shingles {
        for (slot, &seed) in mins.iter_mut().zip(seeds) {
            let h = family.hash(seed, shingle, width);
            if h < *slot {
                *slot = h;
            }
        }
    }
    mins
}

/// Computes a single slot in the MinHash signature.
#[inline]
pub(crate) fn compute_slot<F>(shingles: &[&[u8]], seed: u32, width: HashWidth, family: &F) -> u64
where
    F: HashFamily + ?Sized,
{
    shingles
        .iter()
        .map(|shingle| family.hash(seed, shingle, width))
        .min()
        .unwrap_or(width.max_value())
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 finalizer applied to `x + GOLDEN_GAMMA`.
#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(GOLDEN_GAMMA);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Sequential SplitMix64 generator.
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(state: u64) -> Self {
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        let out = splitmix64(self.state);
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        out
    }
}

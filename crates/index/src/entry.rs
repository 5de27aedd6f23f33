//! Stored representation of indexed documents.
//!
//! Verification needs the shingle set of every candidate. An entry either
//! keeps the normalized text (plain or zstd-compressed) and re-shingles it on
//! demand, or keeps the shingle set itself and skips that work at the cost of
//! memory.

use perceptual::{jaccard, owned_shingles, shingles, OwnedShingleSet, ShingleSet};
use serde::{Deserialize, Serialize};
use zstd::{decode_all, encode_all};

use crate::IndexError;

/// Valid zstd levels accepted by [`EntryCodec::Zstd`].
pub const ZSTD_LEVELS: std::ops::RangeInclusive<i32> = 1..=22;

/// How documents are retained for later verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "codec", rename_all = "snake_case")]
pub enum EntryCodec {
    /// Normalized text, uncompressed.
    Plain,
    /// Normalized text, zstd-compressed at `level` (1-22).
    Zstd { level: i32 },
    /// The shingle set, precomputed at insert time.
    Shingles,
}

impl Default for EntryCodec {
    fn default() -> Self {
        EntryCodec::Zstd { level: 9 }
    }
}

impl EntryCodec {
    pub fn validate(&self) -> Result<(), IndexError> {
        match self {
            EntryCodec::Zstd { level } if !ZSTD_LEVELS.contains(level) => {
                Err(IndexError::InvalidCompressionLevel { level: *level })
            }
            _ => Ok(()),
        }
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, IndexError> {
        match self {
            EntryCodec::Zstd { level } => {
                encode_all(data, *level).map_err(|e| IndexError::Compression(e.to_string()))
            }
            EntryCodec::Plain | EntryCodec::Shingles => Ok(data.to_vec()),
        }
    }
}

/// A document retained in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredEntry {
    Plain(Box<[u8]>),
    Zstd(Box<[u8]>),
    Shingles(OwnedShingleSet),
}

impl StoredEntry {
    /// Encode normalized `text` with `codec`. `k` is only used by
    /// [`EntryCodec::Shingles`].
    pub fn encode(text: &[u8], codec: EntryCodec, k: usize) -> Result<Self, IndexError> {
        Ok(match codec {
            EntryCodec::Plain => StoredEntry::Plain(text.into()),
            EntryCodec::Zstd { .. } => StoredEntry::Zstd(codec.compress(text)?.into()),
            EntryCodec::Shingles => StoredEntry::Shingles(owned_shingles(text, k)),
        })
    }

    /// Exact Jaccard similarity between this entry and `query`, re-shingling
    /// with window `k` where needed.
    ///
    /// A compressed entry that no longer decodes is reported as
    /// [`IndexError::CorruptEntry`].
    pub fn similarity(&self, query: &ShingleSet<'_>, k: usize) -> Result<f64, IndexError> {
        match self {
            StoredEntry::Plain(text) => Ok(jaccard(query, &shingles(text, k))),
            StoredEntry::Zstd(blob) => Ok(jaccard(query, &shingles(&decompress(blob)?, k))),
            StoredEntry::Shingles(set) => Ok(jaccard(query, set)),
        }
    }

    /// Approximate heap bytes held by the entry.
    pub fn stored_bytes(&self) -> usize {
        match self {
            StoredEntry::Plain(bytes) | StoredEntry::Zstd(bytes) => bytes.len(),
            StoredEntry::Shingles(set) => set.iter().map(|s| s.len()).sum(),
        }
    }
}

fn decompress(blob: &[u8]) -> Result<Vec<u8>, IndexError> {
    decode_all(blob).map_err(|e| IndexError::CorruptEntry(e.to_string()))
}

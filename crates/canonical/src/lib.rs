//! neardup canonical text layer.
//!
//! Normalizes raw document text into the byte sequence that the shingler
//! consumes. Two documents are only ever compared through their normalized
//! bytes, so this crate fixes what "the same text" means for the rest of the
//! pipeline.
//!
//! ## What we do
//!
//! - Newlines become spaces
//! - A fixed punctuation set is stripped (`.,;:-+=&*!?><()` by default)
//! - Unicode lowercasing
//! - UTF-8 encoding, ASCII whitespace trimmed from both ends
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no locale dependence. Same text and config, same
//! bytes, on any machine.

mod config;
mod error;
mod normalize;

pub use crate::config::{NormalizeConfig, DEFAULT_STRIP_CHARS};
pub use crate::error::CanonicalError;
pub use crate::normalize::{normalize, normalize_default};

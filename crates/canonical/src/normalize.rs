//! Raw text → normalized bytes.
//!
//! 1. `\n` becomes a space (when enabled)
//! 2. characters from the strip set are dropped
//! 3. the remaining text is lowercased (when enabled)
//! 4. the UTF-8 encoding is trimmed of ASCII whitespace on both ends,
//!    vertical tab and form feed included
//!
//! Carriage returns and tabs are not rewritten; they only disappear when they
//! sit at the edges of the text.

use crate::config::NormalizeConfig;

/// Normalize `raw` according to `cfg`.
///
/// This function is total: empty input and input that strips down to nothing
/// both produce an empty vector.
///
/// ```rust
/// use canonical::{normalize, NormalizeConfig};
///
/// let bytes = normalize("  Hello,\nWorld!  ", &NormalizeConfig::default());
/// assert_eq!(bytes, b"hello world");
/// ```
pub fn normalize(raw: &str, cfg: &NormalizeConfig) -> Vec<u8> {
    let mut text = String::with_capacity(raw.len());
    for ch in raw.chars() {
        let ch = if cfg.newline_to_space && ch == '\n' {
            ' '
        } else {
            ch
        };
        if !cfg.strips(ch) {
            text.push(ch);
        }
    }
    if cfg.lowercase {
        // Whole-string lowercasing applies context rules such as final sigma.
        text = text.to_lowercase();
    }

    let mut bytes = text.into_bytes();
    if cfg.trim {
        trim_ascii_whitespace(&mut bytes);
    }
    bytes
}

/// Normalize with [`NormalizeConfig::default`].
pub fn normalize_default(raw: &str) -> Vec<u8> {
    normalize(raw, &NormalizeConfig::default())
}

#[inline]
fn is_trimmed(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

fn trim_ascii_whitespace(bytes: &mut Vec<u8>) {
    let trailing = bytes.iter().rev().take_while(|&&b| is_trimmed(b)).count();
    bytes.truncate(bytes.len() - trailing);
    let leading = bytes.iter().take_while(|&&b| is_trimmed(b)).count();
    bytes.drain(..leading);
}

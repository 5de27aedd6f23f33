//! Signature type produced by the MinHash engine.

use serde::{Deserialize, Serialize};

use crate::config::{HashWidth, PerceptualError};

/// Fixed-length MinHash signature.
///
/// Element `i` is the minimum of the `i`-th seeded hash over a document's
/// shingle set. Values of 4-byte signatures are stored widened to `u64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    values: Vec<u64>,
    width: HashWidth,
}

impl Signature {
    pub fn new(values: Vec<u64>, width: HashWidth) -> Self {
        Self { values, width }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.values
    }

    pub fn width(&self) -> HashWidth {
        self.width
    }

    /// Fraction of positions where both signatures agree.
    ///
    /// This is the MinHash estimate of the Jaccard similarity of the two
    /// underlying shingle sets. Signatures must come from the same engine.
    pub fn estimate_jaccard(&self, other: &Signature) -> Result<f64, PerceptualError> {
        if self.width != other.width {
            return Err(PerceptualError::SignatureWidthMismatch {
                left: self.width.bytes(),
                right: other.width.bytes(),
            });
        }
        if self.len() != other.len() {
            return Err(PerceptualError::SignatureLengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        if self.is_empty() {
            return Ok(0.0);
        }
        let matches = self
            .values
            .iter()
            .zip(&other.values)
            .filter(|(a, b)| a == b)
            .count();
        Ok(matches as f64 / self.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_counts_matching_positions() {
        let a = Signature::new(vec![1, 2, 3, 4], HashWidth::Bytes8);
        let b = Signature::new(vec![1, 9, 3, 9], HashWidth::Bytes8);
        assert_eq!(a.estimate_jaccard(&b).unwrap(), 0.5);
        assert_eq!(a.estimate_jaccard(&a).unwrap(), 1.0);
    }

    #[test]
    fn estimate_rejects_mismatched_signatures() {
        let a = Signature::new(vec![1, 2], HashWidth::Bytes8);
        let b = Signature::new(vec![1, 2, 3], HashWidth::Bytes8);
        assert_eq!(
            a.estimate_jaccard(&b),
            Err(PerceptualError::SignatureLengthMismatch { left: 2, right: 3 })
        );
        let c = Signature::new(vec![1, 2], HashWidth::Bytes4);
        assert!(matches!(
            a.estimate_jaccard(&c),
            Err(PerceptualError::SignatureWidthMismatch { left: 8, right: 4 })
        ));
    }

    #[test]
    fn serde_roundtrip() {
        let sig = Signature::new(vec![10, 20, 30], HashWidth::Bytes4);
        let json = serde_json::to_string(&sig).unwrap();
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, back);
    }
}

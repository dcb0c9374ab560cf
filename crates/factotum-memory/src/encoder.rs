//! Fact encoding for similarity search.
//!
//! Deterministic hash-based encoding: no model download, no network, stable
//! across processes. Identical texts map to identical vectors, so cosine
//! similarity of a fact with itself is 1.0.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Encode fact text into a fixed-size unit vector.
#[derive(Debug, Clone)]
pub struct FactEncoder {
    dimension: usize,
}

impl FactEncoder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Encode text into an embedding vector.
    ///
    /// Each dimension combines two position-salted hashes of the text,
    /// bucketed into [0, 1); the result is normalized to unit length.
    pub fn encode(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];

        for (i, value) in embedding.iter_mut().enumerate() {
            let salt = i as u64;
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            salt.hash(&mut hasher);
            let first = hasher.finish();

            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            salt.wrapping_mul(31).hash(&mut hasher);
            let second = hasher.finish();

            let combined = first.wrapping_mul(31).wrapping_add(second);
            *value = (combined % 1000) as f32 / 1000.0;
        }

        Self::normalize(&embedding)
    }

    fn normalize(v: &[f32]) -> Vec<f32> {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            return v.to_vec();
        }
        v.iter().map(|x| x / norm).collect()
    }

    /// Cosine similarity between two embeddings. Mismatched or zero-length
    /// vectors score 0.0 rather than erroring.
    pub fn cosine_similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }
}

impl Default for FactEncoder {
    fn default() -> Self {
        Self::new(384)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_deterministic() {
        let encoder = FactEncoder::new(64);
        assert_eq!(encoder.encode("the cat sat"), encoder.encode("the cat sat"));
    }

    #[test]
    fn encoded_vectors_are_unit_length() {
        let encoder = FactEncoder::new(64);
        let v = encoder.encode("some fact");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn self_similarity_is_one() {
        let encoder = FactEncoder::new(64);
        let v = encoder.encode("identical text");
        assert!((encoder.cosine_similarity(&v, &v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn mismatched_dimensions_score_zero() {
        let encoder = FactEncoder::new(64);
        assert_eq!(encoder.cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(encoder.cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }
}

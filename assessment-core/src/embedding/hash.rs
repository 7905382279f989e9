//! Hash embeddings
//!
//! FNV-1a feature hashing of word tokens into a fixed number of buckets.
//! No model files, fully deterministic. Texts sharing words land close
//! together, which is enough for smoke runs and tests, not for production
//! relevance.

use super::encoder::QueryEncoder;
use crate::error::Result;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hash embedder using FNV-1a
#[derive(Debug, Clone)]
pub struct HashEncoder {
    /// Embedding dimension (default: 384)
    dim: usize,
}

impl Default for HashEncoder {
    fn default() -> Self {
        Self { dim: 384 }
    }
}

impl HashEncoder {
    /// Create embedder with specified dimension
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

impl QueryEncoder for HashEncoder {
    fn embed_raw(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0_f32; self.dim];
        for token in Self::tokens(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dim as u64) as usize;
            // High bit picks the sign so unrelated collisions tend to cancel
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        "fnv1a-hash"
    }
}

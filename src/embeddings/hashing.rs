//! Deterministic feature-hashing embedder
//!
//! Lower-cased word tokens are hashed with SHA-256 into a fixed number of
//! signed buckets and the result is L2-normalized. No model, no network.
//! Lexical overlap drives similarity, so this is a stand-in for offline runs
//! and tests, not a replacement for a sentence-embedding model.

use async_trait::async_trait;
use sha2::Digest;
use sha2::Sha256;

use super::Embedder;
use crate::errors::AgriRagError;
use crate::errors::Result;

pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(AgriRagError::ConfigError(
                "hashing embedder needs a non-zero dimension".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

/// Split on whitespace and ASCII punctuation; non-ASCII script characters
/// (including combining marks) stay inside their token
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| {
        c.is_whitespace() || (c.is_ascii() && !c.is_ascii_alphanumeric()) || c == '।'
    })
    .filter(|t| !t.is_empty())
    .map(str::to_lowercase)
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

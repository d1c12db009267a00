//! Text embeddings used by the document store for similarity search.

mod embedder;
mod error;
mod hashing;

pub use embedder::{Embedder, PlaceholderEmbedder};
pub use error::EmbeddingError;
pub use hashing::HashingEmbedder;

/// A dense embedding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    /// Cosine similarity between two embeddings.
    ///
    /// Returns 0 if either vector has zero length (norm).
    pub fn similarity(&self, other: &Embedding) -> Result<f32, EmbeddingError> {
        if self.0.len() != other.0.len() {
            return Err(EmbeddingError::DimensionMismatch {
                left: self.0.len(),
                right: other.0.len(),
            });
        }

        let mut dot = 0.0f32;
        let mut norm_a = 0.0f32;
        let mut norm_b = 0.0f32;
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }

        if norm_a == 0.0 || norm_b == 0.0 {
            return Ok(0.0);
        }
        Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(vector: Vec<f32>) -> Self {
        Embedding(vector)
    }
}

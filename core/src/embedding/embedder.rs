use async_trait::async_trait;

use super::{error::EmbeddingError, Embedding};

/// Trait for asynchronous text embedding generation.
///
/// An implementor of this trait represents a specific configured embedding model. The
/// document store uses it to turn post bodies and search queries into vectors that can be
/// compared with [`Embedding::similarity`].
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generates embeddings for a batch of texts.
    ///
    /// The returned vector has one element per input text, in the same order.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Returns the number of dimensions in the embedding vectors produced by this embedder.
    ///
    /// Returns `None` if the dimensionality is not fixed or cannot be determined reliably.
    fn dimensions(&self) -> Option<usize>;

    /// Returns an identifier for the embedding model (e.g., "hashing-512").
    fn model_name(&self) -> &str;
}

/// Embedder standing in for a real embedding model.
///
/// Every text maps to the same unit vector, so all similarity scores are equal and a search
/// returns stored documents in insertion order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEmbedder;

#[async_trait]
impl Embedder for PlaceholderEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts.iter().map(|_| Embedding::from(vec![1.0])).collect())
    }

    fn dimensions(&self) -> Option<usize> {
        Some(1)
    }

    fn model_name(&self) -> &str {
        "placeholder"
    }
}

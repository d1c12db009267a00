use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Two embeddings with different dimensionality were compared.
    #[error("Dimension mismatch: {left} vs {right}")]
    DimensionMismatch {
        left: usize,
        right: usize,
    },

    /// The request payload was deemed invalid before embedding (e.g., empty input list).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The embedder returned a different number of embeddings than texts it was given.
    #[error("Unexpected response: expected {expected} embeddings, got {actual}")]
    CountMismatch {
        expected: usize,
        actual: usize,
    },
}

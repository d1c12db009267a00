use async_trait::async_trait;
use tracing::trace;

use super::{Embedder, Embedding, EmbeddingError};

pub const DEFAULT_DIMENSIONS: usize = 512;
const MIN_TOKEN_CHARS: usize = 3;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

const STOP_WORDS: &[&str] = &[
    "about", "after", "all", "also", "and", "are", "because", "been", "but", "can", "could",
    "does", "each", "for", "from", "had", "has", "have", "her", "his", "how", "into", "its",
    "just", "more", "most", "not", "one", "only", "other", "our", "out", "over", "should",
    "some", "such", "than", "that", "the", "their", "them", "then", "there", "these", "they",
    "this", "those", "through", "too", "very", "was", "were", "what", "when", "where",
    "which", "while", "who", "why", "will", "with", "would", "you", "your",
];

/// Local embedder based on feature hashing of term frequencies.
///
/// Texts are lowercased and split into alphanumeric tokens; short tokens and common English
/// stop-words are dropped. Each remaining token increments the dimension selected by its
/// FNV-1a hash, and the vector is L2-normalized. Similar vocabulary yields similar vectors,
/// which is enough to relate posts without a remote model.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    model_name: String,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Result<Self, EmbeddingError> {
        if dimensions == 0 {
            return Err(EmbeddingError::InvalidRequest(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            dimensions,
            model_name: format!("hashing-{dimensions}"),
        })
    }

    fn embed_one(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimensions];
        let mut token_count = 0usize;

        for token in tokens(text) {
            let index = fnv1a(token.as_bytes()) as usize % self.dimensions;
            vector[index] += 1.0;
            token_count += 1;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        trace!(token_count, "Hashed text into embedding");
        Embedding::from(vector)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
            model_name: format!("hashing-{DEFAULT_DIMENSIONS}"),
        }
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
}

fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_drop_short_words_and_stop_words() {
        let tokens: Vec<_> = tokens("The Rust compiler, and an LLVM backend!").collect();
        assert_eq!(tokens, vec!["rust", "compiler", "llvm", "backend"]);
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(matches!(
            HashingEmbedder::new(0),
            Err(EmbeddingError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn embeddings_are_normalized_and_deterministic() {
        let embedder = HashingEmbedder::default();
        let first = embedder.embed(&["ownership and borrowing in rust"]).await.unwrap();
        let second = embedder.embed(&["ownership and borrowing in rust"]).await.unwrap();
        assert_eq!(first, second);

        let norm: f32 = first[0].as_slice().iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert_eq!(first[0].dimensions(), DEFAULT_DIMENSIONS);
    }

    #[tokio::test]
    async fn shared_vocabulary_scores_higher() {
        let embedder = HashingEmbedder::default();
        let embeddings = embedder
            .embed(&[
                "rust ownership borrowing lifetimes",
                "borrowing rules and lifetimes in rust",
                "baking sourdough bread at home",
            ])
            .await
            .unwrap();

        let related = embeddings[0].similarity(&embeddings[1]).unwrap();
        let unrelated = embeddings[0].similarity(&embeddings[2]).unwrap();
        assert!(related > unrelated);
    }

    #[tokio::test]
    async fn text_without_tokens_yields_zero_vector() {
        let embedder = HashingEmbedder::new(8).unwrap();
        let embeddings = embedder.embed(&["a an to"]).await.unwrap();
        assert!(embeddings[0].as_slice().iter().all(|v| *v == 0.0));
    }
}

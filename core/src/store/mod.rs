//! In-memory document store with similarity search.
//!
//! The store maps a document identifier to its text, a snapshot of its metadata and the
//! embedding of its text. It lives for one process invocation; nothing is persisted.
//!
//! Entries keep their insertion order. Overwriting an existing identifier (via
//! [`DocumentStore::add`] or [`DocumentStore::update`]) keeps the entry's original position,
//! which makes search results deterministic when scores tie.

use thiserror::Error;
use tracing::{debug, instrument};

use crate::embedding::{Embedder, Embedding, EmbeddingError};
use crate::frontmatter::Metadata;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found in store: {0}")]
    NotFound(String),

    #[error("Failed to embed document text")]
    Embedding(#[from] EmbeddingError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A document held by the store.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    id: String,
    text: String,
    metadata: Metadata,
    embedding: Embedding,
}

impl StoredDocument {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }
}

/// One result of [`DocumentStore::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub metadata: Metadata,
}

pub struct DocumentStore {
    embedder: Box<dyn Embedder>,
    documents: Vec<StoredDocument>,
}

impl DocumentStore {
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        DocumentStore {
            embedder,
            documents: Vec::new(),
        }
    }

    pub fn embedder(&self) -> &dyn Embedder {
        &*self.embedder
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&StoredDocument> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Identifiers in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|doc| doc.id.as_str())
    }

    /// Adds a document, overwriting any existing entry with the same identifier.
    ///
    /// Fails only if the text cannot be embedded.
    #[instrument(skip(self, text, metadata))]
    pub async fn add(&mut self, id: &str, text: &str, metadata: Metadata) -> Result<()> {
        let document = self.prepare(id, text, metadata).await?;
        match self.position(id) {
            Some(idx) => self.documents[idx] = document,
            None => self.documents.push(document),
        }
        debug!("Added document to store");
        Ok(())
    }

    /// Replaces an existing document. Returns [`StoreError::NotFound`] if `id` is absent.
    #[instrument(skip(self, text, metadata))]
    pub async fn update(&mut self, id: &str, text: &str, metadata: Metadata) -> Result<()> {
        let Some(idx) = self.position(id) else {
            debug!("Document not found in store");
            return Err(StoreError::NotFound(id.to_string()));
        };
        self.documents[idx] = self.prepare(id, text, metadata).await?;
        debug!("Updated document in store");
        Ok(())
    }

    /// Removes a document. Returns [`StoreError::NotFound`] if `id` is absent.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: &str) -> Result<StoredDocument> {
        let Some(idx) = self.position(id) else {
            debug!("Document not found in store");
            return Err(StoreError::NotFound(id.to_string()));
        };
        debug!("Removed document from store");
        Ok(self.documents.remove(idx))
    }

    /// Returns up to `k` documents ranked by cosine similarity to `query_text`.
    ///
    /// Hits are ordered by descending score; equal scores keep insertion order.
    #[instrument(skip(self, query_text), fields(documents = self.documents.len()))]
    pub async fn search(&self, query_text: &str, k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 || self.documents.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embed_single(query_text).await?;

        let mut scored = Vec::with_capacity(self.documents.len());
        for doc in &self.documents {
            scored.push((doc.embedding.similarity(&query)?, doc));
        }
        // Stable sort keeps insertion order for ties
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(k);

        let hits = scored
            .into_iter()
            .map(|(score, doc)| SearchHit {
                id: doc.id.clone(),
                score,
                metadata: doc.metadata.clone(),
            })
            .collect::<Vec<_>>();
        debug!(hits = hits.len(), "Found similar documents");
        Ok(hits)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.documents.iter().position(|doc| doc.id == id)
    }

    async fn prepare(&self, id: &str, text: &str, metadata: Metadata) -> Result<StoredDocument> {
        let embedding = self.embed_single(text).await?;
        Ok(StoredDocument {
            id: id.to_string(),
            text: text.to_string(),
            metadata,
            embedding,
        })
    }

    async fn embed_single(&self, text: &str) -> Result<Embedding> {
        let mut embeddings = self.embedder.embed(&[text]).await?;
        if embeddings.len() != 1 {
            return Err(EmbeddingError::CountMismatch {
                expected: 1,
                actual: embeddings.len(),
            }
            .into());
        }
        Ok(embeddings.remove(0))
    }
}

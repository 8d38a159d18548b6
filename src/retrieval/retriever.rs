/// Subject-filtered semantic search over the vector store
use crate::corpus::{DocMetadata, DocumentKind, Subject, SubjectFilter};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::store::{MetadataFilter, VectorStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// One ranked search result
///
/// `similarity_score` is `1 - distance` over the store's cosine distance:
/// higher is more relevant, ~1.0 is a near-exact match. Serializes flat:
/// `content`, the metadata keys, and `similarity_score`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub content: String,
    #[serde(flatten)]
    pub metadata: DocMetadata,
    pub similarity_score: f32,
}

impl SearchResult {
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn subject(&self) -> Subject {
        self.metadata.subject
    }

    pub fn kind(&self) -> DocumentKind {
        self.metadata.kind
    }

    pub fn file_path(&self) -> &str {
        &self.metadata.file_path
    }
}

/// Serves top-k nearest-neighbor queries against the indexed collection
///
/// Results come back in the store's native rank order (nearest first); no
/// re-ranking happens here. A fixed index state and a fixed query embedding
/// yield identical results across calls.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: collection.into(),
        }
    }

    /// Search the knowledge base
    ///
    /// A failed query embedding degrades to a zero vector: the search still
    /// runs but returns weakly-ranked matches. The degradation is logged;
    /// callers can also treat near-zero similarity scores as unreliable.
    /// An empty index (or a filter matching nothing) yields an empty vec.
    pub fn search(
        &self,
        query: &str,
        filter: SubjectFilter,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        let metadata_filter = filter
            .subject()
            .map(|subject| MetadataFilter::equals("subject", subject.as_str()));

        let embedding = match self.embedder.embed(query) {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Query embedding failed, searching with zero vector: {}", e);
                vec![0.0; self.embedder.dimension()]
            }
        };

        let hits = self.store.query(
            &self.collection,
            &embedding,
            max_results,
            metadata_filter.as_ref(),
        )?;

        Ok(hits
            .into_iter()
            .map(|hit| SearchResult {
                content: hit.document,
                metadata: hit.metadata,
                similarity_score: 1.0 - hit.distance,
            })
            .collect())
    }
}

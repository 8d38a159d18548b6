//! Vector store abstraction
//!
//! Nearest-neighbor storage and search are delegated to an external vector
//! database. The `VectorStore` trait mirrors the collection API the engine
//! consumes: create/get/delete collection, bulk add, filtered top-k query,
//! count. `ChromaStore` implements it against the Chroma REST API.

mod chroma;

pub use chroma::ChromaStore;

use crate::corpus::DocMetadata;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store initialization failed: {0}")]
    InitializationError(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Store request failed: {0}")]
    RequestError(String),

    #[error("Store returned an error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected store response: {0}")]
    InvalidResponse(String),
}

/// One bulk insertion, column-oriented as the store consumes it
///
/// All four columns are index-aligned.
#[derive(Debug, Clone, Default)]
pub struct DocumentBatch {
    pub ids: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
    pub documents: Vec<String>,
    pub metadatas: Vec<DocMetadata>,
}

impl DocumentBatch {
    pub fn push(&mut self, id: String, embedding: Vec<f32>, document: String, metadata: DocMetadata) {
        self.ids.push(id);
        self.embeddings.push(embedding);
        self.documents.push(document);
        self.metadatas.push(metadata);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Equality predicate over one metadata key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFilter {
    pub key: String,
    pub value: String,
}

impl MetadataFilter {
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One nearest-neighbor hit, nearest first in a result list
///
/// `distance` is the store's native metric (cosine distance for collections
/// this crate creates); the retriever owns the similarity transform.
#[derive(Debug, Clone)]
pub struct QueryHit {
    pub id: String,
    pub document: String,
    pub metadata: DocMetadata,
    pub distance: f32,
}

/// Trait for vector store backends
pub trait VectorStore: Send + Sync {
    /// Create a collection; fails if it already exists
    fn create_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Whether a collection with this name exists
    fn collection_exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Delete a collection; fails with `CollectionNotFound` if missing
    fn delete_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Bulk-insert a batch of (id, embedding, document, metadata) rows
    fn add(&self, collection: &str, batch: &DocumentBatch) -> Result<(), StoreError>;

    /// Top-k nearest-neighbor query, optionally metadata-filtered,
    /// nearest first
    fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<QueryHit>, StoreError>;

    /// Number of stored documents
    fn count(&self, collection: &str) -> Result<usize, StoreError>;
}

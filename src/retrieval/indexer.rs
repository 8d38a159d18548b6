/// Index construction: corpus traversal, embedding, bulk load
use crate::corpus::{scan_knowledge_base, SourceDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::store::{DocumentBatch, StoreError, VectorStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Courtesy pause inserted after every N embedding calls to respect
/// provider quotas; not a correctness requirement.
const PAUSE_EVERY: usize = 10;
const PAUSE: Duration = Duration::from_millis(100);

/// Builds the vector index from the knowledge base
///
/// Embedding calls are issued strictly sequentially, one document at a
/// time; a failed call degrades that document to a zero vector of the
/// expected dimensionality instead of aborting the build. Store failures
/// are fatal to the operation.
pub struct Indexer {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
    knowledge_root: PathBuf,
}

impl Indexer {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        knowledge_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: collection.into(),
            knowledge_root: knowledge_root.into(),
        }
    }

    /// Create the collection and build the index if it does not exist yet
    ///
    /// The existence check is the idempotence guard: an existing collection
    /// skips the build entirely. Returns the number of documents indexed,
    /// or `None` if the collection was already there.
    pub fn ensure_index(&self) -> Result<Option<usize>> {
        if self.store.collection_exists(&self.collection)? {
            info!("Collection '{}' already exists, skipping build", self.collection);
            return Ok(None);
        }

        info!("Creating collection '{}'", self.collection);
        self.store.create_collection(&self.collection)?;
        Ok(Some(self.build()?))
    }

    /// Delete the collection and rebuild it from scratch
    ///
    /// Not atomic: the old collection is gone before the new build starts,
    /// and a failed build leaves no collection behind.
    pub fn rebuild(&self) -> Result<usize> {
        info!("Rebuilding knowledge index...");

        match self.store.delete_collection(&self.collection) {
            Ok(()) => {}
            Err(StoreError::CollectionNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        self.store.create_collection(&self.collection)?;
        self.build()
    }

    fn build(&self) -> Result<usize> {
        let documents = scan_knowledge_base(&self.knowledge_root)?;
        if documents.is_empty() {
            info!("No documents found to index");
            return Ok(0);
        }

        let total = documents.len();
        info!("Generating embeddings for {} documents...", total);

        let mut batch = DocumentBatch::default();
        for (i, doc) in documents.into_iter().enumerate() {
            let embedding = self.embed_or_zero(&doc);
            batch.push(Uuid::new_v4().to_string(), embedding, doc.text, doc.metadata);

            if i > 0 && i % PAUSE_EVERY == 0 {
                info!("Generated embeddings for {}/{} documents", i, total);
                std::thread::sleep(PAUSE);
            }
        }

        self.store.add(&self.collection, &batch)?;
        info!("Knowledge index built: {} documents", batch.len());

        Ok(batch.len())
    }

    fn embed_or_zero(&self, doc: &SourceDocument) -> Vec<f32> {
        match self.embedder.embed(&doc.text) {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(
                    "Embedding failed for {}, substituting zero vector: {}",
                    doc.metadata.file_path, e
                );
                vec![0.0; self.embedder.dimension()]
            }
        }
    }
}

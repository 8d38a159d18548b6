/// Facade composing the indexer, retriever, and context assembly
use super::{assemble_context, Indexer, Retriever, SearchResult};
use crate::corpus::SubjectFilter;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::store::VectorStore;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Statistics about the indexed knowledge base
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub collection_name: String,
    pub embedding_model: String,
}

/// The retrieval engine behind the query API surface
///
/// Constructed once at process start from explicitly injected provider and
/// store handles; request-handling code receives it by reference. There is
/// no ambient global state.
pub struct RetrievalEngine {
    indexer: Indexer,
    retriever: Retriever,
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    collection: String,
    context_results: usize,
}

impl RetrievalEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        knowledge_root: PathBuf,
        collection: impl Into<String>,
        context_results: usize,
    ) -> Self {
        let collection = collection.into();
        Self {
            indexer: Indexer::new(
                embedder.clone(),
                store.clone(),
                collection.clone(),
                knowledge_root,
            ),
            retriever: Retriever::new(embedder.clone(), store.clone(), collection.clone()),
            store,
            embedder,
            collection,
            context_results,
        }
    }

    /// Build the index if the backing collection does not exist yet
    pub fn ensure_index(&self) -> Result<Option<usize>> {
        self.indexer.ensure_index()
    }

    /// Delete and rebuild the whole index
    pub fn rebuild_index(&self) -> Result<usize> {
        self.indexer.rebuild()
    }

    /// Subject-filtered top-k semantic search
    pub fn search(
        &self,
        query: &str,
        filter: SubjectFilter,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        self.retriever.search(query, filter, max_results)
    }

    /// Retrieve and assemble a bounded context string for prompt injection
    pub fn relevant_context(
        &self,
        query: &str,
        filter: SubjectFilter,
        max_context_length: usize,
    ) -> Result<String> {
        let results = self.search(query, filter, self.context_results)?;
        Ok(assemble_context(&results, max_context_length))
    }

    /// Statistics about the indexed collection
    pub fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            total_documents: self.store.count(&self.collection)?,
            collection_name: self.collection.clone(),
            embedding_model: self.embedder.model_name().to_string(),
        })
    }
}

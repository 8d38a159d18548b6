//! Shared test fakes: a deterministic embedder and an in-memory vector store
//! implementing the same contracts as the hosted services.

use satkb::corpus::DocMetadata;
use satkb::embedding::{EmbedError, EmbeddingProvider};
use satkb::store::{DocumentBatch, MetadataFilter, QueryHit, StoreError, VectorStore};
use std::collections::HashMap;
use std::sync::Mutex;

pub const DIM: usize = 32;

/// Deterministic bag-of-words embedder
///
/// Each lowercase word hashes to one dimension, so identical texts embed
/// identically and texts sharing vocabulary land near each other in cosine
/// space. No network, no model.
pub struct MockEmbedder;

impl EmbeddingProvider for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.is_empty() {
            return Err(EmbedError::InvalidInput("Empty text".to_string()));
        }

        let mut vector = vec![0.0f32; DIM];
        for word in text.to_lowercase().split_whitespace() {
            let mut hash = 0usize;
            for byte in word.bytes() {
                hash = hash.wrapping_mul(31).wrapping_add(byte as usize);
            }
            vector[hash % DIM] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn model_name(&self) -> &str {
        "mock-bag-of-words"
    }
}

/// Embedder whose every call fails; exercises zero-vector degradation
pub struct FailingEmbedder;

impl EmbeddingProvider for FailingEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
        Err(EmbedError::GenerationError("simulated outage".to_string()))
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn model_name(&self) -> &str {
        "failing-embedder"
    }
}

struct Row {
    id: String,
    embedding: Vec<f32>,
    document: String,
    metadata: DocMetadata,
}

/// In-memory vector store with exact cosine-distance search
///
/// Implements the `VectorStore` contract the Chroma client satisfies:
/// distances are cosine distances (`1 - cosine similarity`), results come
/// back nearest first, and metadata filters are equality predicates over
/// the serialized metadata keys.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored ids, in insertion order (test inspection helper)
    pub fn ids(&self, collection: &str) -> Vec<String> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|rows| rows.iter().map(|r| r.id.clone()).collect())
            .unwrap_or_default()
    }
}

impl VectorStore for MemoryStore {
    fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().unwrap();
        if collections.contains_key(name) {
            return Err(StoreError::Api {
                status: 409,
                body: format!("collection {} already exists", name),
            });
        }
        collections.insert(name.to_string(), Vec::new());
        Ok(())
    }

    fn collection_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.collections.lock().unwrap().contains_key(name))
    }

    fn delete_collection(&self, name: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().unwrap();
        collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))
    }

    fn add(&self, collection: &str, batch: &DocumentBatch) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().unwrap();
        let rows = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        for i in 0..batch.len() {
            rows.push(Row {
                id: batch.ids[i].clone(),
                embedding: batch.embeddings[i].clone(),
                document: batch.documents[i].clone(),
                metadata: batch.metadatas[i].clone(),
            });
        }

        Ok(())
    }

    fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<QueryHit>, StoreError> {
        let collections = self.collections.lock().unwrap();
        let rows = collections
            .get(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        let mut hits: Vec<QueryHit> = rows
            .iter()
            .filter(|row| matches_filter(&row.metadata, filter))
            .map(|row| QueryHit {
                id: row.id.clone(),
                document: row.document.clone(),
                metadata: row.metadata.clone(),
                distance: cosine_distance(embedding, &row.embedding),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }

    fn count(&self, collection: &str) -> Result<usize, StoreError> {
        let collections = self.collections.lock().unwrap();
        collections
            .get(collection)
            .map(|rows| rows.len())
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))
    }
}

fn matches_filter(metadata: &DocMetadata, filter: Option<&MetadataFilter>) -> bool {
    let Some(filter) = filter else { return true };
    let value = serde_json::to_value(metadata).expect("metadata serializes");
    value
        .get(&filter.key)
        .and_then(|v| v.as_str())
        .is_some_and(|v| v == filter.value)
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        // Undefined against a zero vector; treat as maximally distant
        return 1.0;
    }

    1.0 - dot / (norm_a * norm_b)
}

/// Blocking Chroma REST client
use super::{DocumentBatch, MetadataFilter, QueryHit, StoreError, VectorStore};
use crate::config::StoreConfig;
use crate::corpus::DocMetadata;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Vector store backed by a Chroma server
///
/// Collections are created with `hnsw:space = "cosine"` so query distances
/// are cosine distances and the retriever's `1 - distance` similarity
/// transform holds. Add/query/count address collections by the server-side
/// collection id, resolved from the name per operation.
pub struct ChromaStore {
    client: Client,
    base_url: String,
}

impl ChromaStore {
    /// Build a new Chroma client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(StoreError::InitializationError(format!(
                "store URL must be an http(s) URL, got '{}'",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            StoreError::InitializationError(format!("failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client from configuration
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }

    fn collections_url(&self) -> String {
        format!("{}/api/v1/collections", self.base_url)
    }

    /// Resolve a collection name to its server-side id
    fn resolve(&self, name: &str) -> Result<CollectionInfo, StoreError> {
        let url = format!("{}/{}", self.collections_url(), name);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| StoreError::RequestError(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<CollectionInfo>()
                .map_err(|e| StoreError::InvalidResponse(e.to_string())),
            StatusCode::NOT_FOUND => Err(StoreError::CollectionNotFound(name.to_string())),
            status => Err(api_error(status, response)),
        }
    }
}

impl VectorStore for ChromaStore {
    fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        let body = json!({
            "name": name,
            "metadata": { "hnsw:space": "cosine" },
            "get_or_create": false,
        });

        let response = self
            .client
            .post(self.collections_url())
            .json(&body)
            .send()
            .map_err(|e| StoreError::RequestError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(api_error(status, response))
        }
    }

    fn collection_exists(&self, name: &str) -> Result<bool, StoreError> {
        match self.resolve(name) {
            Ok(_) => Ok(true),
            Err(StoreError::CollectionNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn delete_collection(&self, name: &str) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.collections_url(), name);
        let response = self
            .client
            .delete(&url)
            .send()
            .map_err(|e| StoreError::RequestError(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(StoreError::CollectionNotFound(name.to_string())),
            status => Err(api_error(status, response)),
        }
    }

    fn add(&self, collection: &str, batch: &DocumentBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let info = self.resolve(collection)?;
        let url = format!("{}/{}/add", self.collections_url(), info.id);
        let body = AddRequest {
            ids: &batch.ids,
            embeddings: &batch.embeddings,
            documents: &batch.documents,
            metadatas: &batch.metadatas,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| StoreError::RequestError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(api_error(status, response))
        }
    }

    fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<QueryHit>, StoreError> {
        let info = self.resolve(collection)?;
        let url = format!("{}/{}/query", self.collections_url(), info.id);

        let mut body = json!({
            "query_embeddings": [embedding],
            "n_results": k,
            "include": ["documents", "metadatas", "distances"],
        });
        if let Some(filter) = filter {
            let mut where_clause = serde_json::Map::new();
            where_clause.insert(
                filter.key.clone(),
                serde_json::Value::String(filter.value.clone()),
            );
            body["where"] = serde_json::Value::Object(where_clause);
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| StoreError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response));
        }

        let parsed: QueryResponse = response
            .json()
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        parsed.into_hits()
    }

    fn count(&self, collection: &str) -> Result<usize, StoreError> {
        let info = self.resolve(collection)?;
        let url = format!("{}/{}/count", self.collections_url(), info.id);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| StoreError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response));
        }

        response
            .json::<usize>()
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }
}

fn api_error(status: StatusCode, response: reqwest::blocking::Response) -> StoreError {
    let body = response
        .text()
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    StoreError::Api {
        status: status.as_u16(),
        body,
    }
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Serialize)]
struct AddRequest<'a> {
    ids: &'a [String],
    embeddings: &'a [Vec<f32>],
    documents: &'a [String],
    metadatas: &'a [DocMetadata],
}

/// Chroma returns one inner list per query embedding; we always send one.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    documents: Vec<Vec<Option<String>>>,
    metadatas: Vec<Vec<DocMetadata>>,
    distances: Vec<Vec<f32>>,
}

impl QueryResponse {
    fn into_hits(self) -> Result<Vec<QueryHit>, StoreError> {
        let ids = self.ids.into_iter().next().unwrap_or_default();
        let documents = self.documents.into_iter().next().unwrap_or_default();
        let metadatas = self.metadatas.into_iter().next().unwrap_or_default();
        let distances = self.distances.into_iter().next().unwrap_or_default();

        if ids.len() != metadatas.len() || ids.len() != distances.len() {
            return Err(StoreError::InvalidResponse(format!(
                "misaligned query response columns: {} ids, {} metadatas, {} distances",
                ids.len(),
                metadatas.len(),
                distances.len()
            )));
        }

        let mut documents = documents.into_iter();
        Ok(ids
            .into_iter()
            .zip(metadatas)
            .zip(distances)
            .map(|((id, metadata), distance)| QueryHit {
                id,
                document: documents.next().flatten().unwrap_or_default(),
                metadata,
                distance,
            })
            .collect())
    }
}

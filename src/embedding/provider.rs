/// Embedding provider trait and hosted HTTP implementation
use crate::config::EmbeddingConfig;
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Provider initialization failed: {0}")]
    InitializationError(String),

    #[error("Embedding request failed: {0}")]
    RequestError(String),

    #[error("Embedding generation failed: {0}")]
    GenerationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Trait for embedding providers
///
/// Allows abstraction over different embedding backends (hosted APIs, test
/// fakes). One call embeds one text; indexing issues calls strictly
/// sequentially.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Blocking embeddings client for OpenAI-compatible endpoints
///
/// The hosted Gemini embedding API (`text-embedding-004`, 768 dimensions)
/// exposes one; so do OpenAI and most inference gateways. No retries: a
/// failed call surfaces immediately and the caller decides how to degrade.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimension: usize,
}

impl HttpEmbedder {
    /// Build a new embeddings client
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self, EmbedError> {
        if api_key.trim().is_empty() {
            return Err(EmbedError::InitializationError(
                "missing API key".to_string(),
            ));
        }
        if model.trim().is_empty() {
            return Err(EmbedError::InitializationError(
                "missing model name".to_string(),
            ));
        }
        if dimension == 0 {
            return Err(EmbedError::InitializationError(
                "embedding dimension must be greater than 0".to_string(),
            ));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| EmbedError::InitializationError("invalid API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                EmbedError::InitializationError(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
            dimension,
        })
    }

    /// Build a client from configuration, reading the API key from the
    /// configured environment variable
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, EmbedError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            EmbedError::InitializationError(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;

        Self::new(
            &api_key,
            &config.endpoint,
            &config.model,
            config.dimension,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

impl EmbeddingProvider for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.is_empty() {
            return Err(EmbedError::InvalidInput("Empty text".to_string()));
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: [text],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| EmbedError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbedError::GenerationError(format!(
                "embeddings request failed ({}): {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| EmbedError::GenerationError(format!("failed to parse response: {}", e)))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::GenerationError("No embeddings returned".to_string()))?
            .embedding;

        if embedding.len() != self.dimension {
            return Err(EmbedError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

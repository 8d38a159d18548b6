//! Embedding generation
//!
//! Embedding computation is delegated to a hosted API. The
//! `EmbeddingProvider` trait abstracts the backend; `HttpEmbedder` talks to
//! any OpenAI-compatible `/embeddings` endpoint. Degradation policy (a
//! failed call becomes a zero vector of the expected dimensionality) lives
//! with the callers in `retrieval`, not here.

mod provider;

pub use provider::{EmbedError, EmbeddingProvider, HttpEmbedder};

//! Semantic indexing, search, and context assembly
//!
//! The pipeline: `Indexer` walks the knowledge base, embeds each document
//! through the `EmbeddingProvider`, and bulk-loads the vector store;
//! `Retriever` serves subject-filtered top-k queries; `assemble_context`
//! folds ranked results into a bounded prompt-injection string.
//! `RetrievalEngine` composes the three behind the public query surface.

mod context;
mod engine;
mod indexer;
mod retriever;

pub use context::{assemble_context, NO_CONTEXT_MESSAGE};
pub use engine::{IndexStats, RetrievalEngine};
pub use indexer::Indexer;
pub use retriever::{Retriever, SearchResult};

//! satkb - SAT Knowledge Base Retrieval Engine
//!
//! Indexes a hierarchical corpus of SAT study notes (subject → topic →
//! subtopic), embeds each document through a hosted embedding API, stores
//! the vectors in an external vector database, and serves subject-filtered
//! top-k semantic search with bounded context assembly for prompt
//! construction. A lexical keyword index over the same corpus provides an
//! offline fallback search path.

pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod keyword;
pub mod retrieval;
pub mod store;

pub use error::{Result, SatkbError};

//! Configuration management for satkb
//!
//! This module handles loading, validation, and management of the TOML
//! configuration that wires the knowledge base, the hosted embedding API,
//! and the vector store together.

use crate::error::{Result, SatkbError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub knowledge: KnowledgeConfig,
    pub embedding: EmbeddingConfig,
    pub store: StoreConfig,
    pub retrieval: RetrievalConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Knowledge base configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Root directory of the subject/topic/subtopic markdown tree
    pub root: PathBuf,
}

/// Hosted embedding API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of an OpenAI-compatible embeddings endpoint
    pub endpoint: String,
    /// Embedding model identifier
    pub model: String,
    /// Vector dimension the model produces
    pub dimension: usize,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Vector store (Chroma) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the Chroma server
    pub url: String,
    /// Collection name backing the index
    pub collection: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Default number of search results
    pub max_results: usize,
    /// Number of results fed into context assembly
    pub context_results: usize,
    /// Default context budget in characters
    pub max_context_length: usize,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SatkbError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SatkbError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| SatkbError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: SATKB_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("SATKB_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "KNOWLEDGE__ROOT" => {
                self.knowledge.root = PathBuf::from(value);
            }
            "EMBEDDING__ENDPOINT" => {
                self.embedding.endpoint = value.to_string();
            }
            "EMBEDDING__MODEL" => {
                self.embedding.model = value.to_string();
            }
            "EMBEDDING__DIMENSION" => {
                self.embedding.dimension =
                    value.parse().map_err(|_| SatkbError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as integer", value),
                    })?;
            }
            "STORE__URL" => {
                self.store.url = value.to_string();
            }
            "STORE__COLLECTION" => {
                self.store.collection = value.to_string();
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SatkbError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("satkb").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            knowledge: KnowledgeConfig {
                root: PathBuf::from("satKnowledge"),
            },
            embedding: EmbeddingConfig {
                endpoint: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
                model: "text-embedding-004".to_string(),
                dimension: 768,
                api_key_env: "GEMINI_API_KEY".to_string(),
                timeout_secs: 30,
            },
            store: StoreConfig {
                url: "http://localhost:8000".to_string(),
                collection: "sat_knowledge".to_string(),
                timeout_secs: 30,
            },
            retrieval: RetrievalConfig {
                max_results: 5,
                context_results: 3,
                max_context_length: 2000,
            },
        }
    }
}

use crate::config::Config;
use crate::error::{Result, SatkbError, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_knowledge(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_store(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SatkbError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_knowledge(config: &Config, errors: &mut Vec<ValidationError>) {
        // Note: existence of the root is not checked here; the tree may be
        // created after the config, and the indexer reports a missing root
        // with full context.
        if config.knowledge.root.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "knowledge.root",
                "Knowledge base root path cannot be empty",
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if !Self::is_http_url(&config.embedding.endpoint) {
            errors.push(ValidationError::new(
                "embedding.endpoint",
                format!(
                    "Endpoint must be an http(s) URL, got '{}'",
                    config.embedding.endpoint
                ),
            ));
        }

        if config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }

        if config.embedding.dimension == 0 {
            errors.push(ValidationError::new(
                "embedding.dimension",
                "Embedding dimension must be greater than 0",
            ));
        }

        if config.embedding.api_key_env.is_empty() {
            errors.push(ValidationError::new(
                "embedding.api_key_env",
                "API key environment variable name cannot be empty",
            ));
        }
    }

    fn validate_store(config: &Config, errors: &mut Vec<ValidationError>) {
        if !Self::is_http_url(&config.store.url) {
            errors.push(ValidationError::new(
                "store.url",
                format!("Store URL must be an http(s) URL, got '{}'", config.store.url),
            ));
        }

        if config.store.collection.is_empty() {
            errors.push(ValidationError::new(
                "store.collection",
                "Collection name cannot be empty",
            ));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.retrieval.max_results == 0 {
            errors.push(ValidationError::new(
                "retrieval.max_results",
                "max_results must be greater than 0",
            ));
        }

        if config.retrieval.context_results == 0 {
            errors.push(ValidationError::new(
                "retrieval.context_results",
                "context_results must be greater than 0",
            ));
        }

        if config.retrieval.max_context_length == 0 {
            errors.push(ValidationError::new(
                "retrieval.max_context_length",
                "max_context_length must be greater than 0",
            ));
        }
    }

    fn is_http_url(s: &str) -> bool {
        s.starts_with("http://") || s.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_empty_knowledge_root() {
        let mut config = Config::default();
        config.knowledge.root = PathBuf::new();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_invalid_endpoint() {
        let mut config = Config::default();
        config.embedding.endpoint = "ftp://example.com".to_string();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_zero_dimension() {
        let mut config = Config::default();
        config.embedding.dimension = 0;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_empty_collection() {
        let mut config = Config::default();
        config.store.collection = String::new();
        assert!(ConfigValidator::validate(&config).is_err());
    }
}

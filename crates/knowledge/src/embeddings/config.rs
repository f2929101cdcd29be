//! Embedding configuration resolved from application settings.

use medrag_core::{AppError, AppResult, EmbeddingSettings};
use serde::{Deserialize, Serialize};

/// Providers that can be selected in `rag.embedding.provider`.
pub const KNOWN_EMBEDDING_PROVIDERS: &[&str] = &["fastembed", "ollama", "trigram"];

/// Texts per embedding request when not configured.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Fully resolved embedding configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "fastembed", "ollama", "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Maximum number of texts per embedding request
    pub batch_size: usize,

    /// Base URL for HTTP providers
    pub endpoint: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::for_provider(default_provider())
    }
}

/// The local sentence model (default feature), otherwise the offline trigram
/// embedder.
pub fn default_provider() -> &'static str {
    if cfg!(feature = "fastembed") {
        "fastembed"
    } else {
        "trigram"
    }
}

impl EmbeddingConfig {
    /// Defaults for a given provider.
    pub fn for_provider(provider: &str) -> Self {
        let (model, dimensions) = match provider {
            "fastembed" => ("all-MiniLM-L6-v2", 384),
            "ollama" => ("nomic-embed-text", 768),
            _ => ("trigram-v1", 384),
        };

        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            dimensions,
            batch_size: DEFAULT_BATCH_SIZE,
            endpoint: None,
        }
    }

    /// Resolve configuration from `rag.embedding` settings, filling unset
    /// fields with the provider's defaults.
    pub fn from_settings(settings: &EmbeddingSettings) -> AppResult<Self> {
        let provider = settings
            .provider
            .as_deref()
            .unwrap_or(default_provider())
            .to_lowercase();

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: '{}'. Supported providers: {}",
                provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        let defaults = Self::for_provider(&provider);

        let config = Self {
            model: settings.model.clone().unwrap_or(defaults.model),
            dimensions: settings.dimensions.unwrap_or(defaults.dimensions),
            batch_size: settings.batch_size.unwrap_or(defaults.batch_size),
            endpoint: settings.endpoint.clone(),
            provider,
        };

        if config.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if config.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding batch size must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, default_provider());
        assert_eq!(config.dimensions, 384);
        assert_eq!(config.batch_size, 32);
    }

    #[cfg(feature = "fastembed")]
    #[test]
    fn test_default_is_local_sentence_model() {
        let config = EmbeddingConfig::from_settings(&EmbeddingSettings::default()).unwrap();
        assert_eq!(config.provider, "fastembed");
        assert_eq!(config.model, "all-MiniLM-L6-v2");
        assert_eq!(config.dimensions, 384);
    }

    #[test]
    fn test_from_empty_settings_uses_default_provider() {
        let config = EmbeddingConfig::from_settings(&EmbeddingSettings::default()).unwrap();
        assert_eq!(config, EmbeddingConfig::default());
    }

    #[test]
    fn test_from_settings_ollama_defaults() {
        let settings = EmbeddingSettings {
            provider: Some("Ollama".to_string()),
            ..Default::default()
        };

        let config = EmbeddingConfig::from_settings(&settings).unwrap();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "nomic-embed-text");
        assert_eq!(config.dimensions, 768);
    }

    #[test]
    fn test_from_settings_overrides() {
        let settings = EmbeddingSettings {
            provider: Some("trigram".to_string()),
            model: None,
            dimensions: Some(128),
            batch_size: Some(8),
            endpoint: None,
        };

        let config = EmbeddingConfig::from_settings(&settings).unwrap();
        assert_eq!(config.model, "trigram-v1");
        assert_eq!(config.dimensions, 128);
        assert_eq!(config.batch_size, 8);
    }

    #[test]
    fn test_from_settings_unknown_provider() {
        let settings = EmbeddingSettings {
            provider: Some("word2vec".to_string()),
            ..Default::default()
        };

        let err = EmbeddingConfig::from_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[test]
    fn test_from_settings_zero_dimensions() {
        let settings = EmbeddingSettings {
            provider: Some("trigram".to_string()),
            dimensions: Some(0),
            ..Default::default()
        };

        assert!(EmbeddingConfig::from_settings(&settings).is_err());
    }
}

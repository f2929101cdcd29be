//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingConfig;
use medrag_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// The same provider instance must embed the corpus and the questions so that
/// both live in one vector space.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "fastembed", "ollama", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Check that every vector has the provider's dimensionality.
pub fn check_dimensions(vectors: &[Vec<f32>], expected: usize) -> AppResult<()> {
    match vectors.iter().find(|v| v.len() != expected) {
        Some(vector) => Err(AppError::Embedding(format!(
            "Dimension mismatch: expected {}, got {}",
            expected,
            vector.len()
        ))),
        None => Ok(()),
    }
}

/// Create an embedding provider based on configuration.
pub async fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    tracing::debug!(
        "Creating embedding provider: provider={}, model={}, dimensions={}",
        config.provider,
        config.model,
        config.dimensions
    );

    match config.provider.as_str() {
        "trigram" => {
            let provider = super::providers::trigram::TrigramProvider::new(config.dimensions);
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let provider = super::providers::ollama::OllamaProvider::new(config.clone()).await?;
            Ok(Arc::new(provider))
        }

        #[cfg(feature = "fastembed")]
        "fastembed" => {
            let provider = super::providers::fastembed::FastEmbedProvider::new(config).await?;
            Ok(Arc::new(provider))
        }

        #[cfg(not(feature = "fastembed"))]
        "fastembed" => Err(AppError::Config(
            "The fastembed provider is not compiled in. Rebuild with `--features fastembed` \
             or select the 'trigram' or 'ollama' provider."
                .to_string(),
        )),

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: fastembed, ollama, trigram",
            config.provider
        ))),
    }
}

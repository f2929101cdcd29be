//! Embedding engine for the corpus and questions.
//!
//! Provides provider-agnostic embedding generation behind [`EmbeddingProvider`].

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{check_dimensions, create_provider, EmbeddingProvider};

use medrag_core::AppResult;

/// Embed texts in slices of at most `batch_size`, preserving order.
///
/// Every returned vector is checked against the provider's dimensionality.
pub async fn embed_texts(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    batch_size: usize,
) -> AppResult<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    tracing::info!(
        "Embedding {} texts using provider '{}' (model: {})",
        texts.len(),
        provider.provider_name(),
        provider.model_name()
    );

    let mut embeddings = Vec::with_capacity(texts.len());

    for batch in texts.chunks(batch_size.max(1)) {
        let vectors = provider.embed_batch(batch).await?;
        if vectors.len() != batch.len() {
            return Err(medrag_core::AppError::Embedding(format!(
                "Provider returned {} embeddings for {} texts",
                vectors.len(),
                batch.len()
            )));
        }
        check_dimensions(&vectors, provider.dimensions())?;
        embeddings.extend(vectors);
    }

    tracing::debug!(
        "Generated {} embeddings of dimension {}",
        embeddings.len(),
        provider.dimensions()
    );

    Ok(embeddings)
}

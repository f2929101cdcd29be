//! Local sentence embeddings with fastembed (ONNX runtime).
//!
//! The model is downloaded to the fastembed cache on first use. Inference is
//! CPU-bound and runs on the blocking thread pool.

use crate::embeddings::provider::check_dimensions;
use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use async_trait::async_trait;
use ::fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use medrag_core::{AppError, AppResult};
use std::sync::{Arc, Mutex};

/// all-MiniLM-L6-v2 (or another supported model) running in-process.
pub struct FastEmbedProvider {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimensions: usize,
    batch_size: usize,
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model_name", &self.model_name)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

fn resolve_model(name: &str) -> AppResult<EmbeddingModel> {
    match name.to_lowercase().as_str() {
        "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
            Ok(EmbeddingModel::AllMiniLML6V2)
        }
        "bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        other => Err(AppError::Config(format!(
            "Unsupported fastembed model: '{}'. Supported models: all-MiniLM-L6-v2, bge-small-en-v1.5",
            other
        ))),
    }
}

impl FastEmbedProvider {
    /// Load the model. May download it on first use.
    pub async fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let model = resolve_model(&config.model)?;

        tracing::info!("Loading local embedding model '{}'", config.model);

        let embedding = tokio::task::spawn_blocking(move || {
            TextEmbedding::try_new(InitOptions::new(model).with_show_download_progress(false))
        })
        .await
        .map_err(|e| AppError::Embedding(format!("Embedding model loader panicked: {}", e)))?
        .map_err(|e| AppError::Embedding(format!("Failed to load embedding model: {}", e)))?;

        Ok(Self {
            model: Arc::new(Mutex::new(embedding)),
            model_name: config.model.clone(),
            dimensions: config.dimensions,
            batch_size: config.batch_size,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    fn provider_name(&self) -> &str {
        "fastembed"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        let batch_size = self.batch_size;

        let embeddings = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| AppError::Embedding("Embedding model lock poisoned".to_string()))?;
            model
                .embed(texts, Some(batch_size))
                .map_err(|e| AppError::Embedding(format!("Local embedding failed: {}", e)))
        })
        .await
        .map_err(|e| AppError::Embedding(format!("Embedding task panicked: {}", e)))??;

        check_dimensions(&embeddings, self.dimensions)?;

        Ok(embeddings)
    }
}

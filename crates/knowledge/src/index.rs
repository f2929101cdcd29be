//! Vector index abstraction and the in-memory flat index.
//!
//! The index is built once from the corpus and is read-only afterwards, so it
//! can be shared across concurrent queries without locking.

use crate::embeddings::{embed_texts, EmbeddingProvider};
use crate::types::Chunk;
use medrag_core::{AppError, AppResult};

/// Number of chunks retrieved when the caller does not say otherwise.
pub const DEFAULT_TOP_K: usize = 4;

const DEFAULT_BUILD_BATCH_SIZE: usize = 32;

/// Trait for vector index backends.
pub trait VectorIndex: Send + Sync {
    /// Search for the `k` chunks most similar to `query_embedding`.
    ///
    /// Results are ordered by non-increasing cosine similarity; equal scores
    /// keep insertion order. `k == 0` returns nothing and `k` larger than the
    /// index returns every chunk.
    fn search(&self, query_embedding: &[f32], k: usize) -> AppResult<Vec<(Chunk, f32)>>;

    /// Number of indexed chunks.
    fn len(&self) -> usize;

    /// Whether the index holds no chunks.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality of stored vectors.
    fn dimensions(&self) -> usize;
}

/// Exact nearest-neighbour search over all stored vectors.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimensions: usize,
    entries: Vec<(Vec<f32>, Chunk)>,
}

impl FlatIndex {
    /// Embed every chunk with `provider` and store the vectors.
    ///
    /// Returns `Ok(None)` when there is nothing to index.
    pub async fn build(
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
    ) -> AppResult<Option<Self>> {
        Self::build_with_batch_size(chunks, provider, DEFAULT_BUILD_BATCH_SIZE).await
    }

    /// Same as [`FlatIndex::build`] with an explicit embedding batch size.
    pub async fn build_with_batch_size(
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
        batch_size: usize,
    ) -> AppResult<Option<Self>> {
        if chunks.is_empty() {
            tracing::info!("No chunks to index");
            return Ok(None);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embed_texts(provider, &texts, batch_size).await?;

        let index = Self::from_embeddings(provider.dimensions(), vectors.into_iter().zip(chunks))?;

        tracing::info!(
            "Built flat index with {} chunks ({} dimensions)",
            index.len(),
            index.dimensions
        );

        Ok(Some(index))
    }

    /// Build from precomputed vectors. Every vector must have `dimensions` entries.
    pub fn from_embeddings(
        dimensions: usize,
        entries: impl IntoIterator<Item = (Vec<f32>, Chunk)>,
    ) -> AppResult<Self> {
        let entries: Vec<(Vec<f32>, Chunk)> = entries.into_iter().collect();

        if let Some((vector, _)) = entries.iter().find(|(v, _)| v.len() != dimensions) {
            return Err(AppError::Index(format!(
                "Dimension mismatch: expected {}, got {}",
                dimensions,
                vector.len()
            )));
        }

        Ok(Self {
            dimensions,
            entries,
        })
    }
}

impl VectorIndex for FlatIndex {
    fn search(&self, query_embedding: &[f32], k: usize) -> AppResult<Vec<(Chunk, f32)>> {
        if query_embedding.len() != self.dimensions {
            return Err(AppError::Index(format!(
                "Query dimension mismatch: expected {}, got {}",
                self.dimensions,
                query_embedding.len()
            )));
        }

        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (vector, _))| (i, cosine_similarity(query_embedding, vector)))
            .collect();

        // Stable sort keeps insertion order for equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        tracing::debug!(
            "Retrieved {} chunks (requested top-{})",
            scored.len(),
            k
        );

        Ok(scored
            .into_iter()
            .map(|(i, score)| (self.entries[i].1.clone(), score))
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Cosine similarity; zero when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

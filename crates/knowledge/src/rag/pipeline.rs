//! Query pipeline: question in, grounded answer out.
//!
//! The index is built once when the service is constructed. A service built
//! from an empty corpus stays in [`RagState::NoIndex`] and answers every
//! question with [`EMPTY_KNOWLEDGE_BASE`].

use crate::chunker::{ChunkConfig, Chunker};
use crate::embeddings::config::DEFAULT_BATCH_SIZE;
use crate::embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
use crate::index::{FlatIndex, VectorIndex};
use crate::loader::load_documents;
use crate::rag::synthesizer::AnswerSynthesizer;
use crate::types::IndexStats;
use chrono::Utc;
use medrag_core::{AppConfig, AppResult};
use medrag_llm::LlmClient;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Returned for every question when nothing could be indexed.
pub const EMPTY_KNOWLEDGE_BASE: &str = "⚠️ Knowledge base is empty.";

/// Returned by [`RagService::rag_query_pipeline`] when answering fails.
pub const SERVICE_UNAVAILABLE: &str =
    "⚠️ The assistant is unavailable right now. Please try again later.";

/// Whether the service has an index to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RagState {
    NoIndex,
    IndexReady,
}

/// Retrieval-augmented question answering over the indexed corpus.
pub struct RagService {
    index: Option<Arc<dyn VectorIndex>>,
    embedder: Arc<dyn EmbeddingProvider>,
    synthesizer: AnswerSynthesizer,
    top_k: usize,
    stats: IndexStats,
}

impl RagService {
    /// Build the service with the embedding provider configured in
    /// `rag.embedding`.
    pub async fn from_config(config: &AppConfig, llm: Arc<dyn LlmClient>) -> AppResult<Self> {
        let embedding_config = EmbeddingConfig::from_settings(&config.rag.embedding)?;
        let embedder = create_provider(&embedding_config).await?;

        Self::build(config, embedder, llm).await
    }

    /// Load the corpus, chunk it and index it with `embedder`.
    ///
    /// Unreadable corpus files are skipped and reported in [`IndexStats`];
    /// they never fail the build. Embedding failures do.
    pub async fn build(
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmClient>,
    ) -> AppResult<Self> {
        let (index, stats) = build_index(config, embedder.as_ref()).await?;
        let synthesizer = AnswerSynthesizer::from_config(config, llm)?;

        Ok(Self {
            index: index.map(|index| Arc::new(index) as Arc<dyn VectorIndex>),
            embedder,
            synthesizer,
            top_k: config.rag.top_k,
            stats,
        })
    }

    /// Assemble a service from prebuilt parts.
    pub fn from_parts(
        index: Option<Arc<dyn VectorIndex>>,
        embedder: Arc<dyn EmbeddingProvider>,
        synthesizer: AnswerSynthesizer,
        top_k: usize,
    ) -> Self {
        let stats = IndexStats {
            documents: 0,
            skipped_files: Vec::new(),
            chunks: index.as_ref().map_or(0, |i| i.len()),
            dimensions: index.as_ref().map_or(0, |i| i.dimensions()),
            built_at: Utc::now(),
        };

        Self {
            index,
            embedder,
            synthesizer,
            top_k,
            stats,
        }
    }

    pub fn state(&self) -> RagState {
        match self.index {
            Some(_) => RagState::IndexReady,
            None => RagState::NoIndex,
        }
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer a question from the indexed corpus.
    ///
    /// Without an index this returns [`EMPTY_KNOWLEDGE_BASE`] and neither the
    /// embedder nor the language model is called.
    pub async fn answer(&self, question: &str) -> AppResult<String> {
        let Some(index) = &self.index else {
            tracing::info!("Question received but the knowledge base is empty");
            return Ok(EMPTY_KNOWLEDGE_BASE.to_string());
        };

        let query_embedding = self.embedder.embed(question).await?;
        let results = index.search(&query_embedding, self.top_k)?;

        tracing::debug!(
            "Retrieved {} chunks (best score: {:.3})",
            results.len(),
            results.first().map_or(0.0, |(_, score)| *score)
        );

        let context: Vec<String> = results.into_iter().map(|(chunk, _)| chunk.text).collect();

        self.synthesizer.synthesize(question, &context).await
    }

    /// Host-facing entry point. Never fails: errors are logged and replaced
    /// with [`SERVICE_UNAVAILABLE`].
    pub async fn rag_query_pipeline(&self, question: &str) -> String {
        match self.answer(question).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Failed to answer question: {}", e);
                SERVICE_UNAVAILABLE.to_string()
            }
        }
    }
}

/// Load, chunk and embed the configured corpus.
///
/// Returns `None` for the index when the corpus yields no chunks.
pub async fn build_index(
    config: &AppConfig,
    embedder: &dyn EmbeddingProvider,
) -> AppResult<(Option<FlatIndex>, IndexStats)> {
    config.validate_rag()?;

    let started = Instant::now();
    let corpus_dir = config.corpus_dir();

    tracing::info!("Building knowledge index from {:?}", corpus_dir);

    let report = load_documents(&corpus_dir);

    let chunker = Chunker::new(ChunkConfig::new(
        config.rag.chunk_size,
        config.rag.chunk_overlap,
    ))?;
    let chunks = chunker.split(&report.documents);
    let chunk_count = chunks.len();

    let batch_size = config
        .rag
        .embedding
        .batch_size
        .unwrap_or(DEFAULT_BATCH_SIZE);
    let index = FlatIndex::build_with_batch_size(chunks, embedder, batch_size).await?;

    let stats = IndexStats {
        documents: report.documents.len(),
        skipped_files: report.skipped,
        chunks: chunk_count,
        dimensions: index.as_ref().map_or(0, |i| i.dimensions()),
        built_at: Utc::now(),
    };

    match index {
        Some(_) => tracing::info!(
            "Knowledge index ready: {} documents, {} chunks in {:.2}s",
            stats.documents,
            stats.chunks,
            started.elapsed().as_secs_f64()
        ),
        None => tracing::warn!(
            "No content indexed from {:?}; every question will report an empty knowledge base",
            corpus_dir
        ),
    }

    Ok((index, stats))
}

//! Text chunking with configurable size and overlap.
//!
//! Splitting is semantic: the largest unit that fits wins, from line breaks
//! down to sentences, words, graphemes and finally characters.

use crate::types::{Chunk, SourceDocument};
use medrag_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use text_splitter::{ChunkConfig as SplitterConfig, TextSplitter};

/// Chunk size and overlap, measured in characters.
///
/// `chunk_overlap` is an upper bound. Adjacent chunks share the largest run
/// of whole semantic units (sentences, then words) that fits in it, so the
/// shared text is at most `chunk_overlap` characters and starts on a unit
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
        }
    }
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }
}

/// Splits documents into overlapping chunks.
pub struct Chunker {
    config: ChunkConfig,
    splitter: TextSplitter<text_splitter::Characters>,
}

impl std::fmt::Debug for Chunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunker").field("config", &self.config).finish()
    }
}

impl Chunker {
    /// Create a chunker. The overlap must be smaller than the chunk size.
    pub fn new(config: ChunkConfig) -> AppResult<Self> {
        if config.chunk_size == 0 {
            return Err(AppError::Config(
                "Chunk size must be greater than zero".to_string(),
            ));
        }

        let splitter_config = SplitterConfig::new(config.chunk_size)
            .with_overlap(config.chunk_overlap)
            .map_err(|e| {
                AppError::Config(format!(
                    "Invalid chunk overlap {} for chunk size {}: {}",
                    config.chunk_overlap, config.chunk_size, e
                ))
            })?;

        Ok(Self {
            config,
            splitter: TextSplitter::new(splitter_config),
        })
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split every document, preserving document order.
    pub fn split(&self, documents: &[SourceDocument]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|document| self.split_document(document))
            .collect();

        tracing::debug!(
            "Chunked {} documents into {} chunks (size: {}, overlap: {})",
            documents.len(),
            chunks.len(),
            self.config.chunk_size,
            self.config.chunk_overlap
        );

        chunks
    }

    /// Split a single document. Whitespace-only windows are dropped.
    pub fn split_document(&self, document: &SourceDocument) -> Vec<Chunk> {
        self.splitter
            .chunk_indices(&document.text)
            .filter(|(_, text)| !text.trim().is_empty())
            .enumerate()
            .map(|(position, (offset, text))| Chunk {
                text: text.trim().to_string(),
                parent_source: document.source_path.clone(),
                position,
                byte_range: offset..offset + text.len(),
            })
            .collect()
    }
}

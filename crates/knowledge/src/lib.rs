//! Knowledge base for grounded question answering.
//!
//! Loads a local corpus of CSV, PDF and text files, splits it into
//! overlapping chunks, embeds them into an in-memory vector index and answers
//! questions through [`RagService`].

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod loader;
pub mod rag;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::{ChunkConfig, Chunker};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::{FlatIndex, VectorIndex, DEFAULT_TOP_K};
pub use loader::load_documents;
pub use rag::{
    build_index, AnswerSynthesizer, RagService, RagState, EMPTY_KNOWLEDGE_BASE, SERVICE_UNAVAILABLE,
};
pub use types::{Chunk, IndexStats, LoadReport, SkippedFile, SourceDocument, SourceType};

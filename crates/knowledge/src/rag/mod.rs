//! Retrieval-augmented answering.
//!
//! Retrieves relevant chunks and generates grounded answers via the LLM.

pub mod grounding;
pub mod pipeline;
pub mod synthesizer;

pub use pipeline::{build_index, RagService, RagState, EMPTY_KNOWLEDGE_BASE, SERVICE_UNAVAILABLE};
pub use synthesizer::AnswerSynthesizer;

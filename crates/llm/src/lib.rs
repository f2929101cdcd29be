//! LLM integration crate for medrag.
//!
//! Provides a provider-agnostic abstraction for the text-generation backend
//! used to synthesize answers. It supports multiple providers through a
//! unified trait-based interface.
//!
//! # Providers
//! - **Groq** / **OpenAI**: OpenAI-compatible chat completions (default: Groq)
//! - **Ollama**: Local LLM runtime
//!
//! # Example
//! ```no_run
//! use medrag_llm::{create_client, LlmRequest};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client("groq", None, Some("gsk-..."), Duration::from_secs(60))?;
//! let request = LlmRequest::new("Hello, world!", "llama-3.1-8b-instant").with_temperature(0.2);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiCompatibleClient};
pub use types::ProviderType;

//! medrag core library
//!
//! This crate provides the foundational utilities shared by every medrag crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, EmbeddingSettings, RagSettings};
pub use error::{AppError, AppResult};

//! Prompt system for medrag.
//!
//! This crate provides structured prompt management with:
//! - A built-in grounded answer prompt
//! - YAML-based prompt overrides in the workspace
//! - Handlebars template rendering

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use builtin::ANSWER_PROMPT_ID;
pub use loader::{list_prompts, load_prompt, resolve_prompt};
pub use types::{BuiltPrompt, PromptDefinition};

//! Command handlers for the medrag CLI.

pub mod ask;
pub mod index;
pub mod prompts;

pub use ask::AskCommand;
pub use index::IndexCommand;
pub use prompts::PromptsCommand;

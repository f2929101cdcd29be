//! Prompts command handler.

use clap::Args;
use medrag_core::{config::AppConfig, AppError, AppResult};
use medrag_prompt::list_prompts;

/// List available prompt ids
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing prompts command");

        let prompt_ids = list_prompts(&config.workspace)?;
        tracing::debug!("Found {} prompts", prompt_ids.len());

        if self.json {
            let json = serde_json::to_string_pretty(&prompt_ids)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            for id in prompt_ids {
                println!("{}", id);
            }
        }

        Ok(())
    }
}

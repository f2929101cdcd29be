//! Index command handler.
//!
//! Builds the knowledge index the same way `ask` does and reports what went
//! into it. No language model is contacted.

use crate::display::format_stats;
use clap::Args;
use medrag_core::{config::AppConfig, AppError, AppResult};
use medrag_knowledge::{build_index, create_provider, EmbeddingConfig};

/// Build the knowledge index and report what was indexed
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command");

        let embedding_config = EmbeddingConfig::from_settings(&config.rag.embedding)?;
        let embedder = create_provider(&embedding_config).await?;

        let (_, stats) = build_index(config, embedder.as_ref()).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&stats)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            let embedder_name = format!("{}/{}", embedder.provider_name(), embedder.model_name());
            print!("{}", format_stats(&stats, &config.corpus_dir(), &embedder_name));
        }

        Ok(())
    }
}

//! medrag CLI
//!
//! Ask questions against a local healthcare corpus, inspect the index it
//! builds and list the prompts available in the workspace.

mod commands;
mod display;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IndexCommand, PromptsCommand};
use medrag_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// medrag - grounded answers from a local healthcare corpus
#[derive(Parser, Debug)]
#[command(name = "medrag")]
#[command(about = "Grounded question answering over a local healthcare corpus", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "MEDRAG_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "MEDRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Corpus directory, relative to the workspace
    #[arg(long, global = true, env = "MEDRAG_CORPUS")]
    corpus: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (groq, openai, ollama)
    #[arg(short, long, global = true, env = "MEDRAG_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "MEDRAG_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question about the corpus
    Ask(AskCommand),

    /// Build the knowledge index and report what was indexed
    Index(IndexCommand),

    /// List available prompt ids
    Prompts(PromptsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Workspace and config file decide which YAML is read, so they apply at load time
    let config = AppConfig::load_with(cli.workspace.clone(), cli.config.clone())?;

    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.corpus,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("medrag starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Corpus: {:?}", config.corpus_dir());
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Index(_) => "index",
        Commands::Prompts(_) => "prompts",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Index(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

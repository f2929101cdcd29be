//! Ask command handler.
//!
//! Builds the knowledge index, answers one question from it and prints the
//! answer as a bullet list.

use crate::display::format_answer;
use clap::Args;
use medrag_core::{config::AppConfig, AppError, AppResult};
use medrag_knowledge::{
    build_index, create_provider, AnswerSynthesizer, EmbeddingConfig, RagService, VectorIndex,
    EMPTY_KNOWLEDGE_BASE, SERVICE_UNAVAILABLE,
};
use medrag_llm::{create_client, LlmClient};
use std::sync::Arc;
use std::time::Duration;

/// Shortest question accepted, in characters.
const MIN_QUESTION_CHARS: usize = 5;

/// Ask a question about the corpus
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = match validate_question(&self.question) {
            Ok(question) => question,
            Err(e) => {
                eprintln!("❌ Please ask a detailed question");
                return Err(e);
            }
        };

        let answer = answer_question(config, question, connect_llm).await;

        if self.json {
            let output = serde_json::json!({
                "question": question,
                "answer": answer,
            });

            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("✅ Answer");
            println!("{}", format_answer(&answer));
        }

        Ok(())
    }
}

/// Answer `question` from the configured corpus.
///
/// The index is built first and the language model client is only created
/// when there is an index to query, so an empty corpus never needs
/// credentials. Every failure ends in [`SERVICE_UNAVAILABLE`].
async fn answer_question<F>(config: &AppConfig, question: &str, connect: F) -> String
where
    F: FnOnce(&AppConfig) -> AppResult<Arc<dyn LlmClient>>,
{
    match try_answer(config, question, connect).await {
        Ok(answer) => answer,
        Err(e) => {
            tracing::error!("Failed to answer question: {}", e);
            SERVICE_UNAVAILABLE.to_string()
        }
    }
}

async fn try_answer<F>(config: &AppConfig, question: &str, connect: F) -> AppResult<String>
where
    F: FnOnce(&AppConfig) -> AppResult<Arc<dyn LlmClient>>,
{
    let embedding_config = EmbeddingConfig::from_settings(&config.rag.embedding)?;
    let embedder = create_provider(&embedding_config).await?;

    let (index, _) = build_index(config, embedder.as_ref()).await?;
    let Some(index) = index else {
        tracing::info!("Question received but the knowledge base is empty");
        return Ok(EMPTY_KNOWLEDGE_BASE.to_string());
    };

    let llm = connect(config)?;
    let synthesizer = AnswerSynthesizer::from_config(config, llm)?;
    let service = RagService::from_parts(
        Some(Arc::new(index) as Arc<dyn VectorIndex>),
        embedder,
        synthesizer,
        config.rag.top_k,
    );

    Ok(service.rag_query_pipeline(question).await)
}

/// Validate provider settings and credentials, then build the client.
fn connect_llm(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    config.validate()?;

    create_client(
        &config.provider,
        config.resolve_endpoint(&config.provider).as_deref(),
        config.resolve_api_key(&config.provider).as_deref(),
        Duration::from_secs(config.rag.request_timeout_secs),
    )
}

/// Trimmed question, or a config error when it is too short to answer.
fn validate_question(question: &str) -> AppResult<&str> {
    let question = question.trim();

    if question.chars().count() < MIN_QUESTION_CHARS {
        return Err(AppError::Config(format!(
            "Question must be at least {} characters",
            MIN_QUESTION_CHARS
        )));
    }

    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrag_llm::{LlmRequest, LlmResponse};
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Replies with a fixed bullet.
    struct FixedLlm;

    #[async_trait::async_trait]
    impl LlmClient for FixedLlm {
        fn provider_name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            Ok(LlmResponse {
                content: "• Delivery takes 24-48 hours".to_string(),
                model: request.model.clone(),
                usage: Default::default(),
            })
        }
    }

    fn offline_config(workspace: &Path) -> AppConfig {
        let mut config = AppConfig {
            workspace: workspace.to_path_buf(),
            ..Default::default()
        };
        config.rag.embedding.provider = Some("trigram".to_string());
        config
    }

    fn write_faq(workspace: &Path) {
        let data = workspace.join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(
            data.join("faq.csv"),
            "question,answer\nMedicine delivery time?,24-48 hours from order confirmation.\n",
        )
        .unwrap();
    }

    fn no_credentials(_: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
        Err(AppError::Config(
            "API key not found in environment variable: GROQ_API_KEY".to_string(),
        ))
    }

    #[tokio::test]
    async fn test_empty_corpus_answers_without_credentials() {
        let ws = TempDir::new().unwrap();
        fs::create_dir_all(ws.path().join("data")).unwrap();
        let connects = AtomicUsize::new(0);

        let answer = answer_question(&offline_config(ws.path()), "What is the delivery time?", |c| {
            connects.fetch_add(1, Ordering::SeqCst);
            no_credentials(c)
        })
        .await;

        assert_eq!(answer, EMPTY_KNOWLEDGE_BASE);
        assert_eq!(connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_give_generic_message() {
        let ws = TempDir::new().unwrap();
        write_faq(ws.path());

        let answer =
            answer_question(&offline_config(ws.path()), "What is the delivery time?", no_credentials)
                .await;

        assert_eq!(answer, SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_answers_from_indexed_corpus() {
        let ws = TempDir::new().unwrap();
        write_faq(ws.path());

        let answer = answer_question(&offline_config(ws.path()), "What is the delivery time?", |_| {
            Ok(Arc::new(FixedLlm) as Arc<dyn LlmClient>)
        })
        .await;

        assert_eq!(answer, "• Delivery takes 24-48 hours");
    }

    #[tokio::test]
    async fn test_invalid_settings_give_generic_message() {
        let ws = TempDir::new().unwrap();
        write_faq(ws.path());
        let mut config = offline_config(ws.path());
        config.rag.chunk_overlap = config.rag.chunk_size;

        let answer = answer_question(&config, "What is the delivery time?", no_credentials).await;
        assert_eq!(answer, SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_unknown_provider_fails_to_connect() {
        let config = AppConfig {
            provider: "word2vec".to_string(),
            ..Default::default()
        };
        assert!(matches!(connect_llm(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_short_question_rejected() {
        assert!(matches!(validate_question("hi?"), Err(AppError::Config(_))));
        assert!(matches!(validate_question("   abc   "), Err(AppError::Config(_))));
    }

    #[test]
    fn test_question_is_trimmed() {
        assert_eq!(
            validate_question("  Visiting hours?\n").unwrap(),
            "Visiting hours?"
        );
    }

    #[test]
    fn test_length_counts_characters() {
        // Five characters, more than five bytes
        assert_eq!(validate_question("ñandú").unwrap(), "ñandú");
    }
}

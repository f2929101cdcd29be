//! Grounded answer synthesis.
//!
//! Renders the answer prompt from the question and retrieved chunks and asks
//! the language model for a bullet-point answer.

use crate::rag::grounding;
use medrag_core::{AppConfig, AppError, AppResult};
use medrag_llm::{LlmClient, LlmRequest};
use medrag_prompt::{build_prompt, resolve_prompt, PromptDefinition, ANSWER_PROMPT_ID};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Temperature used for answers unless configured otherwise.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Separator placed between retrieved chunks in the prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Produces answers from a question and its retrieved context.
pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmClient>,
    prompt: PromptDefinition,
    model: String,
    temperature: f32,
    timeout: Duration,
    grounding_check: bool,
}

impl AnswerSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, prompt: PromptDefinition, model: impl Into<String>) -> Self {
        Self {
            llm,
            prompt,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            grounding_check: false,
        }
    }

    /// Build from application config, resolving the answer prompt from the
    /// workspace (falling back to the built-in one).
    pub fn from_config(config: &AppConfig, llm: Arc<dyn LlmClient>) -> AppResult<Self> {
        let prompt = resolve_prompt(&config.workspace, ANSWER_PROMPT_ID)?;

        Ok(Self::new(llm, prompt, config.model.clone())
            .with_temperature(config.rag.temperature)
            .with_timeout(Duration::from_secs(config.rag.request_timeout_secs))
            .with_grounding_check(config.rag.grounding_check))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_grounding_check(mut self, enabled: bool) -> Self {
        self.grounding_check = enabled;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate an answer from `question` and the retrieved `context_chunks`
    /// (in retrieval order). The model output is returned trimmed.
    pub async fn synthesize(&self, question: &str, context_chunks: &[String]) -> AppResult<String> {
        let context = context_chunks.join(CONTEXT_SEPARATOR);

        let mut variables = HashMap::new();
        variables.insert("context".to_string(), context.clone());
        variables.insert("question".to_string(), question.to_string());

        let built = build_prompt(&self.prompt, variables)?;

        let mut request =
            LlmRequest::new(built.user, self.model.clone()).with_temperature(self.temperature);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        tracing::debug!(
            "Synthesizing answer with provider '{}' (prompt: {}, model: {}, {} context chunks)",
            self.llm.provider_name(),
            built.prompt_id,
            self.model,
            context_chunks.len()
        );

        let response = tokio::time::timeout(self.timeout, self.llm.complete(&request))
            .await
            .map_err(|_| {
                AppError::Llm(format!(
                    "Language model did not respond within {}s",
                    self.timeout.as_secs()
                ))
            })??;

        let answer = response.content.trim().to_string();

        if self.grounding_check {
            grounding::check(&answer, &context);
        }

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use medrag_llm::LlmResponse;
    use medrag_prompt::builtin::answer_prompt;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLlm {
        reply: String,
        delay: Option<Duration>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        fn provider_name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(LlmResponse {
                content: self.reply.clone(),
                model: request.model.clone(),
                usage: Default::default(),
            })
        }
    }

    fn llm(reply: &str) -> Arc<RecordingLlm> {
        Arc::new(RecordingLlm {
            reply: reply.to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_synthesize_renders_context_and_question() {
        let client = llm("  • Delivery takes 24 to 48 hours\n");
        let synthesizer = AnswerSynthesizer::new(client.clone(), answer_prompt(), "test-model");

        let answer = synthesizer
            .synthesize(
                "How long does delivery take?",
                &["Chunk one.".to_string(), "Chunk two.".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(answer, "• Delivery takes 24 to 48 hours");

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.model, "test-model");
        assert_eq!(request.temperature, Some(0.2));
        assert!(request.prompt.contains("Context:\nChunk one.\n\nChunk two."));
        assert!(request.prompt.contains("Question:\nHow long does delivery take?"));
        assert!(request.prompt.contains("ONLY using the context"));
    }

    #[tokio::test]
    async fn test_synthesize_with_empty_context() {
        let client = llm("• No information available");
        let synthesizer = AnswerSynthesizer::new(client.clone(), answer_prompt(), "m");

        synthesizer.synthesize("Anything?", &[]).await.unwrap();

        let requests = client.requests.lock().unwrap();
        assert!(requests[0].prompt.contains("Context:\n\n\nQuestion:"));
    }

    #[tokio::test]
    async fn test_synthesize_timeout() {
        let client = Arc::new(RecordingLlm {
            reply: "late".to_string(),
            delay: Some(Duration::from_millis(500)),
            ..Default::default()
        });
        let synthesizer = AnswerSynthesizer::new(client, answer_prompt(), "m")
            .with_timeout(Duration::from_millis(20));

        let err = synthesizer.synthesize("Too slow?", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_custom_temperature_and_system() {
        let client = llm("ok");
        let mut prompt = answer_prompt();
        prompt.system = Some("You answer for the {{question}} desk.".to_string());

        let synthesizer =
            AnswerSynthesizer::new(client.clone(), prompt, "m").with_temperature(0.7);
        synthesizer.synthesize("billing", &[]).await.unwrap();

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests[0].temperature, Some(0.7));
        assert_eq!(requests[0].system.as_deref(), Some("You answer for the billing desk."));
    }

    #[tokio::test]
    async fn test_grounding_check_does_not_alter_answer() {
        let client = llm("Completely unrelated astronomy facts");
        let synthesizer = AnswerSynthesizer::new(client, answer_prompt(), "m")
            .with_grounding_check(true);

        let answer = synthesizer
            .synthesize("Delivery?", &["Delivery takes two days.".to_string()])
            .await
            .unwrap();
        assert_eq!(answer, "Completely unrelated astronomy facts");
    }
}

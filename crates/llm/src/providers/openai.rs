//! OpenAI-compatible chat completions provider.
//!
//! Groq and OpenAI both expose `POST {base}/chat/completions` with bearer
//! authentication; one client serves both.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use medrag_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Client for OpenAI-compatible chat completion APIs.
pub struct OpenAiCompatibleClient {
    /// Provider label reported in logs ("groq", "openai")
    provider: String,

    /// API root, e.g. https://api.groq.com/openai/v1
    base_url: String,

    api_key: String,

    client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    /// Create a client. The timeout bounds the whole request, including the body.
    pub fn new(
        provider: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let provider = provider.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::Llm(format!("Failed to create HTTP client for {}: {}", provider, e))
            })?;

        Ok(Self {
            provider,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn to_chat_request(&self, request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);

        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }

    fn convert_response(&self, response: ChatResponse) -> AppResult<LlmResponse> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::Llm(format!("{} returned a response without content", self.provider))
            })?;

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: response.model,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiCompatibleClient {
    fn provider_name(&self) -> &str {
        &self.provider
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(provider = %self.provider, model = %request.model, "Sending chat completion request");
        tracing::debug!("Request: {:?}", request);

        let body = self.to_chat_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::Llm(format!("Failed to send request to {}: {}", self.provider, e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "{} API error ({}): {}",
                self.provider, status, error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            AppError::Llm(format!("Failed to parse {} response: {}", self.provider, e))
        })?;

        tracing::info!(provider = %self.provider, "Received chat completion");
        tracing::debug!("Response: {:?}", chat_response);

        self.convert_response(chat_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "llama-3.1-8b-instant",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 210, "completion_tokens": 18, "total_tokens": 228 }
        })
    }

    #[test]
    fn test_chat_request_places_system_first() {
        let client = OpenAiCompatibleClient::new(
            "groq",
            "https://api.groq.com/openai/v1/",
            "key",
            Duration::from_secs(5),
        )
        .unwrap();
        let request = LlmRequest::new("question", "llama-3.1-8b-instant").with_system("rules");

        let chat = client.to_chat_request(&request);
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[1].role, "user");
        assert_eq!(client.base_url, "https://api.groq.com/openai/v1");
    }

    #[tokio::test]
    async fn test_complete_sends_bearer_and_parses_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama-3.1-8b-instant",
                "messages": [{ "role": "user", "content": "How long does delivery take?" }]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("- 24 to 48 hours")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OpenAiCompatibleClient::new("groq", server.uri(), "gsk-test", Duration::from_secs(5))
                .unwrap();
        let response = client
            .complete(
                &LlmRequest::new("How long does delivery take?", "llama-3.1-8b-instant")
                    .with_temperature(0.2),
            )
            .await
            .unwrap();

        assert_eq!(response.content, "- 24 to 48 hours");
        assert_eq!(response.usage.total_tokens, 228);
    }

    #[tokio::test]
    async fn test_complete_reports_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_api_key"}"#),
            )
            .mount(&server)
            .await;

        let client =
            OpenAiCompatibleClient::new("groq", server.uri(), "bad", Duration::from_secs(5))
                .unwrap();
        let err = client
            .complete(&LlmRequest::new("q", "llama-3.1-8b-instant"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Llm(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama-3.1-8b-instant",
                "choices": []
            })))
            .mount(&server)
            .await;

        let client =
            OpenAiCompatibleClient::new("groq", server.uri(), "k", Duration::from_secs(5)).unwrap();
        let result = client
            .complete(&LlmRequest::new("q", "llama-3.1-8b-instant"))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_complete_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("late"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client =
            OpenAiCompatibleClient::new("groq", server.uri(), "k", Duration::from_millis(200))
                .unwrap();
        let result = client
            .complete(&LlmRequest::new("q", "llama-3.1-8b-instant"))
            .await;

        assert!(matches!(result, Err(AppError::Llm(_))));
    }
}

//! LLM provider factory.
//!
//! Builds an LLM client from a provider name, resolving the endpoint and
//! checking that key-requiring providers received a credential.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiCompatibleClient};
use crate::types::ProviderType;
use medrag_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("groq", "openai", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required for groq and openai)
/// * `timeout` - Per-request timeout applied by the HTTP client
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    let base_url = endpoint.unwrap_or_else(|| provider_type.default_base_url());

    tracing::debug!(provider = %provider_type, base_url, "Creating LLM client");

    match provider_type {
        ProviderType::Ollama => Ok(Arc::new(OllamaClient::with_base_url(base_url, timeout)?)),
        ProviderType::Groq | ProviderType::OpenAI => {
            let key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                AppError::Config(format!("{} provider requires API key", provider_type))
            })?;
            Ok(Arc::new(OpenAiCompatibleClient::new(
                provider_type.as_str(),
                base_url,
                key,
                timeout,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None, TIMEOUT).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None, TIMEOUT);
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_groq_client() {
        let client = create_client("groq", None, Some("gsk-test"), TIMEOUT).unwrap();
        assert_eq!(client.provider_name(), "groq");
    }

    #[test]
    fn test_groq_requires_api_key() {
        match create_client("groq", None, None, TIMEOUT) {
            Err(err) => assert!(err.to_string().contains("groq provider requires API key")),
            Ok(_) => panic!("Expected error for Groq without API key"),
        }
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        assert!(create_client("openai", None, Some("  "), TIMEOUT).is_err());
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None, TIMEOUT) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}

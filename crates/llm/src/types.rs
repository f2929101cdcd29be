//! Provider identification.

use std::fmt;

/// Groq's OpenAI-compatible API root.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// OpenAI API root.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Local Ollama daemon.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Groq,
    OpenAI,
    Ollama,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "groq" => Some(Self::Groq),
            "openai" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }

    /// Base URL used when no endpoint is configured.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Groq => GROQ_BASE_URL,
            Self::OpenAI => OPENAI_BASE_URL,
            Self::Ollama => OLLAMA_BASE_URL,
        }
    }

    /// Whether the provider refuses unauthenticated requests.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Groq | Self::OpenAI)
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

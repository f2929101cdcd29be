//! Configuration management for medrag.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.medrag/config.yaml)
//!
//! The configuration is workspace-centric: the corpus directory and prompt
//! overrides are resolved relative to the workspace root.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the LLM factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 3] = ["groq", "openai", "ollama"];

/// Model used for a provider when neither the config file nor a flag names one.
pub fn default_model(provider: &str) -> Option<&'static str> {
    match provider {
        "groq" => Some("llama-3.1-8b-instant"),
        "openai" => Some("gpt-4o-mini"),
        "ollama" => Some("llama3.1"),
        _ => None,
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .medrag/ and the corpus)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("groq", "openai", "ollama")
    pub provider: String,

    /// Model identifier for answer synthesis
    pub model: String,

    /// Explicit API key (MEDRAG_API_KEY), takes precedence over provider env vars
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Retrieval and synthesis settings
    pub rag: RagSettings,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    /// Any OpenAI-compatible chat completions endpoint (Groq, OpenAI)
    OpenAiCompatible {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAiCompatible { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OpenAiCompatible { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint),
        }
    }
}

/// Retrieval-augmented generation settings (`rag:` section).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RagSettings {
    /// Corpus directory, relative to the workspace unless absolute
    #[serde(default = "default_corpus_dir")]
    pub corpus_dir: PathBuf,

    /// Target chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between adjacent chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Sampling temperature for answer synthesis
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on a single language-model call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log a warning when an answer shares few words with its context
    #[serde(default)]
    pub grounding_check: bool,

    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

fn default_corpus_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_chunk_size() -> usize {
    800
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_top_k() -> usize {
    4
}

fn default_temperature() -> f32 {
    0.2
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            corpus_dir: default_corpus_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            grounding_check: false,
            embedding: EmbeddingSettings::default(),
        }
    }
}

/// Embedding backend settings (`rag.embedding:` section).
///
/// Unset fields are resolved by the knowledge crate against the providers
/// compiled into the binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingSettings {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub dimensions: Option<usize>,
    pub batch_size: Option<usize>,
    /// Base URL for HTTP embedding providers
    pub endpoint: Option<String>,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    rag: Option<RagSettings>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "groq".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            rag: RagSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `MEDRAG_WORKSPACE`: Override workspace path
    /// - `MEDRAG_CONFIG`: Path to config file
    /// - `MEDRAG_PROVIDER`: LLM provider
    /// - `MEDRAG_MODEL`: Model identifier
    /// - `MEDRAG_CORPUS`: Corpus directory
    /// - `MEDRAG_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration, with explicit workspace and config file taking
    /// precedence over `MEDRAG_WORKSPACE` / `MEDRAG_CONFIG`.
    ///
    /// # Example
    /// ```no_run
    /// use medrag_core::config::AppConfig;
    ///
    /// let config = AppConfig::load_with(Some(".".into()), None).expect("Failed to load config");
    /// println!("Corpus: {:?}", config.corpus_dir());
    /// ```
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env_path("MEDRAG_WORKSPACE")) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env_path("MEDRAG_CONFIG"));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.medrag_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("MEDRAG_PROVIDER") {
            config.switch_provider(provider);
        }

        if let Ok(model) = std::env::var("MEDRAG_MODEL") {
            config.model = model;
        }

        if let Some(corpus) = env_path("MEDRAG_CORPUS") {
            config.rag.corpus_dir = corpus;
        }

        if let Ok(key) = std::env::var("MEDRAG_API_KEY") {
            config.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(rag) = config_file.rag {
            result.rag = rag;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and YAML.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        corpus: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(corpus) = corpus {
            self.rag.corpus_dir = corpus;
        }

        if let Some(provider) = provider {
            self.switch_provider(provider);
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Make `provider` active. A different provider also gets its own model:
    /// the one from its `llm.providers` entry, else its built-in default.
    fn switch_provider(&mut self, provider: String) {
        if provider == self.provider {
            return;
        }

        let model = self
            .get_provider_config(&provider)
            .map(|pc| pc.model().to_string())
            .or_else(|| default_model(&provider).map(str::to_string));

        if let Some(model) = model {
            self.model = model;
        }
        self.provider = provider;
    }

    /// Get the path to the .medrag directory.
    pub fn medrag_dir(&self) -> PathBuf {
        self.workspace.join(".medrag")
    }

    /// Resolve the corpus directory against the workspace.
    pub fn corpus_dir(&self) -> PathBuf {
        self.workspace.join(&self.rag.corpus_dir)
    }

    /// Get the configuration block for a provider, if one was declared.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Endpoint override for a provider, if configured.
    pub fn resolve_endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint())
            .map(str::to_string)
    }

    /// Name of the environment variable holding the provider's API key.
    pub fn api_key_env(&self, provider: &str) -> Option<String> {
        if let Some(ProviderConfig::OpenAiCompatible { api_key_env, .. }) =
            self.get_provider_config(provider)
        {
            return Some(api_key_env.clone());
        }

        match provider {
            "groq" => Some("GROQ_API_KEY".to_string()),
            "openai" => Some("OPENAI_API_KEY".to_string()),
            _ => None,
        }
    }

    /// Resolve API key from the explicit override or the provider's environment variable.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        self.api_key_env(provider)
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate configuration for the active provider and the RAG settings.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if let Some(env_var) = self.api_key_env(provider) {
            if self.resolve_api_key(provider).is_none() {
                return Err(AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    env_var
                )));
            }
        }

        self.validate_rag()
    }

    /// Validate only the retrieval settings (no credential checks).
    pub fn validate_rag(&self) -> AppResult<()> {
        let rag = &self.rag;

        if rag.chunk_size == 0 {
            return Err(AppError::Config("rag.chunkSize must be positive".to_string()));
        }

        if rag.chunk_overlap >= rag.chunk_size {
            return Err(AppError::Config(format!(
                "rag.chunkOverlap ({}) must be smaller than rag.chunkSize ({})",
                rag.chunk_overlap, rag.chunk_size
            )));
        }

        if rag.top_k == 0 {
            return Err(AppError::Config("rag.topK must be at least 1".to_string()));
        }

        if !(0.0..=2.0).contains(&rag.temperature) {
            return Err(AppError::Config(format!(
                "rag.temperature must be within 0.0-2.0, got {}",
                rag.temperature
            )));
        }

        if rag.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "rag.requestTimeoutSecs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var).ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "groq");
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.rag.chunk_size, 800);
        assert_eq!(config.rag.chunk_overlap, 100);
        assert_eq!(config.rag.top_k, 4);
        assert!((config.rag.temperature - 0.2).abs() < f32::EPSILON);
        assert!(!config.verbose);
    }

    #[test]
    fn test_medrag_dir() {
        let config = AppConfig::default();
        assert!(config.medrag_dir().ends_with(".medrag"));
    }

    #[test]
    fn test_corpus_dir_relative_and_absolute() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/srv/clinic");
        assert_eq!(config.corpus_dir(), PathBuf::from("/srv/clinic/data"));

        config.rag.corpus_dir = PathBuf::from("/mnt/corpus");
        assert_eq!(config.corpus_dir(), PathBuf::from("/mnt/corpus"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some(PathBuf::from("kb")),
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert_eq!(overridden.rag.corpus_dir, PathBuf::from("kb"));
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_provider_override_switches_model() {
        let overridden = AppConfig::default().with_overrides(
            None,
            None,
            None,
            Some("ollama".to_string()),
            None,
            None,
            false,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.1");
    }

    #[test]
    fn test_provider_override_uses_configured_model() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  activeProvider: groq
  providers:
    groq:
      apiKeyEnv: "GROQ_API_KEY"
      model: "llama-3.3-70b-versatile"
    ollama:
      endpoint: "http://gpu-box:11434"
      model: "mistral"
"#,
        )
        .unwrap();

        let base = AppConfig {
            workspace: temp.path().to_path_buf(),
            ..AppConfig::default()
        };
        let merged = base.merge_yaml(&path).unwrap();
        assert_eq!(merged.model, "llama-3.3-70b-versatile");

        let same = merged.clone().with_overrides(
            None,
            None,
            None,
            Some("groq".to_string()),
            None,
            None,
            false,
            false,
        );
        assert_eq!(same.model, "llama-3.3-70b-versatile");

        let switched = merged.with_overrides(
            None,
            None,
            None,
            Some("ollama".to_string()),
            None,
            None,
            false,
            false,
        );
        assert_eq!(switched.model, "mistral");
    }

    #[test]
    fn test_unknown_provider_keeps_model() {
        let overridden = AppConfig::default().with_overrides(
            None,
            None,
            None,
            Some("acme".to_string()),
            None,
            None,
            false,
            false,
        );

        assert_eq!(overridden.provider, "acme");
        assert_eq!(overridden.model, "llama-3.1-8b-instant");
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama_needs_no_key() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_explicit_key_satisfies_groq() {
        let mut config = AppConfig::default();
        config.api_key = Some("gsk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rag_rejects_overlap_not_smaller_than_size() {
        let mut config = AppConfig::default();
        config.rag.chunk_overlap = config.rag.chunk_size;
        let err = config.validate_rag().unwrap_err();
        assert!(err.to_string().contains("chunkOverlap"));
    }

    #[test]
    fn test_validate_rag_rejects_zero_top_k() {
        let mut config = AppConfig::default();
        config.rag.top_k = 0;
        assert!(config.validate_rag().is_err());
    }

    #[test]
    fn test_merge_yaml_sections() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  activeProvider: ollama
  providers:
    ollama:
      endpoint: "http://localhost:11434"
      model: "llama3.2"
    groq:
      apiKeyEnv: "MY_GROQ_KEY"
      model: "llama-3.1-8b-instant"
rag:
  corpusDir: "knowledge"
  topK: 6
  groundingCheck: true
  embedding:
    provider: trigram
    dimensions: 256
logging:
  level: warn
  color: false
"#,
        )
        .unwrap();

        let base = AppConfig {
            workspace: temp.path().to_path_buf(),
            ..AppConfig::default()
        };
        let merged = base.merge_yaml(&path).unwrap();

        assert_eq!(merged.provider, "ollama");
        assert_eq!(merged.model, "llama3.2");
        assert_eq!(merged.rag.corpus_dir, PathBuf::from("knowledge"));
        assert_eq!(merged.rag.top_k, 6);
        assert_eq!(merged.rag.chunk_size, 800);
        assert!(merged.rag.grounding_check);
        assert_eq!(merged.rag.embedding.provider.as_deref(), Some("trigram"));
        assert_eq!(merged.rag.embedding.dimensions, Some(256));
        assert_eq!(merged.log_level, Some("warn".to_string()));
        assert!(merged.no_color);
        assert_eq!(
            merged.resolve_endpoint("ollama").as_deref(),
            Some("http://localhost:11434")
        );
        assert_eq!(merged.api_key_env("groq").as_deref(), Some("MY_GROQ_KEY"));
    }

    #[test]
    fn test_load_with_missing_workspace() {
        let result = AppConfig::load_with(Some(PathBuf::from("/definitely/not/here")), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_with_missing_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_with(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("nope.yaml")),
        );
        assert!(result.is_err());
    }
}

//! Configuration management for Support Bot.
//!
//! Configuration is layered, later layers winning:
//! - Built-in defaults
//! - Config file (`.supportbot/config.yaml` in the workspace, or an explicit path)
//! - Environment variables (a `.env` file in the working directory is loaded first)
//! - Command-line flags
//!
//! The resulting [`AppConfig`] is constructed once and passed explicitly to
//! every component; nothing reads process-wide state after startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Generation providers understood by the LLM factory.
pub const LLM_PROVIDERS: [&str; 2] = ["gemini", "ollama"];

/// Embedding providers understood by the embedding factory.
pub const EMBEDDING_PROVIDERS: [&str; 3] = ["gemini", "ollama", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .supportbot/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Answer generation settings
    pub llm: LlmSettings,

    /// Embedding model settings
    pub embedding: EmbeddingSettings,

    /// Chunking, index location and query settings
    pub retrieval: RetrievalSettings,

    /// HTTP shell settings
    pub server: ServerSettings,

    /// Credential for hosted providers (`SUPPORTBOT_API_KEY` or `API_KEY`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Optional shared secret guarding the HTTP endpoint
    #[serde(skip_serializing)]
    pub demo_password: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Settings for the answer-generating language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// "gemini" or "ollama"
    pub provider: String,

    /// Model identifier passed to the provider
    pub model: String,

    /// Custom endpoint (provider default when unset)
    pub endpoint: Option<String>,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-flash-latest".to_string(),
            endpoint: None,
            temperature: None,
        }
    }
}

/// Settings for the embedding model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// "gemini", "ollama" or "mock"
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Expected vector dimension D
    pub dimensions: usize,

    /// Custom endpoint (provider default when unset)
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "text-embedding-004".to_string(),
            dimensions: 768,
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

/// Chunking, storage and query parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Corpus file or directory, relative paths resolve against the workspace
    pub corpus: PathBuf,

    /// Index namespace directory, relative paths resolve against the workspace
    pub index_dir: PathBuf,

    /// Window length in characters
    pub chunk_size: usize,

    /// Characters shared between consecutive windows
    pub chunk_overlap: usize,

    /// Chunks retrieved per question
    pub top_k: usize,

    /// Snippets returned alongside an answer
    pub max_sources: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            corpus: PathBuf::from("data/docs.txt"),
            index_dir: PathBuf::from("index"),
            chunk_size: 800,
            chunk_overlap: 120,
            top_k: 4,
            max_sources: 2,
        }
    }
}

/// HTTP shell settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSettings>,
    embedding: Option<EmbeddingSettings>,
    retrieval: Option<RetrievalSettings>,
    server: Option<ServerSettings>,
    logging: Option<LoggingConfig>,
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
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
            retrieval: RetrievalSettings::default(),
            server: ServerSettings::default(),
            api_key: None,
            demo_password: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, config file and environment.
    ///
    /// Environment variables:
    /// - `SUPPORTBOT_WORKSPACE`: Override workspace path
    /// - `SUPPORTBOT_CONFIG`: Path to config file
    /// - `SUPPORTBOT_PROVIDER` / `SUPPORTBOT_MODEL`: Generation provider and model
    /// - `SUPPORTBOT_EMBEDDING_PROVIDER`: Embedding provider
    /// - `SUPPORTBOT_API_KEY` or `API_KEY`: Provider credential
    /// - `DEMO_PASSWORD`: Shared secret for the HTTP endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use supportbot_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Index: {:?}", config.index_dir());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration with an explicit workspace and/or config file,
    /// which take precedence over the environment.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        // A missing .env is the normal case
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {:?}", path);
        }

        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env_path("SUPPORTBOT_WORKSPACE")) {
            config.workspace = workspace;
        }
        config.config_file = config_file.or_else(|| env_path("SUPPORTBOT_CONFIG"));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.supportbot_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Some(provider) = env_value("SUPPORTBOT_PROVIDER") {
            config.llm.provider = provider;
        }

        if let Some(model) = env_value("SUPPORTBOT_MODEL") {
            config.llm.model = model;
        }

        if let Some(provider) = env_value("SUPPORTBOT_EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }

        config.api_key = env_value("SUPPORTBOT_API_KEY").or_else(|| env_value("API_KEY"));
        config.demo_password = env_value("DEMO_PASSWORD");

        if let Some(level) = env_value("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    ///
    /// Each section present in the file replaces the corresponding section;
    /// fields missing inside a section take their defaults.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(server) = config_file.server {
            result.server = server;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Flags take precedence over both the config file and the environment.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
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

    /// Get the path to the .supportbot directory.
    pub fn supportbot_dir(&self) -> PathBuf {
        self.workspace.join(".supportbot")
    }

    /// Index namespace directory, resolved against the workspace.
    pub fn index_dir(&self) -> PathBuf {
        self.resolve(&self.retrieval.index_dir)
    }

    /// Corpus path, resolved against the workspace.
    pub fn corpus_path(&self) -> PathBuf {
        self.resolve(&self.retrieval.corpus)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Validate configuration before any provider is constructed.
    ///
    /// Checks provider names, credentials for hosted providers, and the
    /// chunking contract `chunk_overlap < chunk_size`.
    pub fn validate(&self) -> AppResult<()> {
        check_provider("LLM", &self.llm.provider, &LLM_PROVIDERS)?;
        check_provider("embedding", &self.embedding.provider, &EMBEDDING_PROVIDERS)?;

        for provider in [&self.llm.provider, &self.embedding.provider] {
            if requires_api_key(provider) && self.api_key.is_none() {
                return Err(AppError::Config(format!(
                    "Provider '{}' requires an API key. Set API_KEY or SUPPORTBOT_API_KEY.",
                    provider
                )));
            }
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding.dimensions must be greater than zero".to_string(),
            ));
        }

        let retrieval = &self.retrieval;
        if retrieval.chunk_size == 0 {
            return Err(AppError::Config(
                "retrieval.chunk_size must be greater than zero".to_string(),
            ));
        }

        if retrieval.chunk_overlap >= retrieval.chunk_size {
            return Err(AppError::Config(format!(
                "retrieval.chunk_overlap ({}) must be smaller than retrieval.chunk_size ({})",
                retrieval.chunk_overlap, retrieval.chunk_size
            )));
        }

        if retrieval.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.top_k must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Whether a provider needs a credential.
pub fn requires_api_key(provider: &str) -> bool {
    provider.eq_ignore_ascii_case("gemini")
}

fn check_provider(kind: &str, provider: &str, known: &[&str]) -> AppResult<()> {
    if known.contains(&provider.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "Unknown {} provider: {}. Supported: {}",
            kind,
            provider,
            known.join(", ")
        )))
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_value(key).map(PathBuf::from)
}

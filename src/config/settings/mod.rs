
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::chat::conversation::HistoryPolicy;
use crate::chat::prompt::{CONTEXT_PLACEHOLDER, DEFAULT_SYSTEM_PROMPT, DEFAULT_USER_PROMPT, QUERY_PLACEHOLDER};
use crate::database::distance::DistanceMetric;
use crate::embeddings::chunking::ChunkingConfig;

/// Environment variable that takes precedence over `openai.api_key`
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const CONFIG_FILE_NAME: &str = "config.toml";
const DATABASE_FILE_NAME: &str = "vectors.db";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub embedding_model: String,
    pub completion_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub batch_size: u32,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1/".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            completion_model: "gpt-4o".to_string(),
            api_key: None,
            batch_size: 100,
            timeout_secs: 60,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Embedding width shared by ingestion, queries and the vector table
    pub dimensions: u32,
    pub top_k: usize,
    /// Maximum distance a chunk may have from the query to be retrieved
    pub score_threshold: f32,
    pub metric: DistanceMetric,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            dimensions: 384,
            top_k: 5,
            score_threshold: 0.5,
            metric: DistanceMetric::Cosine,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversationConfig {
    pub system_prompt: String,
    /// Template for augmented user messages, with `{context}` and `{query}`
    pub user_prompt: String,
    pub history: HistoryPolicy,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            user_prompt: DEFAULT_USER_PROMPT.to_string(),
            history: HistoryPolicy::Full,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid batch size: {0} (must be between 1 and 2048)")]
    InvalidBatchSize(u32),
    #[error("Invalid request timeout: {0} (must be between 1 and 600 seconds)")]
    InvalidTimeout(u64),
    #[error("Invalid temperature: {0} (must be between 0 and 2)")]
    InvalidTemperature(f32),
    #[error("Invalid max tokens: {0} (must be greater than 0)")]
    InvalidMaxTokens(u32),
    #[error("Invalid chunk size: {0} (must be greater than 0)")]
    InvalidChunkSize(usize),
    #[error("Overlap ({0}) must be smaller than chunk size ({1})")]
    OverlapTooLarge(usize, usize),
    #[error("Invalid embedding dimension: {0} (must be between 1 and 8192)")]
    InvalidEmbeddingDimension(u32),
    #[error("Invalid top_k: {0} (must be between 1 and 100)")]
    InvalidTopK(usize),
    #[error("Invalid score threshold: {0} (must be a finite, non-negative number)")]
    InvalidScoreThreshold(f32),
    #[error("User prompt template is missing the {0} placeholder")]
    MissingPlaceholder(&'static str),
    #[error("System prompt cannot be empty")]
    EmptySystemPrompt,
    #[error("Invalid history window: {0} (must keep at least one message)")]
    InvalidHistoryWindow(usize),
    #[error("No API key found: set OPENAI_API_KEY or openai.api_key")]
    MissingApiKey,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// `~/.rag-chat`, or the platform data directory on Windows
    #[inline]
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".rag-chat"))
            .or({
                #[cfg(windows)]
                {
                    dirs::data_dir().map(|data| data.join("rag-chat"))
                }
                #[cfg(not(windows))]
                {
                    None
                }
            })
            .ok_or(ConfigError::DirectoryError)
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = self.get_base_dir();

        fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Get the base directory for the application
    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join(CONFIG_FILE_NAME)
    }

    /// Get the path for the SQLite vector database
    #[inline]
    pub fn database_path(&self) -> PathBuf {
        self.get_base_dir().join(DATABASE_FILE_NAME)
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.openai.validate()?;
        self.chunking.validate()?;
        self.retrieval.validate()?;
        self.conversation.validate()?;
        Ok(())
    }
}

impl OpenAiConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_base()?;

        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.embedding_model.clone()));
        }

        if self.completion_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.completion_model.clone()));
        }

        if self.batch_size == 0 || self.batch_size > 2048 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }

        if !(1..=600).contains(&self.timeout_secs) {
            return Err(ConfigError::InvalidTimeout(self.timeout_secs));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::InvalidTemperature(temperature));
            }
        }

        if self.max_tokens == Some(0) {
            return Err(ConfigError::InvalidMaxTokens(0));
        }

        Ok(())
    }

    /// Parsed base URL, always ending in `/` so endpoint paths join beneath it
    pub fn endpoint_base(&self) -> Result<Url, ConfigError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| ConfigError::InvalidUrl(self.base_url.clone()))?;

        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(self.base_url.clone()));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }

    /// Resolve the API key from the environment, then the config file
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_api_key_from(std::env::var(API_KEY_ENV).ok())
    }

    pub fn resolve_api_key_from(&self, env_value: Option<String>) -> Result<String, ConfigError> {
        env_value
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                self.api_key
                    .clone()
                    .filter(|key| !key.trim().is_empty())
            })
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn set_base_url(&mut self, base_url: String) -> Result<(), ConfigError> {
        let temp_config = OpenAiConfig {
            base_url: base_url.clone(),
            ..self.clone()
        };
        temp_config.endpoint_base()?;
        self.base_url = base_url;
        Ok(())
    }

    pub fn set_embedding_model(&mut self, model: String) -> Result<(), ConfigError> {
        if model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(model));
        }
        self.embedding_model = model;
        Ok(())
    }

    pub fn set_completion_model(&mut self, model: String) -> Result<(), ConfigError> {
        if model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(model));
        }
        self.completion_model = model;
        Ok(())
    }

    pub fn set_batch_size(&mut self, batch_size: u32) -> Result<(), ConfigError> {
        if batch_size == 0 || batch_size > 2048 {
            return Err(ConfigError::InvalidBatchSize(batch_size));
        }
        self.batch_size = batch_size;
        Ok(())
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=8192).contains(&self.dimensions) {
            return Err(ConfigError::InvalidEmbeddingDimension(self.dimensions));
        }

        if !(1..=100).contains(&self.top_k) {
            return Err(ConfigError::InvalidTopK(self.top_k));
        }

        if !self.score_threshold.is_finite() || self.score_threshold < 0.0 {
            return Err(ConfigError::InvalidScoreThreshold(self.score_threshold));
        }

        Ok(())
    }

    pub fn set_top_k(&mut self, top_k: usize) -> Result<(), ConfigError> {
        if !(1..=100).contains(&top_k) {
            return Err(ConfigError::InvalidTopK(top_k));
        }
        self.top_k = top_k;
        Ok(())
    }

    pub fn set_score_threshold(&mut self, score_threshold: f32) -> Result<(), ConfigError> {
        if !score_threshold.is_finite() || score_threshold < 0.0 {
            return Err(ConfigError::InvalidScoreThreshold(score_threshold));
        }
        self.score_threshold = score_threshold;
        Ok(())
    }

    pub fn set_dimensions(&mut self, dimensions: u32) -> Result<(), ConfigError> {
        if !(1..=8192).contains(&dimensions) {
            return Err(ConfigError::InvalidEmbeddingDimension(dimensions));
        }
        self.dimensions = dimensions;
        Ok(())
    }
}

impl ConversationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system_prompt.trim().is_empty() {
            return Err(ConfigError::EmptySystemPrompt);
        }

        for placeholder in [CONTEXT_PLACEHOLDER, QUERY_PLACEHOLDER] {
            if !self.user_prompt.contains(placeholder) {
                return Err(ConfigError::MissingPlaceholder(placeholder));
            }
        }

        if let HistoryPolicy::Window { max_messages } = self.history {
            if max_messages == 0 {
                return Err(ConfigError::InvalidHistoryWindow(max_messages));
            }
        }

        Ok(())
    }
}

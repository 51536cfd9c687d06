use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::AgriRagError;
use crate::errors::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the CSV knowledge base
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// `openai`, `ollama` or `hashing`
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    /// Falls back to `llm.api_key` when empty
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Number of tables embedded concurrently at startup
    #[serde(default = "default_index_concurrency")]
    pub index_concurrency: usize,
}

fn default_embedding_provider() -> String {
    "ollama".to_string()
}

fn default_embedding_model() -> String {
    "paraphrase-multilingual".to_string()
}

pub(crate) fn default_embedding_dimension() -> usize {
    768
}

fn default_embedding_endpoint() -> String {
    "http://localhost:11434".to_string()
}

pub(crate) fn default_batch_size() -> usize {
    100
}

pub(crate) fn default_index_concurrency() -> usize {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    /// Upper bound for every generative or transcription call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4".to_string()
}

fn default_vision_model() -> String {
    "gpt-4o".to_string()
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    60
}

fn default_system_prompt() -> String {
    crate::llm::prompts::DEFAULT_SYSTEM_PROMPT.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// First-stage similarity threshold; the 0.6 confidence floor still applies
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

pub(crate) fn default_threshold() -> f32 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub cors: bool,
    /// Largest accepted audio or image upload
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

/// Extra keyword rule appended after the built-in extractor rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleConfig {
    pub keywords: Vec<String>,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text and apply environment overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> Result<Self> {
        // Try config.toml first, then config.example.toml, then built-in defaults
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            tracing::warn!("No config file found, using built-in defaults");
            let mut config = Self::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
    }

    fn apply_env_overrides(&mut self) {
        if self.llm.api_key.is_empty() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                self.llm.api_key = key;
            }
        }
        if let Ok(dir) = std::env::var("AGRIRAG_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data.dir = PathBuf::from(dir);
            }
        }
    }

    /// Reject settings the retrieval engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.embeddings.dimension == 0 {
            return Err(AgriRagError::ConfigError(
                "embeddings.dimension must be greater than zero".to_string(),
            ));
        }
        if self.embeddings.batch_size == 0 {
            return Err(AgriRagError::ConfigError(
                "embeddings.batch_size must be greater than zero".to_string(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.search.threshold) {
            return Err(AgriRagError::ConfigError(format!(
                "search.threshold must be within [-1, 1], got {}",
                self.search.threshold
            )));
        }
        if self.llm.timeout_secs == 0 {
            return Err(AgriRagError::ConfigError(
                "llm.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.data.dir.as_os_str().is_empty() {
            return Err(AgriRagError::ConfigError(
                "data.dir must not be empty".to_string(),
            ));
        }
        for rule in &self.extractor.rules {
            if rule.keywords.is_empty() || rule.fields.is_empty() {
                return Err(AgriRagError::ConfigError(
                    "extractor rules need at least one keyword and one field".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Key used for embedding requests
    pub fn embedding_api_key(&self) -> Option<&str> {
        let key = if self.embeddings.api_key.is_empty() {
            &self.llm.api_key
        } else {
            &self.embeddings.api_key
        };
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }

    /// Copy with secrets masked, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.llm.api_key.is_empty() {
            config.llm.api_key = "****".to_string();
        }
        if !config.embeddings.api_key.is_empty() {
            config.embeddings.api_key = "****".to_string();
        }
        config
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
        }
    }
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            endpoint: default_embedding_endpoint(),
            api_key: String::new(),
            batch_size: default_batch_size(),
            index_concurrency: default_index_concurrency(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: String::new(),
            chat_model: default_chat_model(),
            vision_model: default_vision_model(),
            transcription_model: default_transcription_model(),
            timeout_secs: default_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: true,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

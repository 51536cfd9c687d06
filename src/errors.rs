use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgriRagError {
    #[error("Load error: {0}")]
    LoadError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Collaborator error: {0}")]
    CollaboratorError(String),

    #[error("Invalid input: {0}")]
    InputError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgriRagError {
    /// Transport-level failures that may succeed if the caller tries again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::HttpError(_))
    }

    /// Malformed requests are rejected before any collaborator runs
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InputError(_))
    }

    /// Classify a transport failure from a remote collaborator
    pub fn from_reqwest(service: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{service}: {err}"))
        } else {
            Self::HttpError(format!("{service}: {err}"))
        }
    }
}

pub type Result<T> = std::result::Result<T, AgriRagError>;

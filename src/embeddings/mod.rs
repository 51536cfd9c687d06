//! Embeddings generation module
//!
//! This module provides text embeddings for the knowledge base and for queries:
//! - OpenAI (text-embedding-3-small, etc.)
//! - Ollama (local models such as paraphrase-multilingual)
//! - Hashing (deterministic, offline feature hashing)
//!
//! # Examples
//!
//! ```rust,no_run
//! use agrirag::config::AppConfig;
//! use agrirag::embeddings::EmbeddingService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config)?;
//!
//!     let embedding = service.generate("rice leaf blight").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;
pub mod hashing;
pub mod index;
pub mod text_preprocessing;

use std::str::FromStr;

use async_trait::async_trait;

pub use client::EmbeddingClient;
pub use generator::EmbeddingService;
pub use hashing::HashingEmbedder;
pub use index::EmbeddingIndex;
pub use index::TableEmbeddings;
pub use text_preprocessing::preprocess_text_for_embedding;

use crate::config::AppConfig;
use crate::errors::AgriRagError;
use crate::errors::Result;

/// A text embedding function. Implementations must be deterministic for
/// identical input and return one vector per input, in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Embed several texts in one call
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AgriRagError::EmbeddingError("No embedding in response".to_string()))
    }
}

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// `OpenAI` embeddings API
    OpenAI,
    /// Ollama local embeddings
    Ollama,
    /// Local feature hashing, no network
    Hashing,
}

impl FromStr for EmbeddingProvider {
    type Err = AgriRagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            "hashing" | "hash" => Ok(Self::Hashing),
            other => Err(AgriRagError::ConfigError(format!(
                "unknown embedding provider: {other}"
            ))),
        }
    }
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            provider: config.embeddings.provider.parse()?,
            model: config.embeddings.model.clone(),
            dimension: config.embeddings.dimension,
            endpoint: config.embeddings.endpoint.trim_end_matches('/').to_string(),
            api_key: config.embedding_api_key().map(str::to_string),
            batch_size: config.embeddings.batch_size,
            timeout_secs: config.llm.timeout_secs,
        })
    }
}

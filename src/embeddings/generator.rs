//! Embedding generation service with preprocessing and batch processing

use std::sync::Arc;

use tracing::debug;
use tracing::info;

use super::client::EmbeddingClient;
use super::hashing::HashingEmbedder;
use super::preprocess_text_for_embedding;
use super::Embedder;
use super::EmbeddingConfig;
use super::EmbeddingProvider;
use crate::config::AppConfig;
use crate::errors::AgriRagError;
use crate::errors::Result;

/// Front door to an [`Embedder`]: cleans input, splits batches, and enforces
/// a single vector dimension for the life of the process.
#[derive(Clone)]
pub struct EmbeddingService {
    embedder: Arc<dyn Embedder>,
    dimension: usize,
    batch_size: usize,
}

impl EmbeddingService {
    /// Create a new embedding service from application configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::from_config(EmbeddingConfig::from_app_config(config)?)
    }

    /// Create from custom config
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = match config.provider {
            EmbeddingProvider::Hashing => Arc::new(HashingEmbedder::new(config.dimension)?),
            EmbeddingProvider::OpenAI | EmbeddingProvider::Ollama => {
                Arc::new(EmbeddingClient::new(&config)?)
            }
        };
        info!(
            "Embedding service ready: provider={}, model={}, dimension={}",
            embedder.name(),
            config.model,
            config.dimension
        );
        Ok(Self::with_embedder(embedder, config.dimension, config.batch_size))
    }

    /// Wrap an existing embedder
    pub fn with_embedder(embedder: Arc<dyn Embedder>, dimension: usize, batch_size: usize) -> Self {
        Self {
            embedder,
            dimension,
            batch_size: batch_size.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Generate embedding for a single text; blank text yields a zero vector
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let Some(processed) = preprocess_text_for_embedding(text) else {
            return Ok(vec![0.0; self.dimension]);
        };
        let embedding = self.embedder.embed(&processed).await?;
        self.check_dimension(&embedding)?;
        Ok(embedding)
    }

    /// Generate embeddings for multiple texts, one per input, in input order.
    /// Blank texts are not sent to the provider and get zero vectors.
    pub async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut processed_texts = Vec::with_capacity(texts.len());
        let mut positions = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            if let Some(processed) = preprocess_text_for_embedding(text) {
                processed_texts.push(processed);
                positions.push(i);
            }
        }

        let mut embeddings = vec![vec![0.0; self.dimension]; texts.len()];
        if processed_texts.is_empty() {
            debug!("All {} texts are blank, returning zero vectors", texts.len());
            return Ok(embeddings);
        }

        let mut generated = Vec::with_capacity(processed_texts.len());
        for chunk in processed_texts.chunks(self.batch_size) {
            let chunk_embeddings = self.embedder.embed_batch(chunk).await?;
            if chunk_embeddings.len() != chunk.len() {
                return Err(AgriRagError::EmbeddingError(format!(
                    "provider returned {} embeddings for {} inputs",
                    chunk_embeddings.len(),
                    chunk.len()
                )));
            }
            generated.extend(chunk_embeddings);
        }

        for (pos, embedding) in positions.into_iter().zip(generated) {
            self.check_dimension(&embedding)?;
            embeddings[pos] = embedding;
        }

        Ok(embeddings)
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() == self.dimension {
            Ok(())
        } else {
            Err(AgriRagError::EmbeddingError(format!(
                "expected {}-dimensional embedding, provider returned {}",
                self.dimension,
                embedding.len()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;

    use super::*;

    /// Counts calls and records the largest batch it was handed
    struct CountingEmbedder {
        calls: AtomicUsize,
        max_batch: AtomicUsize,
        dimension: usize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        fn name(&self) -> &str {
            "counting"
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.max_batch.fetch_max(texts.len(), Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0; self.dimension];
                    v[0] = t.len() as f32;
                    v
                })
                .collect())
        }
    }

    fn counting(dimension: usize) -> Arc<CountingEmbedder> {
        Arc::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
            max_batch: AtomicUsize::new(0),
            dimension,
        })
    }

    #[tokio::test]
    async fn test_blank_texts_get_zero_vectors_in_place() {
        let embedder = counting(3);
        let service = EmbeddingService::with_embedder(embedder.clone(), 3, 10);

        let texts = vec!["abc".to_string(), "   ".to_string(), "de".to_string()];
        let embeddings = service.generate_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 3);
        assert_eq!(embeddings[0], vec![3.0, 0.0, 0.0]);
        assert_eq!(embeddings[1], vec![0.0, 0.0, 0.0]);
        assert_eq!(embeddings[2], vec![2.0, 0.0, 0.0]);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_batches_are_split() {
        let embedder = counting(2);
        let service = EmbeddingService::with_embedder(embedder.clone(), 2, 4);

        let texts: Vec<String> = (0..10).map(|i| format!("row {i}")).collect();
        let embeddings = service.generate_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 10);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
        assert_eq!(embedder.max_batch.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_all_blank_skips_provider() {
        let embedder = counting(2);
        let service = EmbeddingService::with_embedder(embedder.clone(), 2, 4);

        let embeddings = service
            .generate_batch(&[String::new(), "\n".to_string()])
            .await
            .unwrap();

        assert_eq!(embeddings, vec![vec![0.0, 0.0], vec![0.0, 0.0]]);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_embedding_error() {
        let service = EmbeddingService::with_embedder(counting(4), 8, 4);
        let result = service.generate("rice").await;
        assert!(matches!(result, Err(AgriRagError::EmbeddingError(_))));
    }

    #[test]
    fn test_hashing_provider_builds_locally() {
        let mut config = AppConfig::default();
        config.embeddings.provider = "hashing".to_string();
        config.embeddings.dimension = 64;
        let service = EmbeddingService::new(&config).unwrap();
        assert_eq!(service.dimension(), 64);
    }
}

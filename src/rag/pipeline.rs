//! Complete advisory pipeline: Match -> Extract -> Fall back

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::FieldExtractor;
use super::Match;
use super::SimilarityMatcher;
use crate::config::AppConfig;
use crate::corpus::Corpus;
use crate::corpus::FieldValue;
use crate::embeddings::EmbeddingIndex;
use crate::embeddings::EmbeddingService;
use crate::errors::AgriRagError;
use crate::errors::Result;
use crate::llm::prompts::AdvisoryPrompts;
use crate::llm::prompts::IMAGE_ANSWER_MAX_TOKENS;
use crate::llm::prompts::IMAGE_DESCRIPTION_MAX_TOKENS;
use crate::llm::ChatModel;
use crate::llm::OpenAiClient;
use crate::llm::Transcriber;
use crate::llm::VisionModel;
use crate::models::Answer;
use crate::models::AudioInput;
use crate::models::ImageInput;
use crate::models::Language;
use crate::models::TextQuery;
use crate::models::Transcript;

/// Answers text and image questions from the corpus, falling back to the
/// generative collaborators when no table matches confidently.
///
/// Holds only shared, read-only state; one instance serves every request.
#[derive(Clone)]
pub struct AdvisoryService {
    matcher: SimilarityMatcher,
    extractor: FieldExtractor,
    threshold: f32,
    system_prompt: String,
    chat: Arc<dyn ChatModel>,
    vision: Arc<dyn VisionModel>,
    transcriber: Arc<dyn Transcriber>,
}

impl AdvisoryService {
    /// Load the corpus, build the index and connect the collaborators
    ///
    /// # Errors
    /// - Unreadable data directory
    /// - Embedding provider configuration errors, or every table failing to embed
    /// - HTTP client build errors
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let embeddings = EmbeddingService::new(config)?;
        let index = build_index(config, &embeddings).await?;
        let client = Arc::new(OpenAiClient::new(&config.llm)?);

        Ok(Self::new(
            SimilarityMatcher::new(Arc::new(index), embeddings),
            FieldExtractor::with_extra_rules(&config.extractor.rules),
            config.search.threshold,
            client.clone(),
            client.clone(),
            client,
        )
        .with_system_prompt(config.llm.system_prompt.clone()))
    }

    /// Create from existing components
    #[must_use]
    pub fn new(
        matcher: SimilarityMatcher,
        extractor: FieldExtractor,
        threshold: f32,
        chat: Arc<dyn ChatModel>,
        vision: Arc<dyn VisionModel>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self {
            matcher,
            extractor,
            threshold,
            system_prompt: crate::llm::prompts::DEFAULT_SYSTEM_PROMPT.to_string(),
            chat,
            vision,
            transcriber,
        }
    }

    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: String) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn index(&self) -> &EmbeddingIndex {
        self.matcher.index()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Answer a free-text question
    ///
    /// # Errors
    /// - `InputError` for a blank query
    /// - Embedding errors for the query itself
    /// - Collaborator errors or timeouts from the chat fallback
    pub async fn answer_text(&self, query: &TextQuery) -> Result<Answer> {
        let text = query.query.trim();
        if text.is_empty() {
            return Err(AgriRagError::InputError("query must not be empty".to_string()));
        }
        info!("Processing text query ({}): {}", query.language, text);

        let matches = self.matcher.search(text, self.threshold).await?;
        if let Some(answer) = self.dataset_answer(text, &matches) {
            return Ok(answer);
        }

        debug!("No confident dataset match, asking chat model");
        let user = AdvisoryPrompts::text_query().render(&HashMap::from([
            ("language", query.language.code()),
            ("query", text),
        ]));
        let reply = self.chat.chat(&self.system_prompt, &user).await?;
        Ok(Answer::generative(reply))
    }

    /// Answer a question about a photo
    ///
    /// The vision model first describes the image; the description joined
    /// with the prompt is used as the retrieval query, while field selection
    /// follows the prompt alone.
    ///
    /// # Errors
    /// - `InputError` when no image was supplied
    /// - Collaborator errors or timeouts from either vision call
    pub async fn answer_image(
        &self,
        image: Option<ImageInput>,
        prompt: &str,
        language: Language,
    ) -> Result<Answer> {
        let image = image.ok_or_else(|| AgriRagError::InputError("no image provided".to_string()))?;
        info!(
            "Processing image query ({}, {} bytes): {}",
            language,
            image.bytes.len(),
            prompt
        );

        let description_prompt = AdvisoryPrompts::image_description().render(&HashMap::new());
        let description = self
            .vision
            .analyze(&image, &description_prompt, IMAGE_DESCRIPTION_MAX_TOKENS)
            .await?;
        debug!("Image description: {}", description);

        let combined = AdvisoryPrompts::image_query().render(&HashMap::from([
            ("description", description.as_str()),
            ("prompt", prompt),
        ]));
        let matches = self.matcher.search(&combined, self.threshold).await?;
        if let Some(answer) = self.dataset_answer(prompt, &matches) {
            return Ok(answer);
        }

        debug!("No confident dataset match, asking vision model");
        let fallback_prompt = AdvisoryPrompts::image_answer().render(&HashMap::from([
            ("language", language.code()),
            ("prompt", prompt),
        ]));
        let analysis = self
            .vision
            .analyze(&image, &fallback_prompt, IMAGE_ANSWER_MAX_TOKENS)
            .await?;
        Ok(Answer::analysis(analysis))
    }

    /// Transcribe a spoken question
    ///
    /// # Errors
    /// - `InputError` when no audio was supplied
    /// - Collaborator errors or timeouts from the transcriber
    pub async fn transcribe(&self, audio: Option<AudioInput>, language: Language) -> Result<Transcript> {
        let audio = audio.ok_or_else(|| AgriRagError::InputError("no audio provided".to_string()))?;
        info!(
            "Transcribing {} ({} bytes, {})",
            audio.file_name,
            audio.bytes.len(),
            language
        );
        let transcript = self.transcriber.transcribe(&audio, language).await?;
        Ok(Transcript { transcript })
    }

    /// One extracted value per match, best first; `None` when nothing matched
    fn dataset_answer(&self, query: &str, matches: &[Match<'_>]) -> Option<Answer> {
        let top = matches.first()?;
        let values: Vec<FieldValue> = matches
            .iter()
            .map(|m| {
                debug!(
                    "Matched {} row {} (similarity {:.3})",
                    m.table.name(),
                    m.row,
                    m.similarity
                );
                self.extractor.extract(query, m.record)
            })
            .collect();
        info!(
            "Answered from dataset: {} tables, confidence {:.3}",
            values.len(),
            top.similarity
        );
        Some(Answer::dataset(values, top.similarity))
    }
}

/// Load every table under the data directory and embed it
///
/// # Errors
/// - Unreadable data directory
/// - Every table failing to embed
pub async fn build_index(config: &AppConfig, embeddings: &EmbeddingService) -> Result<EmbeddingIndex> {
    let report = Corpus::load_dir(&config.data.dir)?;
    for (path, e) in &report.skipped {
        warn!("Skipped {}: {}", path.display(), e);
    }
    let index = EmbeddingIndex::build(
        report.corpus,
        embeddings,
        config.embeddings.index_concurrency,
    )
    .await?;
    info!(
        "Index ready: {} tables, {} records",
        index.len(),
        index.total_records()
    );
    Ok(index)
}

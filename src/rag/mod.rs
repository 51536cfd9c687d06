//! Retrieval with generative fallback over the agricultural corpus
//!
//! This module turns a farmer's question into an answer:
//! - Semantic matching of the query against every indexed table
//! - Field selection from the matched records using keyword rules
//! - Fallback to the chat or vision model when nothing matches confidently
//!
//! # Examples
//!
//! ```rust,no_run
//! use agrirag::config::AppConfig;
//! use agrirag::models::Language;
//! use agrirag::models::TextQuery;
//! use agrirag::rag::AdvisoryService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = AdvisoryService::from_config(&config).await?;
//!
//!     let answer = service
//!         .answer_text(&TextQuery::new("What are the symptoms of leaf blight?", Language::En))
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&answer)?);
//!
//!     Ok(())
//! }
//! ```

pub mod extractor;
pub mod matcher;
pub mod pipeline;

pub use extractor::FieldExtractor;
pub use extractor::KeywordRule;
pub use extractor::NO_ANSWER;
pub use matcher::cosine_similarity;
pub use matcher::SimilarityMatcher;
pub use matcher::CONFIDENCE_FLOOR;
pub use matcher::DEFAULT_THRESHOLD;
pub use pipeline::AdvisoryService;

use crate::corpus::Record;
use crate::corpus::Table;

/// Best record of one table for a query, with its similarity
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub table: &'a Table,
    pub row: usize,
    pub record: &'a Record,
    pub similarity: f32,
}

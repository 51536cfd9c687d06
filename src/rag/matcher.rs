//! Query-to-record similarity search across all indexed tables

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use super::Match;
use crate::embeddings::EmbeddingIndex;
use crate::embeddings::EmbeddingService;
use crate::errors::AgriRagError;
use crate::errors::Result;

/// First-stage threshold used when the caller does not pick one
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Second-stage filter applied after ranking, regardless of the caller's threshold
pub const CONFIDENCE_FLOOR: f32 = 0.6;

/// Cosine similarity; 0.0 when either vector has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    dot / denom
}

/// Row with the highest similarity; ties go to the lowest row index.
/// Non-finite scores never win.
pub fn best_row(query: &[f32], matrix: &[Vec<f32>]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (row, embedding) in matrix.iter().enumerate() {
        let similarity = cosine_similarity(query, embedding);
        if !similarity.is_finite() {
            continue;
        }
        match best {
            Some((_, top)) if similarity <= top => {}
            _ => best = Some((row, similarity)),
        }
    }
    best
}

/// Searches the shared index with query embeddings from the shared service
#[derive(Clone)]
pub struct SimilarityMatcher {
    index: Arc<EmbeddingIndex>,
    embeddings: EmbeddingService,
}

impl SimilarityMatcher {
    pub fn new(index: Arc<EmbeddingIndex>, embeddings: EmbeddingService) -> Self {
        Self { index, embeddings }
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    /// Embed `query` once and return the best record of each table, best first.
    ///
    /// A table's best record survives if its similarity is at least
    /// `threshold`; after ranking, anything below [`CONFIDENCE_FLOOR`] is
    /// dropped as well. An empty result means "no dataset answer".
    pub async fn search(&self, query: &str, threshold: f32) -> Result<Vec<Match<'_>>> {
        let query_embedding = self.embeddings.generate(query).await?;
        let matches = self.rank(&query_embedding, threshold)?;
        debug!(
            "Search over {} tables kept {} matches (threshold {}, floor {})",
            self.index.len(),
            matches.len(),
            threshold,
            CONFIDENCE_FLOOR
        );
        Ok(matches)
    }

    /// Score a precomputed query embedding against every table
    pub fn rank(&self, query_embedding: &[f32], threshold: f32) -> Result<Vec<Match<'_>>> {
        if query_embedding.len() != self.index.dimension() {
            return Err(AgriRagError::EmbeddingError(format!(
                "query embedding has dimension {}, index expects {}",
                query_embedding.len(),
                self.index.dimension()
            )));
        }

        let mut matches: Vec<Match<'_>> = self
            .index
            .tables()
            .iter()
            .filter_map(|entry| {
                let (row, similarity) = best_row(query_embedding, entry.matrix())?;
                let record = entry.table().record(row)?;
                (similarity >= threshold).then_some(Match {
                    table: entry.table(),
                    row,
                    record,
                    similarity,
                })
            })
            .collect();

        // Stable sort keeps table order among equal scores
        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        matches.retain(|m| m.similarity >= CONFIDENCE_FLOOR);

        Ok(matches)
    }
}

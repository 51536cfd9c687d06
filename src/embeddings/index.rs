//! Per-table embedding matrices built once at startup

use futures::stream::StreamExt;
use futures::stream::{
    self,
};
use tracing::info;
use tracing::warn;

use super::EmbeddingService;
use crate::corpus::Corpus;
use crate::corpus::Table;
use crate::errors::AgriRagError;
use crate::errors::Result;

/// A table together with one embedding per record, aligned by row
#[derive(Debug, Clone)]
pub struct TableEmbeddings {
    table: Table,
    matrix: Vec<Vec<f32>>,
}

impl TableEmbeddings {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn matrix(&self) -> &[Vec<f32>] {
        &self.matrix
    }
}

/// Immutable search index over every successfully embedded table
#[derive(Debug, Default)]
pub struct EmbeddingIndex {
    entries: Vec<TableEmbeddings>,
    dimension: usize,
    failed: Vec<(String, AgriRagError)>,
}

impl EmbeddingIndex {
    /// Embed every table of the corpus, up to `concurrency` tables at a time.
    ///
    /// A table whose embedding fails is left out and reported through
    /// [`EmbeddingIndex::failed`]; the other tables stay searchable. If no
    /// table could be embedded at all the provider is treated as unusable.
    pub async fn build(
        corpus: Corpus,
        service: &EmbeddingService,
        concurrency: usize,
    ) -> Result<Self> {
        let total = corpus.len();
        let dimension = service.dimension();

        let results: Vec<(Table, Result<Vec<Vec<f32>>>)> =
            stream::iter(corpus.tables().iter().cloned())
                .map(|table| async move {
                    if !table.has_text_columns() {
                        warn!(
                            "Table {} has no text columns; its records cannot match any query",
                            table.name()
                        );
                    }
                    let texts = table.representative_texts();
                    let matrix = service.generate_batch(&texts).await;
                    (table, matrix)
                })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

        let mut entries = Vec::with_capacity(results.len());
        let mut failed = Vec::new();
        for (table, matrix) in results {
            match matrix {
                Ok(matrix) => {
                    info!(
                        "Indexed table {} ({} records, dimension {})",
                        table.name(),
                        matrix.len(),
                        dimension
                    );
                    entries.push((table, matrix));
                }
                Err(e) => {
                    warn!("Failed to embed table {}: {}", table.name(), e);
                    failed.push((table.name().to_string(), e));
                }
            }
        }

        if total > 0 && entries.is_empty() {
            let reasons = failed
                .iter()
                .map(|(name, e)| format!("{name}: {e}"))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AgriRagError::EmbeddingError(format!(
                "no table could be embedded ({reasons})"
            )));
        }

        let mut index = Self::from_parts(dimension, entries)?;
        failed.sort_by(|a, b| a.0.cmp(&b.0));
        index.failed = failed;
        Ok(index)
    }

    /// Assemble an index from precomputed matrices, checking that every
    /// matrix has one row per record and every row has `dimension` values.
    pub fn from_parts(dimension: usize, entries: Vec<(Table, Vec<Vec<f32>>)>) -> Result<Self> {
        let mut checked = Vec::with_capacity(entries.len());
        for (table, matrix) in entries {
            if matrix.len() != table.len() {
                return Err(AgriRagError::EmbeddingError(format!(
                    "table {} has {} records but {} embeddings",
                    table.name(),
                    table.len(),
                    matrix.len()
                )));
            }
            if let Some(row) = matrix.iter().position(|v| v.len() != dimension) {
                return Err(AgriRagError::EmbeddingError(format!(
                    "table {} row {} has dimension {}, expected {}",
                    table.name(),
                    row,
                    matrix[row].len(),
                    dimension
                )));
            }
            checked.push(TableEmbeddings { table, matrix });
        }
        checked.sort_by(|a, b| a.table.name().cmp(b.table.name()));

        Ok(Self {
            entries: checked,
            dimension,
            failed: Vec::new(),
        })
    }

    pub fn tables(&self) -> &[TableEmbeddings] {
        &self.entries
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Tables that were loaded but could not be embedded
    pub fn failed(&self) -> &[(String, AgriRagError)] {
        &self.failed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.entries.iter().map(|e| e.table.len()).sum()
    }
}

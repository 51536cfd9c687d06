//! CSV loading with per-column type inference

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::Column;
use super::ColumnKind;
use super::Corpus;
use super::FieldValue;
use super::LoadReport;
use super::Record;
use super::Table;
use crate::errors::AgriRagError;
use crate::errors::Result;

impl Corpus {
    /// Load every `*.csv` file in `dir`.
    ///
    /// An unreadable directory is fatal. A malformed file is logged, recorded
    /// in [`LoadReport::skipped`] and does not stop the remaining files.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<LoadReport> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            AgriRagError::LoadError(format!("cannot read data directory {}: {e}", dir.display()))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| {
                    AgriRagError::LoadError(format!("cannot list {}: {e}", dir.display()))
                })?
                .path();
            if path.is_file() && is_csv(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut tables = Vec::with_capacity(paths.len());
        let mut skipped = Vec::new();
        for path in paths {
            match load_table(&path) {
                Ok(table) => {
                    debug!(
                        "Loaded table {} ({} records, {} columns)",
                        table.name(),
                        table.len(),
                        table.columns().len()
                    );
                    tables.push(table);
                }
                Err(e) => {
                    warn!("Skipping malformed file {}: {}", path.display(), e);
                    skipped.push((path, e));
                }
            }
        }

        let corpus = Corpus::new(tables);
        info!(
            "Loaded {} tables ({} records) from {}, skipped {}",
            corpus.len(),
            corpus.total_records(),
            dir.display(),
            skipped.len()
        );

        Ok(LoadReport { corpus, skipped })
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Load a single CSV file; the table is named after the file
pub fn load_table(path: &Path) -> Result<Table> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AgriRagError::LoadError(format!("invalid file name: {}", path.display())))?
        .to_string();
    let file = std::fs::File::open(path)
        .map_err(|e| AgriRagError::LoadError(format!("{name}: {e}")))?;
    parse_table(name, file)
}

/// Parse CSV text into a table. The first row is the header.
pub fn parse_table<R: Read>(name: String, reader: R) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| AgriRagError::LoadError(format!("{name}: bad header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for (idx, row) in csv_reader.records().enumerate() {
        // Header is line 1
        let row = row.map_err(|e| AgriRagError::LoadError(format!("{name}: row {}: {e}", idx + 2)))?;
        rows.push(row);
    }

    let kinds = infer_kinds(headers.len(), &rows);
    let columns: Arc<[Column]> = headers
        .into_iter()
        .zip(kinds)
        .map(|(name, kind)| Column { name, kind })
        .collect::<Vec<_>>()
        .into();

    let records = rows
        .into_iter()
        .map(|row| Record::new(columns.clone(), convert(&columns, &row)))
        .collect();

    Ok(Table::new(name, columns, records))
}

fn infer_kinds(width: usize, rows: &[csv::StringRecord]) -> Vec<ColumnKind> {
    (0..width)
        .map(|col| {
            let any_text = rows.iter().any(|row| {
                row.get(col)
                    .is_some_and(|cell| matches!(FieldValue::parse(cell), FieldValue::Text(_)))
            });
            if any_text {
                ColumnKind::Text
            } else {
                ColumnKind::Numeric
            }
        })
        .collect()
}

/// Cells of a text column are kept exactly as written, numbers included
fn convert(columns: &[Column], row: &csv::StringRecord) -> Vec<FieldValue> {
    columns
        .iter()
        .zip(row.iter())
        .map(|(column, cell)| match column.kind {
            ColumnKind::Numeric => FieldValue::parse(cell),
            ColumnKind::Text if cell.trim().is_empty() => FieldValue::Empty,
            ColumnKind::Text => FieldValue::Text(cell.to_string()),
        })
        .collect()
}

//! Curated knowledge base loaded from flat CSV files
//!
//! Every `*.csv` file in the data directory becomes one [`Table`], keyed by
//! its file name. Tables are read once and never mutated afterwards.
//!
//! # Examples
//!
//! ```rust,no_run
//! use agrirag::corpus::Corpus;
//!
//! # fn main() -> agrirag::Result<()> {
//! let report = Corpus::load_dir("data")?;
//! for table in report.corpus.tables() {
//!     println!("{}: {} records", table.name(), table.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod loader;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

pub use loader::load_table;
pub use loader::parse_table;

use crate::errors::AgriRagError;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Empty,
}

impl FieldValue {
    /// Parse a raw CSV cell; blank cells are `Empty`
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Integer(i);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::Float(f),
            _ => Self::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Integer(_) | Self::Float(_) => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Empty => Ok(()),
        }
    }
}

/// Inferred column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// At least one non-empty cell is not a number
    Text,
    /// Every non-empty cell parses as a number (or the column is all blank)
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// One row of a table. Cells are stored in header order.
#[derive(Debug, Clone)]
pub struct Record {
    columns: Arc<[Column]>,
    values: Vec<FieldValue>,
}

impl Record {
    pub(crate) fn new(columns: Arc<[Column]>, values: Vec<FieldValue>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Build a standalone record from `(name, value)` pairs.
    /// Column kinds are taken from the values themselves.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldValue)>,
        S: Into<String>,
    {
        let (columns, values): (Vec<Column>, Vec<FieldValue>) = pairs
            .into_iter()
            .map(|(name, value)| {
                let kind = if value.is_numeric() || matches!(value, FieldValue::Empty) {
                    ColumnKind::Numeric
                } else {
                    ColumnKind::Text
                };
                (
                    Column {
                        name: name.into(),
                        kind,
                    },
                    value,
                )
            })
            .unzip();
        Self::new(columns.into(), values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Exact column lookup, falling back to a case-insensitive trimmed match
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                let wanted = name.trim();
                self.columns
                    .iter()
                    .position(|c| c.name.trim().eq_ignore_ascii_case(wanted))
            })?;
        self.values.get(idx)
    }

    /// `(column, value)` pairs in header order
    pub fn fields(&self) -> impl Iterator<Item = (&Column, &FieldValue)> {
        self.columns.iter().zip(self.values.iter())
    }

    /// Values of text-typed columns joined by single spaces, blanks skipped
    pub fn representative_text(&self) -> String {
        self.fields()
            .filter(|(column, value)| column.kind == ColumnKind::Text && !value.is_empty())
            .map(|(_, value)| value.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A named, ordered sequence of records sharing one schema
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Arc<[Column]>,
    records: Vec<Record>,
}

impl Table {
    pub(crate) fn new(name: String, columns: Arc<[Column]>, records: Vec<Record>) -> Self {
        Self {
            name,
            columns,
            records,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, row: usize) -> Option<&Record> {
        self.records.get(row)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_text_columns(&self) -> bool {
        self.columns.iter().any(|c| c.kind == ColumnKind::Text)
    }

    /// One representative string per record, in row order
    pub fn representative_texts(&self) -> Vec<String> {
        self.records.iter().map(Record::representative_text).collect()
    }
}

/// Read-only registry of all loaded tables, ordered by name
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    tables: Vec<Table>,
}

impl Corpus {
    pub fn new(mut tables: Vec<Table>) -> Self {
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        Self { tables }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.tables.iter().map(Table::len).sum()
    }
}

/// Outcome of loading a data directory. Malformed files are skipped, not fatal.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub corpus: Corpus,
    pub skipped: Vec<(PathBuf, AgriRagError)>,
}

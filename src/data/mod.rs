// Data module for the dataset model and import/export formats
// Author: Gabriel Demetrios Lafis

pub mod csv;
pub mod json;
mod schema;
mod value;

pub use self::csv::*;
pub use self::json::*;
pub use schema::*;
pub use value::*;

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

static NULL_VALUE: Value = Value::Null;

/// Represents a generic data source
pub trait DataSource {
    /// Read columns and rows from the source
    fn read(&self) -> Result<ParsedData, DataError>;

    /// Get the source name
    fn name(&self) -> &str;
}

/// Represents a generic data sink
pub trait DataSink {
    /// Write a dataset to the sink
    fn write(&self, data: &Dataset) -> Result<(), DataError>;

    /// Get the sink name
    fn name(&self) -> &str;
}

/// Columns and rows produced by an import adapter, before a dataset exists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedData {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ParsedData {
    /// Turn the parsed data into a fresh dataset
    pub fn into_dataset(self, name: &str) -> Dataset {
        Dataset::new(name, self.columns, self.rows)
    }
}

/// A named collection of columns and rows
///
/// `row_count` always equals `rows.len()` on every value handed out by this
/// crate; snapshots are built through [`Dataset::with_rows`] and
/// [`Dataset::with_schema`] which re-establish it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub row_count: usize,
    pub cleaned: bool,
    pub created_at: DateTime<Utc>,
}

impl Dataset {
    /// Create a new dataset with a fresh id
    pub fn new(name: &str, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Dataset {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            row_count: rows.len(),
            columns,
            rows,
            cleaned: false,
            created_at: Utc::now(),
        }
    }

    /// Get the number of rows in the dataset
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if a column is part of the schema
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Iterate over one column's values, absent cells reading as null
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().map(move |row| row.get(column))
    }

    /// Snapshot with the same identity and schema but different rows
    pub fn with_rows(&self, rows: Vec<Row>) -> Self {
        self.with_schema(self.columns.clone(), rows)
    }

    /// Snapshot with the same identity but a different schema and rows
    pub fn with_schema(&self, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Dataset {
            id: self.id.clone(),
            name: self.name.clone(),
            row_count: rows.len(),
            columns,
            rows,
            cleaned: self.cleaned,
            created_at: self.created_at,
        }
    }

    /// Check that column names are unique
    pub fn validate_columns(columns: &[String]) -> Result<(), DataError> {
        let mut seen = HashSet::new();
        for column in columns {
            if !seen.insert(column.as_str()) {
                return Err(DataError::ValidationError(format!(
                    "Duplicate column name '{}'",
                    column
                )));
            }
        }
        Ok(())
    }
}

/// A record mapping column names to values
///
/// Rows may be sparse; a missing key reads as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub values: IndexMap<String, Value>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Row::default()
    }

    /// Get a column's value, null if absent
    pub fn get(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&NULL_VALUE)
    }

    /// Check if the row carries a key for the column
    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Set a column's value
    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, column: K, value: V) {
        self.values.insert(column.into(), value.into());
    }

    /// True if every value the row carries is null or empty
    pub fn is_blank(&self) -> bool {
        self.values.values().all(Value::is_null)
    }
}

impl AsRef<Row> for Row {
    fn as_ref(&self) -> &Row {
        self
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// File formats understood by the import and export adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
        }
    }

    /// Parse a file format from a name such as `csv`
    pub fn from_name(s: &str) -> Result<Self, DataError> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "json" => Ok(FileFormat::Json),
            _ => Err(DataError::NotSupported(
                "Unsupported file format. Please upload a CSV or JSON file.".to_string(),
            )),
        }
    }

    /// Pick the format from a file's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_name(ext)
    }
}

/// Read a CSV or JSON file into parsed data, choosing by extension
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<ParsedData, DataError> {
    match FileFormat::from_path(&path)? {
        FileFormat::Csv => CsvSource::new(&path).read(),
        FileFormat::Json => JsonSource::new(&path).read(),
    }
}

/// Represents an error in the data module
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl From<::csv::Error> for DataError {
    fn from(err: ::csv::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

// Cleaning transforms producing new dataset snapshots
// Author: Gabriel Demetrios Lafis

use log::debug;

use crate::data::{Dataset, Row, Value};
use crate::utils::{validate_column, validate_not_empty};
use super::{DataProcessor, ProcessingError, ProcessorType};

/// Result of removing blank rows
#[derive(Debug, Clone, PartialEq)]
pub struct NullRowRemoval {
    pub dataset: Dataset,
    pub rows_removed: usize,
}

/// Result of splitting a column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSplit {
    pub dataset: Dataset,
    /// Split columns that were not in the schema before, in order
    pub new_columns: Vec<String>,
    /// Largest number of parts any row was split into
    pub max_parts: usize,
}

/// Drop rows whose every value is null or empty
///
/// A row with at least one non-empty value survives. The snapshot is marked
/// cleaned even when nothing was removed.
pub fn remove_null_rows(dataset: &Dataset) -> NullRowRemoval {
    let rows: Vec<Row> = dataset.rows.iter().filter(|row| !row.is_blank()).cloned().collect();
    let rows_removed = dataset.len() - rows.len();

    let mut cleaned = dataset.with_rows(rows);
    cleaned.cleaned = true;

    debug!("dataset {}: removed {} blank rows", dataset.id, rows_removed);

    NullRowRemoval {
        dataset: cleaned,
        rows_removed,
    }
}

/// Name of the `index`-th (1-based) column produced by splitting `column`
pub fn split_column_name(column: &str, index: usize) -> String {
    format!("{}_{}", column, index)
}

/// Split a string column on a delimiter into `{column}_1`, `{column}_2`, ...
///
/// Only string values containing the delimiter are split; their trimmed
/// parts are written into the new columns. Other rows are left untouched
/// and get no new keys. The schema grows by the largest part count seen,
/// skipping names already present, and the source column is kept. Fails
/// without side effects on an unknown column or an empty delimiter.
pub fn split_column(dataset: &Dataset, column: &str, delimiter: &str) -> Result<ColumnSplit, ProcessingError> {
    validate_column(dataset, column).map_err(ProcessingError::InvalidArgument)?;
    validate_not_empty(delimiter, "delimiter").map_err(ProcessingError::InvalidArgument)?;

    let mut max_parts = 0;
    let rows: Vec<Row> = dataset
        .rows
        .iter()
        .map(|row| {
            let parts: Vec<String> = match row.get(column) {
                Value::String(s) if s.contains(delimiter) => {
                    s.split(delimiter).map(|part| part.trim().to_string()).collect()
                }
                _ => return row.clone(),
            };

            max_parts = max_parts.max(parts.len());

            let mut split = row.clone();
            for (i, part) in parts.into_iter().enumerate() {
                split.insert(split_column_name(column, i + 1), part);
            }
            split
        })
        .collect();

    let mut columns = dataset.columns.clone();
    let mut new_columns = Vec::new();
    for i in 1..=max_parts {
        let name = split_column_name(column, i);
        if !columns.contains(&name) {
            columns.push(name.clone());
            new_columns.push(name);
        }
    }

    let mut split = dataset.with_schema(columns, rows);
    split.cleaned = true;

    debug!(
        "dataset {}: split '{}' on {:?} into {} parts ({} new columns)",
        dataset.id,
        column,
        delimiter,
        max_parts,
        new_columns.len()
    );

    Ok(ColumnSplit {
        dataset: split,
        new_columns,
        max_parts,
    })
}

/// Remove rows with no values at all
pub struct RemoveNullRowsTransform;

impl DataProcessor for RemoveNullRowsTransform {
    fn process(&self, input: &Dataset) -> Result<Dataset, ProcessingError> {
        Ok(remove_null_rows(input).dataset)
    }

    fn name(&self) -> &str {
        "remove_null_rows"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Transform
    }
}

/// Split a column on a delimiter
pub struct SplitColumnTransform {
    column: String,
    delimiter: String,
}

impl SplitColumnTransform {
    /// Create a new split transform
    pub fn new(column: &str, delimiter: &str) -> Self {
        SplitColumnTransform {
            column: column.to_string(),
            delimiter: delimiter.to_string(),
        }
    }
}

impl DataProcessor for SplitColumnTransform {
    fn process(&self, input: &Dataset) -> Result<Dataset, ProcessingError> {
        Ok(split_column(input, &self.column, &self.delimiter)?.dataset)
    }

    fn name(&self) -> &str {
        "split_column"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Transform
    }
}

// Search and column filters over dataset rows
// Author: Gabriel Demetrios Lafis

use std::collections::BTreeMap;

use crate::data::{Dataset, Row, Value};
use crate::utils::validate_column;
use super::{DataProcessor, ProcessingError, ProcessorType};

/// Per-column filter queries; a missing or empty query matches everything
pub type ColumnFilters = BTreeMap<String, Option<String>>;

/// Case-insensitive substring test on a value's text form
fn value_contains(value: &Value, needle_lower: &str) -> bool {
    value.to_string().to_lowercase().contains(needle_lower)
}

/// True if any of `columns` in the row contains the lowercased needle
pub fn matches_search(columns: &[String], row: &Row, needle_lower: &str) -> bool {
    columns.iter().any(|c| value_contains(row.get(c), needle_lower))
}

/// Rows where any column's value contains `query`, ignoring case
///
/// An empty query keeps every row.
pub fn search_rows<'a>(dataset: &'a Dataset, query: &str) -> Vec<&'a Row> {
    if query.is_empty() {
        return dataset.rows.iter().collect();
    }

    let needle = query.to_lowercase();
    dataset
        .rows
        .iter()
        .filter(|row| matches_search(&dataset.columns, row, &needle))
        .collect()
}

/// Rows where every filtered column contains its query, ignoring case
///
/// Fails if a non-empty query names a column outside the schema.
pub fn filter_rows<'a>(dataset: &'a Dataset, filters: &ColumnFilters) -> Result<Vec<&'a Row>, ProcessingError> {
    let active: Vec<(&str, String)> = filters
        .iter()
        .filter_map(|(column, query)| match query.as_deref() {
            Some(q) if !q.is_empty() => Some((column.as_str(), q.to_lowercase())),
            _ => None,
        })
        .collect();

    for (column, _) in &active {
        validate_column(dataset, column).map_err(ProcessingError::InvalidArgument)?;
    }

    Ok(dataset
        .rows
        .iter()
        .filter(|row| active.iter().all(|(column, needle)| value_contains(row.get(column), needle)))
        .collect())
}

/// Filtered snapshot of a dataset
///
/// Only `rows` and `row_count` change; identity, schema and the cleaned flag
/// are carried over.
pub fn filter_data(dataset: &Dataset, filters: &ColumnFilters) -> Result<Dataset, ProcessingError> {
    let rows = filter_rows(dataset, filters)?.into_iter().cloned().collect();
    Ok(dataset.with_rows(rows))
}

/// Filter rows by a free-text search and per-column queries
pub struct FilterProcessor {
    name: String,
    search: Option<String>,
    filters: ColumnFilters,
}

impl FilterProcessor {
    /// Create a filter with no conditions
    pub fn new(name: &str) -> Self {
        FilterProcessor {
            name: name.to_string(),
            search: None,
            filters: ColumnFilters::new(),
        }
    }

    /// Create a filter that keeps rows matching a free-text search
    pub fn search(query: &str) -> Self {
        Self::new("search").with_search(query)
    }

    /// Create a filter that keeps rows whose column contains a query
    pub fn contains(column: &str, query: &str) -> Self {
        Self::new(&format!("contains_{}", column)).with_filter(column, query)
    }

    /// Set the free-text search
    pub fn with_search(mut self, query: &str) -> Self {
        self.search = Some(query.to_string());
        self
    }

    /// Add a column query
    pub fn with_filter(mut self, column: &str, query: &str) -> Self {
        self.filters.insert(column.to_string(), Some(query.to_string()));
        self
    }
}

impl DataProcessor for FilterProcessor {
    fn process(&self, input: &Dataset) -> Result<Dataset, ProcessingError> {
        let filtered = filter_data(input, &self.filters)?;

        match self.search.as_deref() {
            Some(query) if !query.is_empty() => {
                let rows = search_rows(&filtered, query).into_iter().cloned().collect();
                Ok(filtered.with_rows(rows))
            }
            _ => Ok(filtered),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Filter
    }
}

// Validation utilities
// Author: Gabriel Demetrios Lafis

use crate::data::Dataset;

/// Validate that a column is part of the dataset's schema
pub fn validate_column(dataset: &Dataset, column: &str) -> Result<(), String> {
    if dataset.has_column(column) {
        Ok(())
    } else {
        Err(format!("Column '{}' not found", column))
    }
}

/// Validate that every listed column is part of the dataset's schema
pub fn validate_columns<'a, I>(dataset: &Dataset, columns: I) -> Result<(), String>
where
    I: IntoIterator<Item = &'a str>,
{
    columns
        .into_iter()
        .try_for_each(|column| validate_column(dataset, column))
}

/// Validate that a string argument is not empty
pub fn validate_not_empty(value: &str, name: &str) -> Result<(), String> {
    if value.is_empty() {
        Err(format!("'{}' cannot be empty", name))
    } else {
        Ok(())
    }
}

/// Validate that a count argument is positive
pub fn validate_positive(value: usize, name: &str) -> Result<(), String> {
    if value == 0 {
        Err(format!("'{}' must be positive", name))
    } else {
        Ok(())
    }
}

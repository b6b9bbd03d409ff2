// Summary statistics for datasets
// Author: Gabriel Demetrios Lafis

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::data::{infer_type, ColumnType, Dataset, Row, Value};
use super::{DataProcessor, ProcessingError, ProcessorType};

/// Lowest or highest value reported for a column
///
/// Numeric columns report numbers. Other columns report the first and last
/// non-null value in row order, as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extreme {
    Number(f64),
    Text(String),
}

impl From<Extreme> for Value {
    fn from(extreme: Extreme) -> Self {
        match extreme {
            Extreme::Number(n) => Value::Float(n),
            Extreme::Text(s) => Value::String(s),
        }
    }
}

/// Summary of a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub column: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Extreme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Extreme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
}

/// Summary of a whole dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSummary {
    pub total_rows: usize,
    pub total_columns: usize,
    pub column_summaries: Vec<ColumnSummary>,
}

impl DataSummary {
    /// Find the summary of a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.column_summaries.iter().find(|s| s.column == name)
    }
}

/// Summarise every column of a dataset, in column order
///
/// Pure and recomputed on every call; nothing is cached here.
pub fn summarize(dataset: &Dataset) -> DataSummary {
    let column_summaries = dataset
        .columns
        .iter()
        .map(|column| summarize_column(dataset, column))
        .collect();

    DataSummary {
        total_rows: dataset.len(),
        total_columns: dataset.columns.len(),
        column_summaries,
    }
}

/// Summarise a single column
pub fn summarize_column(dataset: &Dataset, column: &str) -> ColumnSummary {
    let present: Vec<&Value> = dataset.column_values(column).filter(|v| !v.is_null()).collect();
    let count = present.len();
    let column_type = infer_type(present.iter().copied());
    let unique_count = present.iter().copied().collect::<HashSet<&Value>>().len();

    let mut summary = ColumnSummary {
        column: column.to_string(),
        column_type,
        count,
        null_count: dataset.len() - count,
        unique_count,
        mean: None,
        median: None,
        min: None,
        max: None,
        std: None,
    };

    if count == 0 {
        return summary;
    }

    if column_type == ColumnType::Number {
        let mut numbers: Vec<f64> = present.iter().filter_map(|v| v.as_number()).collect();
        numbers.sort_by(f64::total_cmp);

        let mean = compute_mean(&numbers);
        summary.mean = Some(mean);
        summary.median = Some(compute_median(&numbers));
        summary.min = numbers.first().copied().map(Extreme::Number);
        summary.max = numbers.last().copied().map(Extreme::Number);
        summary.std = Some(compute_std_dev(&numbers, mean));
    } else {
        summary.min = present.first().map(|v| Extreme::Text(v.to_string()));
        summary.max = present.last().map(|v| Extreme::Text(v.to_string()));
    }

    summary
}

/// Compute mean of values
pub fn compute_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.iter().sum::<f64>() / values.len() as f64
}

/// Compute median of values that are already sorted ascending
pub fn compute_median(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Compute population standard deviation of values around `mean`
pub fn compute_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let variance = values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Processor turning a dataset into its column summary table
///
/// One row per column with the fields of [`ColumnSummary`], so the summary
/// can be exported like any other dataset.
pub struct SummaryProcessor;

/// Columns of the table produced by [`SummaryProcessor`]
pub const SUMMARY_COLUMNS: [&str; 10] = [
    "column",
    "type",
    "count",
    "null_count",
    "unique_count",
    "mean",
    "median",
    "min",
    "max",
    "std",
];

impl DataProcessor for SummaryProcessor {
    fn process(&self, input: &Dataset) -> Result<Dataset, ProcessingError> {
        let summary = summarize(input);

        let rows = summary
            .column_summaries
            .into_iter()
            .map(|s| {
                let values: [Value; 10] = [
                    Value::String(s.column),
                    Value::String(s.column_type.to_string()),
                    Value::Integer(s.count as i64),
                    Value::Integer(s.null_count as i64),
                    Value::Integer(s.unique_count as i64),
                    s.mean.into(),
                    s.median.into(),
                    s.min.into(),
                    s.max.into(),
                    s.std.into(),
                ];
                SUMMARY_COLUMNS.iter().copied().zip(values).collect::<Row>()
            })
            .collect();

        let columns = SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect();
        Ok(input.with_schema(columns, rows))
    }

    fn name(&self) -> &str {
        "summary"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Stats
    }
}

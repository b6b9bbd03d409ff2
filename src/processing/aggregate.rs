// Grouping and aggregation for chart data
// Author: Gabriel Demetrios Lafis

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data::{Dataset, Row, Value};
use crate::utils::validate_columns;
use super::{DataProcessor, ProcessingError, ProcessorType};

/// Group key used for rows without a value in the group column
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Represents an aggregation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    /// Get the name of the aggregation function
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        }
    }

    /// Reduce one group's collected values
    ///
    /// `Count` counts every collected value. The others only see values with
    /// a finite numeric reading and yield 0 when there are none.
    pub fn apply(&self, values: &[&Value]) -> f64 {
        if *self == AggregateFunction::Count {
            return values.len() as f64;
        }

        let numbers: Vec<f64> = values.iter().filter_map(|v| v.as_number()).collect();
        if numbers.is_empty() {
            return 0.0;
        }

        match self {
            AggregateFunction::Count => numbers.len() as f64,
            AggregateFunction::Sum => numbers.iter().sum(),
            AggregateFunction::Avg => numbers.iter().sum::<f64>() / numbers.len() as f64,
            AggregateFunction::Min => numbers.iter().copied().fold(f64::INFINITY, f64::min),
            AggregateFunction::Max => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregateFunction {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "count" => Ok(AggregateFunction::Count),
            "sum" => Ok(AggregateFunction::Sum),
            "avg" | "mean" => Ok(AggregateFunction::Avg),
            "min" => Ok(AggregateFunction::Min),
            "max" => Ok(AggregateFunction::Max),
            _ => Err(ProcessingError::InvalidArgument(format!(
                "Unknown aggregate function '{}'",
                s
            ))),
        }
    }
}

/// One aggregated group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupValue {
    pub group: String,
    pub value: f64,
}

/// Group rows by one column and reduce another column per group
///
/// Null or empty group keys fall into [`UNKNOWN_GROUP`]. The result is sorted
/// by value, highest first; groups with equal values keep the order in which
/// they were first seen.
pub fn group_and_aggregate(
    dataset: &Dataset,
    group_column: &str,
    value_column: &str,
    function: AggregateFunction,
) -> Result<Vec<GroupValue>, ProcessingError> {
    validate_columns(dataset, [group_column, value_column]).map_err(ProcessingError::InvalidArgument)?;

    let mut groups: IndexMap<String, Vec<&Value>> = IndexMap::new();
    for row in &dataset.rows {
        let key = row.get(group_column);
        let key = if key.is_null() {
            UNKNOWN_GROUP.to_string()
        } else {
            key.to_string()
        };

        groups.entry(key).or_default().push(row.get(value_column));
    }

    let mut result: Vec<GroupValue> = groups
        .into_iter()
        .map(|(group, values)| GroupValue {
            value: function.apply(&values),
            group,
        })
        .collect();

    // stable, so ties stay in first-seen order
    result.sort_by(|a, b| b.value.total_cmp(&a.value));

    Ok(result)
}

/// Group-by processor producing a two-column dataset
///
/// Columns are the group column and `{function}_{value_column}`.
pub struct GroupByProcessor {
    name: String,
    group_column: String,
    value_column: String,
    function: AggregateFunction,
    limit: Option<usize>,
}

impl GroupByProcessor {
    /// Create a new group-by processor
    pub fn new(group_column: &str, value_column: &str, function: AggregateFunction) -> Self {
        GroupByProcessor {
            name: format!("group_by_{}", group_column),
            group_column: group_column.to_string(),
            value_column: value_column.to_string(),
            function,
            limit: None,
        }
    }

    /// Keep only the first `n` groups of the sorted result
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Name of the aggregated output column
    pub fn output_column(&self) -> String {
        format!("{}_{}", self.function, self.value_column)
    }

    /// Run the aggregation, applying the limit if one is set
    pub fn aggregate(&self, input: &Dataset) -> Result<Vec<GroupValue>, ProcessingError> {
        let mut groups = group_and_aggregate(input, &self.group_column, &self.value_column, self.function)?;
        if let Some(limit) = self.limit {
            groups.truncate(limit);
        }
        Ok(groups)
    }
}

impl DataProcessor for GroupByProcessor {
    fn process(&self, input: &Dataset) -> Result<Dataset, ProcessingError> {
        let output_column = self.output_column();

        let rows = self
            .aggregate(input)?
            .into_iter()
            .map(|g| {
                let mut row = Row::new();
                row.insert(self.group_column.as_str(), g.group);
                row.insert(output_column.as_str(), g.value);
                row
            })
            .collect();

        Ok(input.with_schema(vec![self.group_column.clone(), output_column], rows))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Aggregate
    }
}

// API request and response models
// Author: Gabriel Demetrios Lafis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{Dataset, Row};
use crate::processing::{AggregateFunction, ColumnFilters, SortSpec};

/// Dataset metadata without its rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub id: String,
    pub name: String,
    pub columns: Vec<String>,
    pub row_count: usize,
    pub cleaned: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Dataset> for DatasetInfo {
    fn from(dataset: &Dataset) -> Self {
        DatasetInfo {
            id: dataset.id.clone(),
            name: dataset.name.clone(),
            columns: dataset.columns.clone(),
            row_count: dataset.row_count,
            cleaned: dataset.cleaned,
            created_at: dataset.created_at,
        }
    }
}

/// Request to create a new dataset
///
/// The id is generated unless one is supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDatasetRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// Query string of the import endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ImportQuery {
    pub name: Option<String>,
    pub format: Option<String>,
}

/// Request to aggregate a dataset
#[derive(Debug, Clone, Deserialize)]
pub struct AggregateRequest {
    pub group_column: String,
    pub value_column: String,
    pub function: AggregateFunction,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Request for a filtered, sorted page of rows
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub filters: ColumnFilters,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// One page of rows
#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    pub rows: Vec<Row>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_rows: usize,
}

/// Request to split a column
#[derive(Debug, Clone, Deserialize)]
pub struct SplitColumnRequest {
    pub column: String,
    #[serde(default)]
    pub delimiter: Option<String>,
}

/// Result of removing blank rows
#[derive(Debug, Clone, Serialize)]
pub struct NullRowRemovalResponse {
    pub dataset: Dataset,
    pub rows_removed: usize,
}

/// Result of splitting a column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSplitResponse {
    pub dataset: Dataset,
    pub new_columns: Vec<String>,
}

// Sorted, paginated views over a dataset
// Author: Gabriel Demetrios Lafis

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::{Dataset, Row, Value};
use crate::utils::{validate_column, validate_positive};
use super::{filter_rows, matches_search, ColumnFilters, DataProcessor, ProcessingError, ProcessorType};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ProcessingError::InvalidArgument(format!(
                "Unknown sort direction '{}'",
                s
            ))),
        }
    }
}

/// Column and direction to sort by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Compare two cells for sorting
///
/// Null sorts after every non-null value whichever the direction; the
/// direction only flips the order between non-null values.
pub fn compare_cells(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => {
            let ord = a.natural_cmp(b);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

/// Sort rows in place by one column
pub fn sort_rows<R: AsRef<Row>>(rows: &mut [R], column: &str, direction: SortDirection) {
    rows.sort_by(|a, b| compare_cells(a.as_ref().get(column), b.as_ref().get(column), direction));
}

/// Number of pages needed for `total` items
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

/// Clamp a 1-based page number into `[1, total_pages]`
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// One page of items
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice out a 1-based page `[(page-1)*size, page*size)`
///
/// The page is used as given; callers clamp it first with [`clamp_page`].
/// Pages past the end are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Result<Page<T>, ProcessingError> {
    validate_positive(page_size, "page_size").map_err(ProcessingError::InvalidArgument)?;
    validate_positive(page, "page").map_err(ProcessingError::InvalidArgument)?;

    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());

    Ok(Page {
        items: items[start..end].to_vec(),
        page,
        page_size,
        total_pages: total_pages(items.len(), page_size),
        total_items: items.len(),
    })
}

/// Everything needed to derive a table view: filter, sort, then paginate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub filters: ColumnFilters,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default = "default_page")]
    pub page: usize,
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

impl ViewQuery {
    /// First page of an unfiltered, unsorted view
    pub fn new(page_size: usize) -> Self {
        ViewQuery {
            search: None,
            filters: ColumnFilters::new(),
            sort: None,
            page: 1,
            page_size,
        }
    }
}

/// Build a view over a dataset without touching it
///
/// Search and column filters apply first, then sorting, then pagination
/// with the page clamped into range.
pub fn build_view<'a>(dataset: &'a Dataset, query: &ViewQuery) -> Result<Page<&'a Row>, ProcessingError> {
    validate_positive(query.page_size, "page_size").map_err(ProcessingError::InvalidArgument)?;

    let mut rows = filter_rows(dataset, &query.filters)?;

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        rows.retain(|row| matches_search(&dataset.columns, row, &needle));
    }

    if let Some(sort) = &query.sort {
        validate_column(dataset, &sort.column).map_err(ProcessingError::InvalidArgument)?;
        sort_rows(&mut rows, &sort.column, sort.direction);
    }

    let page = clamp_page(query.page, total_pages(rows.len(), query.page_size));
    paginate(&rows, page, query.page_size)
}

/// Sort processor producing a reordered snapshot
pub struct SortProcessor {
    sort: SortSpec,
}

impl SortProcessor {
    /// Create a new sort processor
    pub fn new(column: &str, direction: SortDirection) -> Self {
        SortProcessor {
            sort: SortSpec {
                column: column.to_string(),
                direction,
            },
        }
    }
}

impl DataProcessor for SortProcessor {
    fn process(&self, input: &Dataset) -> Result<Dataset, ProcessingError> {
        validate_column(input, &self.sort.column).map_err(ProcessingError::InvalidArgument)?;

        let mut rows = input.rows.clone();
        sort_rows(&mut rows, &self.sort.column, self.sort.direction);
        Ok(input.with_rows(rows))
    }

    fn name(&self) -> &str {
        "sort"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Sort
    }
}

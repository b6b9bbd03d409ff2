// API request handlers
// Author: Gabriel Demetrios Lafis

use actix_web::{web, HttpResponse, Responder};
use log::info;

use crate::data::{parse_csv, parse_json, to_csv_string, Dataset, FileFormat, Row};
use crate::processing::{
    build_view, remove_null_rows, split_column, summarize, GroupByProcessor, ViewQuery,
};
use crate::storage::DatasetPatch;
use super::{ApiError, AppState, models::*};

const DEFAULT_IMPORT_NAME: &str = "Imported dataset";

/// List all datasets
pub async fn list_datasets(state: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    let datasets: Vec<DatasetInfo> = state.storage.list()?.iter().map(DatasetInfo::from).collect();

    Ok(HttpResponse::Ok().json(datasets))
}

/// Create a new dataset
pub async fn create_dataset(
    state: web::Data<AppState>,
    payload: web::Json<CreateDatasetRequest>,
) -> Result<impl Responder, ApiError> {
    let req = payload.into_inner();

    if req.name.trim().is_empty() {
        return Err(ApiError::ValidationError("Dataset name cannot be empty".to_string()));
    }
    Dataset::validate_columns(&req.columns)?;

    let mut dataset = Dataset::new(&req.name, req.columns, req.rows);
    if let Some(id) = req.id {
        dataset.id = id;
    }

    let created = state.storage.create(&dataset)?;
    info!("Created dataset {} ({} rows)", created.id, created.row_count);

    Ok(HttpResponse::Created().json(created))
}

/// Import a dataset from a raw CSV or JSON body
pub async fn import_dataset(
    state: web::Data<AppState>,
    query: web::Query<ImportQuery>,
    body: web::Bytes,
) -> Result<impl Responder, ApiError> {
    let format = match query.format.as_deref() {
        Some(format) => FileFormat::from_name(format)?,
        None => FileFormat::Csv,
    };

    let parsed = match format {
        FileFormat::Csv => parse_csv(&body[..], ',')?,
        FileFormat::Json => parse_json(&body[..])?,
    };

    let name = query
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_IMPORT_NAME);

    let created = state.storage.create(&parsed.into_dataset(name))?;
    info!(
        "Imported dataset {} from {} ({} rows, {} columns)",
        created.id,
        format.extension(),
        created.row_count,
        created.columns.len()
    );

    Ok(HttpResponse::Created().json(created))
}

/// Get a dataset
pub async fn get_dataset(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let dataset = state.storage.get(&path.into_inner())?;

    Ok(HttpResponse::Ok().json(dataset))
}

/// Update a dataset
pub async fn update_dataset(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<DatasetPatch>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    let patch = payload.into_inner();

    if patch.name.as_deref().map_or(false, |name| name.trim().is_empty()) {
        return Err(ApiError::ValidationError("Dataset name cannot be empty".to_string()));
    }

    let _guard = state.lock_edits()?;
    let updated = state.storage.update(&id, &patch)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Delete a dataset
pub async fn delete_dataset(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();

    let _guard = state.lock_edits()?;
    state.storage.delete(&id)?;
    info!("Deleted dataset {}", id);

    Ok(HttpResponse::NoContent().finish())
}

/// Summary statistics for every column
pub async fn summarize_dataset(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let dataset = state.storage.get(&path.into_inner())?;

    Ok(HttpResponse::Ok().json(summarize(&dataset)))
}

/// Group and aggregate a dataset
pub async fn aggregate_dataset(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<AggregateRequest>,
) -> Result<impl Responder, ApiError> {
    let req = payload.into_inner();
    let dataset = state.storage.get(&path.into_inner())?;

    let mut processor = GroupByProcessor::new(&req.group_column, &req.value_column, req.function);
    if let Some(limit) = req.limit {
        processor = processor.limit(limit);
    }

    Ok(HttpResponse::Ok().json(processor.aggregate(&dataset)?))
}

/// Filtered, sorted page of a dataset's rows
pub async fn view_dataset(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ViewRequest>,
) -> Result<impl Responder, ApiError> {
    let req = payload.into_inner();
    let dataset = state.storage.get(&path.into_inner())?;

    let query = ViewQuery {
        search: req.search,
        filters: req.filters,
        sort: req.sort,
        page: req.page.unwrap_or(1),
        page_size: req.page_size.unwrap_or(state.data.page_size),
    };
    let page = build_view(&dataset, &query)?;

    Ok(HttpResponse::Ok().json(ViewResponse {
        rows: page.items.into_iter().cloned().collect::<Vec<Row>>(),
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
        total_rows: page.total_items,
    }))
}

/// Export a dataset as CSV text
pub async fn export_dataset(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let dataset = state.storage.get(&path.into_inner())?;
    let csv = to_csv_string(&dataset)?;

    Ok(HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(csv))
}

/// Remove rows with no values and persist the result
pub async fn clean_null_rows(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();

    let _guard = state.lock_edits()?;
    let dataset = state.storage.get(&id)?;
    let removal = remove_null_rows(&dataset);
    let updated = state.storage.update(&id, &DatasetPatch::from_snapshot(&removal.dataset))?;

    info!("Removed {} blank rows from dataset {}", removal.rows_removed, id);

    Ok(HttpResponse::Ok().json(NullRowRemovalResponse {
        dataset: updated,
        rows_removed: removal.rows_removed,
    }))
}

/// Split a column on a delimiter and persist the result
pub async fn clean_split_column(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<SplitColumnRequest>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    let req = payload.into_inner();
    let delimiter = req.delimiter.unwrap_or_else(|| state.data.split_delimiter.clone());

    let _guard = state.lock_edits()?;
    let dataset = state.storage.get(&id)?;
    let split = split_column(&dataset, &req.column, &delimiter)?;
    let updated = state.storage.update(&id, &DatasetPatch::from_snapshot(&split.dataset))?;

    info!(
        "Split column '{}' of dataset {} into {} new columns",
        req.column,
        id,
        split.new_columns.len()
    );

    Ok(HttpResponse::Ok().json(ColumnSplitResponse {
        dataset: updated,
        new_columns: split.new_columns,
    }))
}

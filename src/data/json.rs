// JSON import and export adapters
// Author: Gabriel Demetrios Lafis

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use super::{header_column_name, DataError, DataSink, DataSource, Dataset, ParsedData, Row, Value};

/// JSON data source reading an array of records
pub struct JsonSource {
    path: String,
}

impl JsonSource {
    /// Create a new JSON data source
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonSource {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }
}

impl DataSource for JsonSource {
    fn read(&self) -> Result<ParsedData, DataError> {
        let file = File::open(&self.path)?;
        parse_json(BufReader::new(file))
    }

    fn name(&self) -> &str {
        &self.path
    }
}

/// Convert a JSON value to a cell value
///
/// Nested arrays and objects are kept as their JSON text.
pub fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => Value::String(json.to_string()),
    }
}

/// Parse a JSON array of objects
///
/// Keys are named like CSV headers, with the position being the key's place
/// among all keys seen so far. Columns follow the first record's keys, then
/// any new keys in first-seen order. Two keys that end up with the same
/// column name are rejected.
pub fn parse_json<R: Read>(reader: R) -> Result<ParsedData, DataError> {
    let json: JsonValue = serde_json::from_reader(reader)?;

    let records = json
        .as_array()
        .ok_or_else(|| DataError::ParseError("Expected a JSON array of records".to_string()))?;

    if records.is_empty() {
        return Err(DataError::ParseError("No data found in the file".to_string()));
    }

    // raw key -> column name
    let mut names: IndexMap<String, String> = IndexMap::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let obj = record
            .as_object()
            .ok_or_else(|| DataError::ParseError(format!("Record {} is not an object", i + 1)))?;

        let mut row = Row::new();
        for (key, value) in obj {
            let column = match names.get(key) {
                Some(column) => column.clone(),
                None => {
                    let column = header_column_name(key, names.len() + 1);
                    if names.values().any(|existing| *existing == column) {
                        return Err(DataError::ParseError(format!(
                            "Duplicate column name '{}' (from key '{}')",
                            column, key
                        )));
                    }
                    names.insert(key.clone(), column.clone());
                    column
                }
            };
            row.insert(column, json_to_value(value));
        }
        rows.push(row);
    }

    let columns = names.into_values().collect();
    Ok(ParsedData { columns, rows })
}

/// JSON data sink writing the rows as an array of records
pub struct JsonSink {
    path: String,
    pretty: bool,
}

impl JsonSink {
    /// Create a new JSON data sink
    pub fn new<P: AsRef<Path>>(path: P, pretty: bool) -> Self {
        JsonSink {
            path: path.as_ref().to_string_lossy().to_string(),
            pretty,
        }
    }
}

impl DataSink for JsonSink {
    fn write(&self, data: &Dataset) -> Result<(), DataError> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);

        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &data.rows)?;
        } else {
            serde_json::to_writer(&mut writer, &data.rows)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.path
    }
}

/// Read a full dataset document (identity, schema and rows)
pub fn read_dataset_document<P: AsRef<Path>>(path: P) -> Result<Dataset, DataError> {
    let file = File::open(path)?;
    let dataset: Dataset = serde_json::from_reader(BufReader::new(file))?;
    Ok(dataset)
}

/// Write a full dataset document (identity, schema and rows)
pub fn write_dataset_document<P: AsRef<Path>>(path: P, dataset: &Dataset) -> Result<(), DataError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, dataset)?;
    writer.flush()?;
    Ok(())
}

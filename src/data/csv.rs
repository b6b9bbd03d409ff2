// CSV import and export adapters
// Author: Gabriel Demetrios Lafis

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use super::{header_column_name, DataError, DataSink, DataSource, Dataset, ParsedData, Row, Value};

/// CSV data source
pub struct CsvSource {
    path: String,
    delimiter: char,
}

impl CsvSource {
    /// Create a new comma-separated data source
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_delimiter(path, ',')
    }

    /// Create a new CSV data source with a custom delimiter
    pub fn with_delimiter<P: AsRef<Path>>(path: P, delimiter: char) -> Self {
        CsvSource {
            path: path.as_ref().to_string_lossy().to_string(),
            delimiter,
        }
    }
}

impl DataSource for CsvSource {
    fn read(&self) -> Result<ParsedData, DataError> {
        let file = File::open(&self.path)?;
        parse_csv(BufReader::new(file), self.delimiter)
    }

    fn name(&self) -> &str {
        &self.path
    }
}

/// Parse CSV text with a header row
///
/// Header names are sanitized; a header that sanitizes to nothing becomes
/// `column_{n}`. Empty cells are imported as null and blank lines are
/// skipped. Rows with a different field count than the header are rejected.
pub fn parse_csv<R: Read>(reader: R, delimiter: char) -> Result<ParsedData, DataError> {
    if !delimiter.is_ascii() {
        return Err(DataError::NotSupported(format!(
            "Delimiter '{}' is not a single-byte character",
            delimiter
        )));
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, header)| header_column_name(header, i + 1))
        .collect();

    if columns.is_empty() {
        return Err(DataError::ParseError("No data found in the file".to_string()));
    }
    Dataset::validate_columns(&columns).map_err(|err| DataError::ParseError(err.to_string()))?;

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;

        let row: Row = columns
            .iter()
            .zip(record.iter())
            .map(|(column, field)| {
                let value = if field.is_empty() {
                    Value::Null
                } else {
                    Value::String(field.to_string())
                };
                (column.clone(), value)
            })
            .collect();

        rows.push(row);
    }

    Ok(ParsedData { columns, rows })
}

/// CSV data sink
pub struct CsvSink {
    path: String,
}

impl CsvSink {
    /// Create a new CSV data sink
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        CsvSink {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }
}

impl DataSink for CsvSink {
    fn write(&self, data: &Dataset) -> Result<(), DataError> {
        let text = to_csv_string(data)?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.path
    }
}

/// Render a dataset as CSV text
///
/// One header line, then one line per row in column order, joined by `\n`
/// without a trailing newline. Null cells are empty. Fields containing a
/// comma, quote or line break are quoted with inner quotes doubled.
pub fn to_csv_string(data: &Dataset) -> Result<String, DataError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    csv_writer.write_record(&data.columns)?;

    for row in &data.rows {
        let record: Vec<String> = data.columns.iter().map(|column| row.get(column).to_string()).collect();
        csv_writer.write_record(&record)?;
    }

    let bytes = csv_writer
        .into_inner()
        .map_err(|err| DataError::IoError(err.into_error()))?;
    let mut text = String::from_utf8(bytes).map_err(|err| DataError::ParseError(err.to_string()))?;

    if text.ends_with('\n') {
        text.pop();
    }

    Ok(text)
}

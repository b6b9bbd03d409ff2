// Column type inference and column name sanitization
// Author: Gabriel Demetrios Lafis

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{DataError, Value};

/// Inferred type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Date,
    String,
}

impl ColumnType {
    /// Get the lowercase name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::String => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "number" => Ok(ColumnType::Number),
            "date" => Ok(ColumnType::Date),
            "string" => Ok(ColumnType::String),
            _ => Err(DataError::ParseError(format!("Unknown column type: {}", s))),
        }
    }
}

/// Infer the type of a column from its raw values
///
/// Null and empty values are ignored. A column with no remaining values is
/// a string column. Numbers win over dates, dates over strings, and a single
/// non-conforming value demotes the whole column.
pub fn infer_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a Value>,
{
    let present: Vec<&Value> = values.into_iter().filter(|v| !v.is_null()).collect();

    if present.is_empty() {
        ColumnType::String
    } else if present.iter().all(|v| v.as_number().is_some()) {
        ColumnType::Number
    } else if present.iter().all(|v| v.is_date()) {
        ColumnType::Date
    } else {
        ColumnType::String
    }
}

/// Normalise an imported header into a column name
///
/// Trims, drops everything outside `[A-Za-z0-9_]` and whitespace, turns each
/// whitespace run into a single `_` and lowercases. Applying it twice gives
/// the same result as applying it once.
pub fn sanitize_column_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.trim().chars() {
        if c.is_whitespace() {
            in_whitespace = true;
            continue;
        }
        if !(c.is_ascii_alphanumeric() || c == '_') {
            continue;
        }
        if in_whitespace {
            out.push('_');
            in_whitespace = false;
        }
        out.push(c.to_ascii_lowercase());
    }

    // trailing whitespace can only precede dropped characters
    if in_whitespace {
        out.push('_');
    }

    out
}

/// Column name for an imported header at 1-based `position`
///
/// A header that sanitizes to nothing becomes `column_{position}`.
pub fn header_column_name(header: &str, position: usize) -> String {
    let name = sanitize_column_name(header);
    if name.is_empty() {
        format!("column_{}", position)
    } else {
        name
    }
}

/// Parse a string as a finite number
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %b %Y", "%b %d %Y", "%b %d, %Y", "%B %d, %Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a string as a calendar date or date-time
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

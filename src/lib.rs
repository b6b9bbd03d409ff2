// Sparkly Data Engine
// Author: Gabriel Demetrios Lafis

//! # Sparkly Data Engine
//!
//! An in-memory tabular dataset engine.
//!
//! ## Features
//!
//! - CSV and JSON import with column-name sanitization
//! - Column type inference and per-column summary statistics
//! - Grouping and aggregation (count, sum, avg, min, max)
//! - Search, column filters, sorting and pagination
//! - Cleaning transforms: blank-row removal and column splitting
//! - Pluggable dataset storage (memory, files, cache, remote)
//! - REST API for remote access
//!
//! ## Example
//!
//! ```rust
//! use sparkly_data_engine::{
//!     data::parse_csv,
//!     processing::{group_and_aggregate, remove_null_rows, AggregateFunction},
//! };
//!
//! let csv = "Category,Value\nA,10\nB,5\nA,20\n,\n";
//! let dataset = parse_csv(csv.as_bytes(), ',').unwrap().into_dataset("sales");
//!
//! let cleaned = remove_null_rows(&dataset);
//! assert_eq!(cleaned.rows_removed, 1);
//!
//! let groups = group_and_aggregate(&cleaned.dataset, "category", "value", AggregateFunction::Sum).unwrap();
//! assert_eq!(groups[0].group, "A");
//! assert_eq!(groups[0].value, 30.0);
//! ```

pub mod api;
pub mod data;
pub mod processing;
pub mod storage;
pub mod utils;

// Re-export main types
pub use api::Server;
pub use data::{ColumnType, Dataset, Row, Value};
pub use processing::{DataSummary, Pipeline};
pub use storage::{DataStorage, DatasetPatch, MemoryStorage};
pub use utils::Config;

//! # forcepull-table
//!
//! Column-oriented in-memory container for query and bulk results, plus the
//! flattening pass that unwinds Salesforce's nested parent/child record
//! graphs into flat `object.field` columns.
//!
//! Cells are `serde_json::Value`s: the REST query API hands back JSON, and
//! CSV results decode to strings that `Table::coerce_numeric` can tighten
//! afterwards.
//!
//! ```rust,ignore
//! use forcepull_table::{flatten, NormalizeOptions, Table};
//!
//! // Raw records from a query response
//! let table = flatten::normalize(records, &NormalizeOptions::default())?;
//!
//! // CSV from a bulk result download
//! let mut table = Table::from_csv_str(&csv_text)?;
//! table.coerce_numeric();
//! ```

mod csv;
mod error;
pub mod flatten;
mod table;

pub use error::{Error, ErrorKind, Result};
pub use flatten::{normalize, NormalizeOptions};
pub use table::{Column, Table};

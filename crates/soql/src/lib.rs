//! # forcepull-soql
//!
//! Synchronous SOQL query client with result flattening and filter-list
//! fan-out.
//!
//! ## Features
//!
//! - **Paginated Queries** - Follows `nextRecordsUrl` to the last page
//! - **Flattened Results** - Relationship columns expand into
//!   `object.field` columns; numeric-looking text becomes numbers
//! - **Filter-List Fan-Out** - `WHERE ... IN` over thousands of keys,
//!   chunked to stay inside the SOQL length cap
//!
//! ## Example
//!
//! ```rust,ignore
//! use forcepull_soql::QueryClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), forcepull_soql::Error> {
//!     let client = QueryClient::new(
//!         "https://myorg.my.salesforce.com",
//!         "session_id",
//!     )?;
//!
//!     let contacts = client
//!         .query("SELECT Id, Name, Account.Name FROM Contact")
//!         .await?;
//!
//!     let matching = client
//!         .filtered_query(
//!             "SELECT Id FROM Contact WHERE AccountId IN",
//!             &account_ids,
//!         )
//!         .await?;
//!
//!     println!("{} + {} rows", contacts.num_rows(), matching.num_rows());
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod filter;

pub use client::QueryClient;
pub use error::{Error, ErrorKind, Result};
pub use filter::FILTER_CHUNK_SIZE;

// Re-export the table types callers see in every result.
pub use forcepull_table::{NormalizeOptions, Table};

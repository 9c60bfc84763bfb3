//! # forcepull
//!
//! Salesforce bulk and SOQL query client with tabular results.
//!
//! Pulls query results out of Salesforce through the async Bulk API
//! (large extracts) or the synchronous REST query endpoint, and lands
//! both in the same column-major [`Table`] with relationship columns
//! flattened to `object.field`.
//!
//! ## Security
//!
//! - The session id is redacted in Debug output
//! - Tracing skips credential parameters
//! - Filter-list keys are SOQL-escaped before they are spliced into a query
//!
//! ## Crates
//!
//! - **forcepull-client** - Session transport: async-API requests with the
//!   `X-SFDC-Session` header, REST requests with bearer auth
//! - **forcepull-table** - Column-major table, CSV decoding, relationship
//!   flattening
//! - **forcepull-bulk** - Async Bulk API: job lifecycle, batch polling,
//!   CSV results
//! - **forcepull-soql** - Synchronous queries with filter-list fan-out
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use forcepull::{BulkClient, QueryClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let instance = "https://myorg.my.salesforce.com";
//!     let session_id = std::env::var("SF_SESSION_ID")?;
//!
//!     // Large extract through the Bulk API
//!     let mut bulk = BulkClient::new(instance, &session_id)?;
//!     let accounts = bulk
//!         .run_query("Account", "SELECT Id, Name FROM Account")
//!         .await?;
//!
//!     // Relationship query through the REST endpoint
//!     let contacts = QueryClient::new(instance, &session_id)?
//!         .query("SELECT Id, Name, Account.Name FROM Contact")
//!         .await?;
//!
//!     println!("{} accounts, {} contacts", accounts.num_rows(), contacts.num_rows());
//!     Ok(())
//! }
//! ```

// Re-export the crates for convenient access
#[cfg(feature = "bulk")]
pub use forcepull_bulk as bulk;
#[cfg(feature = "client")]
pub use forcepull_client as client;
#[cfg(feature = "soql")]
pub use forcepull_soql as soql;
#[cfg(feature = "table")]
pub use forcepull_table as table;

// Re-export commonly used types at the top level
#[cfg(feature = "bulk")]
pub use forcepull_bulk::{BatchPoller, BatchState, BulkClient, JobSpec};
#[cfg(feature = "client")]
pub use forcepull_client::{ClientConfig, SalesforceSession};
#[cfg(feature = "soql")]
pub use forcepull_soql::QueryClient;
#[cfg(feature = "table")]
pub use forcepull_table::{NormalizeOptions, Table};

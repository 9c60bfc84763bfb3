//! # forcepull-bulk
//!
//! Salesforce async Bulk API client: job lifecycle, batch polling, CSV
//! results.
//!
//! ## Features
//!
//! - **Job Lifecycle** - Create, close and track query and ingest jobs
//! - **Batch Submission** - Submit query or CSV batches, with the target
//!   object inferred from the query when no job is given
//! - **Status Polling** - Cached status reads plus a `BatchPoller` state
//!   machine with a pluggable delay source
//! - **CSV Results** - Completed batches decode straight into a
//!   [`Table`](forcepull_table::Table)
//!
//! ## Example
//!
//! ```rust,ignore
//! use forcepull_bulk::BulkClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), forcepull_bulk::Error> {
//!     let mut client = BulkClient::new(
//!         "https://myorg.my.salesforce.com",
//!         "session_id",
//!     )?;
//!
//!     let table = client
//!         .run_query("Account", "SELECT Id, Name FROM Account")
//!         .await?;
//!     println!("{} rows", table.num_rows());
//!
//!     Ok(())
//! }
//! ```
//!
//! Lower-level control over the same pipeline:
//!
//! ```rust,ignore
//! use forcepull_bulk::{BatchPoller, BulkClient};
//!
//! let mut client = BulkClient::new(instance_url, session_id)?;
//! let job_id = client.create_query_job("Account").await?;
//! let batch_id = client.submit_batch(Some(&job_id), soql).await?;
//! BatchPoller::new(&mut client, &job_id, &batch_id).wait().await?;
//! client.close_job(&job_id).await?;
//! let table = client.fetch_batch_result(&job_id, &batch_id).await?;
//! ```

mod client;
mod error;
mod poller;
mod results;
mod types;

pub use client::BulkClient;
pub use error::{Error, ErrorKind, Result};
pub use poller::{BatchPoll, BatchPoller, Sleeper, TokioSleeper};
pub use types::{
    BatchProgress, BatchState, BatchStatus, ConcurrencyMode, ContentType, JobOperation, JobSpec,
};

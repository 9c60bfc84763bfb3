//! # forcepull-client
//!
//! Session transport for the Salesforce APIs used by the higher-level
//! crates (`forcepull-bulk`, `forcepull-soql`).
//!
//! The async bulk API (`/services/async/{version}`) authenticates with the
//! `X-SFDC-Session` header and speaks XML job documents; the REST query API
//! (`/services/data/v{version}`) takes the same session id as a bearer token
//! and speaks JSON. `SalesforceSession` owns that split so callers only pick
//! a request shape:
//!
//! ```rust,ignore
//! use forcepull_client::SalesforceSession;
//!
//! let session = SalesforceSession::new(
//!     "https://myorg.my.salesforce.com",
//!     "session_id_here",
//! )?;
//!
//! // Async bulk API, XML in/out
//! let job_xml = session.post_xml(&session.async_url("job"), job_doc).await?;
//!
//! // REST query API, JSON out
//! let page: QueryResult<serde_json::Value> =
//!     session.query("SELECT Id FROM Account").await?;
//! ```
//!
//! Every response with status >= 400 becomes `ErrorKind::Api` carrying the
//! numeric status and the response body. Transient failures surface to the
//! caller; nothing is retried here.

mod config;
mod error;
mod query;
pub mod security;
mod session;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use query::QueryResult;
pub use session::{SalesforceSession, CSV_CONTENT_TYPE, XML_CONTENT_TYPE};

/// Default Salesforce API version
pub const DEFAULT_API_VERSION: &str = "62.0";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("forcepull/", env!("CARGO_PKG_VERSION"));

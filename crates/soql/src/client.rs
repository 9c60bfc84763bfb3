//! Synchronous SOQL query client.

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use forcepull_client::{ClientConfig, SalesforceSession};
use forcepull_table::{normalize, NormalizeOptions, Table};

use crate::error::Result;
use crate::filter::{dedup_keys, render_filter_list, FILTER_CHUNK_SIZE};

/// Synchronous (REST) SOQL query client.
///
/// Queries come back as flattened [`Table`]s: relationship columns are
/// expanded into `object.field` columns and numeric-looking text columns
/// are coerced to numbers.
///
/// # Example
///
/// ```rust,ignore
/// use forcepull_soql::QueryClient;
///
/// let client = QueryClient::new(
///     "https://myorg.my.salesforce.com",
///     "session_id_here",
/// )?;
///
/// let table = client
///     .query("SELECT Id, Name, Owner.Name FROM Account")
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct QueryClient {
    session: SalesforceSession,
}

impl QueryClient {
    /// Create a new query client.
    pub fn new(instance_url: impl Into<String>, session_id: impl Into<String>) -> Result<Self> {
        let session = SalesforceSession::new(instance_url, session_id)?;
        Ok(Self::from_session(session))
    }

    /// Create a new query client with custom HTTP configuration.
    pub fn with_config(
        instance_url: impl Into<String>,
        session_id: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let session = SalesforceSession::with_config(instance_url, session_id, config)?;
        Ok(Self::from_session(session))
    }

    /// Create a query client from an existing session.
    pub fn from_session(session: SalesforceSession) -> Self {
        Self { session }
    }

    /// Get the underlying session.
    pub fn session(&self) -> &SalesforceSession {
        &self.session
    }

    /// Set the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.session = self.session.with_api_version(version);
        self
    }

    /// Run a query and return the flattened result table.
    ///
    /// Follows `nextRecordsUrl` pagination to the end, flattens
    /// relationship columns with the default options and coerces
    /// numeric-looking text columns.
    pub async fn query(&self, soql: &str) -> Result<Table> {
        self.query_with(soql, &NormalizeOptions::default()).await
    }

    /// Run a query with caller-provided normalization options.
    #[instrument(skip(self, soql, options))]
    pub async fn query_with(&self, soql: &str, options: &NormalizeOptions) -> Result<Table> {
        let records: Vec<Map<String, Value>> = self.session.query_all(soql).await?;
        debug!(records = records.len(), "normalizing query result");

        let mut table = normalize(records, options)?;
        table.coerce_numeric();
        Ok(table)
    }

    /// Run a filter-list query, fanning out over chunks of the key list.
    ///
    /// `template` is the query up to but not including the parenthesized
    /// list, e.g. `SELECT Id FROM Account WHERE Id IN`. The keys are
    /// deduplicated (first-seen order), split into chunks of
    /// [`FILTER_CHUNK_SIZE`], and one query per chunk is issued with the
    /// chunk rendered as a quoted list. The per-chunk tables are
    /// concatenated in chunk order.
    pub async fn filtered_query<S: AsRef<str>>(
        &self,
        template: &str,
        keys: &[S],
    ) -> Result<Table> {
        self.filtered_query_with(template, keys, &NormalizeOptions::default())
            .await
    }

    /// Filter-list query with caller-provided normalization options.
    #[instrument(skip(self, template, keys, options), fields(key_count = keys.len()))]
    pub async fn filtered_query_with<S: AsRef<str>>(
        &self,
        template: &str,
        keys: &[S],
        options: &NormalizeOptions,
    ) -> Result<Table> {
        let distinct = dedup_keys(keys);
        debug!(
            distinct = distinct.len(),
            chunks = distinct.chunks(FILTER_CHUNK_SIZE).count(),
            "fanning out filter-list query"
        );

        let mut combined = Table::new();
        for chunk in distinct.chunks(FILTER_CHUNK_SIZE) {
            let soql = format!("{} {}", template, render_filter_list(chunk));
            let table = self.query_with(&soql, options).await?;
            combined.append(table);
        }
        Ok(combined)
    }
}

//! SOQL query execution over the REST API, with pagination.

use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::error::Result;
use crate::session::SalesforceSession;

/// One page of a SOQL query response.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct QueryResult<T> {
    /// Total number of records matching the query.
    #[serde(rename = "totalSize")]
    pub total_size: u64,

    /// Whether all records are returned (no more pages).
    pub done: bool,

    /// URL to fetch the next batch of results.
    #[serde(rename = "nextRecordsUrl")]
    pub next_records_url: Option<String>,

    /// The records.
    pub records: Vec<T>,
}

impl SalesforceSession {
    /// Execute a SOQL query. Returns the first page of results; use
    /// `query_all` for automatic pagination.
    ///
    /// # Security
    ///
    /// User-provided values interpolated into the WHERE clause MUST be
    /// escaped with `crate::security::soql::escape_string` first.
    #[instrument(skip(self))]
    pub async fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<QueryResult<T>> {
        let encoded = urlencoding::encode(soql);
        let url = format!("{}?q={}", self.rest_url("query"), encoded);
        self.get_json(&url).await
    }

    /// Execute a SOQL query and fetch every page.
    #[instrument(skip(self))]
    pub async fn query_all<T: DeserializeOwned>(&self, soql: &str) -> Result<Vec<T>> {
        let mut all_records = Vec::new();
        let mut result: QueryResult<T> = self.query(soql).await?;

        all_records.append(&mut result.records);

        while let Some(next_url) = result.next_records_url.take() {
            result = self.get_json(&next_url).await?;
            all_records.append(&mut result.records);
        }

        Ok(all_records)
    }
}

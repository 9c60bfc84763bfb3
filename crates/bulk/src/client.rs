//! Async Bulk API client.
//!
//! Drives the job and batch lifecycle: create a job, submit batches,
//! poll batch status, close the job. Job ids, the batch-to-job map and
//! the batch-status cache are instance state, so two clients never see
//! each other's registries.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use tracing::instrument;

use forcepull_client::{ClientConfig, SalesforceSession, CSV_CONTENT_TYPE};

use crate::error::{Error, ErrorKind, Result};
use crate::types::{close_job_xml, info_field, BatchProgress, BatchState, BatchStatus, JobSpec};

/// Default interval between batch status polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Async Bulk API client.
///
/// Owns the session plus per-instance lifecycle state:
/// - registry of job ids created through this client
/// - map from batch id to its owning job id
/// - cache of the last seen status per batch id
///
/// # Example
///
/// ```rust,ignore
/// use forcepull_bulk::BulkClient;
///
/// let mut client = BulkClient::new(
///     "https://myorg.my.salesforce.com",
///     "session_id_here",
/// )?;
///
/// // Create a query job, submit the query, wait, fetch the table
/// let table = client
///     .run_query("Account", "SELECT Id, Name FROM Account")
///     .await?;
/// ```
pub struct BulkClient {
    pub(crate) session: SalesforceSession,
    jobs: HashSet<String>,
    batches: HashMap<String, String>,
    status_cache: HashMap<String, BatchStatus>,
    poll_interval: Duration,
    progress: Option<Box<dyn Fn(BatchProgress) + Send + Sync>>,
}

impl fmt::Debug for BulkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkClient")
            .field("session", &self.session)
            .field("jobs", &self.jobs)
            .field("batches", &self.batches)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl BulkClient {
    /// Create a new Bulk API client.
    pub fn new(instance_url: impl Into<String>, session_id: impl Into<String>) -> Result<Self> {
        let session = SalesforceSession::new(instance_url, session_id)?;
        Ok(Self::from_session(session))
    }

    /// Create a new Bulk API client with custom HTTP configuration.
    pub fn with_config(
        instance_url: impl Into<String>,
        session_id: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let session = SalesforceSession::with_config(instance_url, session_id, config)?;
        Ok(Self::from_session(session))
    }

    /// Create a Bulk API client from an existing session.
    pub fn from_session(session: SalesforceSession) -> Self {
        Self {
            session,
            jobs: HashSet::new(),
            batches: HashMap::new(),
            status_cache: HashMap::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            progress: None,
        }
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

    /// Set the interval between batch status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Install a progress hook, invoked when a completed batch's result is
    /// fetched. Observational only.
    pub fn with_progress_hook(
        mut self,
        hook: impl Fn(BatchProgress) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(hook));
        self
    }

    /// Get the configured poll interval.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    // =========================================================================
    // Registries
    // =========================================================================

    /// Job ids created through this client.
    pub fn jobs(&self) -> impl Iterator<Item = &str> {
        self.jobs.iter().map(String::as_str)
    }

    /// The job a batch was submitted to, if it went through this client.
    pub fn job_for_batch(&self, batch_id: &str) -> Option<&str> {
        self.batches.get(batch_id).map(String::as_str)
    }

    /// Last status seen for a batch, if it was ever polled.
    pub fn cached_status(&self, batch_id: &str) -> Option<&BatchStatus> {
        self.status_cache.get(batch_id)
    }

    // =========================================================================
    // Job Operations
    // =========================================================================

    /// Create a new job and register its id.
    #[instrument(skip(self, spec), fields(object = %spec.object))]
    pub async fn create_job(&mut self, spec: JobSpec) -> Result<String> {
        let url = self.session.async_url("job");
        let response = self.session.post_xml(&url, spec.to_xml()).await?;
        let job_id = info_field(&response, "id").ok_or_else(|| {
            Error::new(ErrorKind::InvalidResponse(
                "job creation response carries no id".to_string(),
            ))
        })?;
        self.jobs.insert(job_id.clone());
        Ok(job_id)
    }

    /// Create a CSV query job for an object.
    pub async fn create_query_job(&mut self, object: &str) -> Result<String> {
        self.create_job(JobSpec::query(object)).await
    }

    /// Submit a batch payload to a job.
    ///
    /// With `job_id = None`, the target object is inferred from the token
    /// after the payload's (case-insensitive) `FROM` and a query job is
    /// created for it first. A payload without a `FROM` clause is an error.
    #[instrument(skip(self, payload))]
    pub async fn submit_batch(&mut self, job_id: Option<&str>, payload: &str) -> Result<String> {
        let job_id = match job_id {
            Some(id) => id.to_string(),
            None => {
                let object = object_from_query(payload).ok_or_else(|| {
                    Error::new(ErrorKind::Job(
                        "cannot infer an object: payload has no FROM clause".to_string(),
                    ))
                })?;
                self.create_query_job(&object).await?
            }
        };

        let url = self.session.async_url(&format!("job/{job_id}/batch"));
        let response = self
            .session
            .post_raw(&url, payload.to_string(), CSV_CONTENT_TYPE)
            .await?;
        let batch_id = info_field(&response, "id").ok_or_else(|| {
            Error::new(ErrorKind::InvalidResponse(
                "batch submission response carries no id".to_string(),
            ))
        })?;
        self.batches.insert(batch_id.clone(), job_id);
        Ok(batch_id)
    }

    /// Close a job. Closed jobs accept no further batches; queued batches
    /// keep processing.
    #[instrument(skip(self))]
    pub async fn close_job(&mut self, job_id: &str) -> Result<()> {
        let url = self.session.async_url(&format!("job/{job_id}"));
        self.session.post_xml(&url, close_job_xml()).await?;
        Ok(())
    }

    // =========================================================================
    // Batch Status
    // =========================================================================

    /// Get a batch's status, served from the cache when possible.
    ///
    /// `force_reload` skips the cache and re-requests; either way a fresh
    /// poll overwrites the cached entry for this batch id.
    #[instrument(skip(self))]
    pub async fn poll_batch_status(
        &mut self,
        job_id: &str,
        batch_id: &str,
        force_reload: bool,
    ) -> Result<BatchStatus> {
        if !force_reload {
            if let Some(status) = self.status_cache.get(batch_id) {
                return Ok(status.clone());
            }
        }

        let url = self
            .session
            .async_url(&format!("job/{job_id}/batch/{batch_id}"));
        let response = self.session.get_text(&url).await?;
        let status = BatchStatus::from_xml(&response);
        self.status_cache.insert(batch_id.to_string(), status.clone());
        Ok(status)
    }

    /// Check whether a batch has completed, with a fresh status poll.
    ///
    /// Returns true on `Completed`, false while the batch is still moving
    /// (or reports no state), and `BatchFailed` when the server reports a
    /// terminal error state.
    #[instrument(skip(self))]
    pub async fn is_batch_terminal_success(
        &mut self,
        job_id: &str,
        batch_id: &str,
    ) -> Result<bool> {
        let status = self.poll_batch_status(job_id, batch_id, true).await?;
        match status.state() {
            Some(state) if state.is_error() => Err(Error::new(ErrorKind::BatchFailed {
                job_id: job_id.to_string(),
                batch_id: batch_id.to_string(),
                state_message: status.state_message().unwrap_or_default().to_string(),
            })),
            Some(BatchState::Completed) => Ok(true),
            _ => Ok(false),
        }
    }

    pub(crate) fn emit_progress(&self, job_id: &str, batch_id: &str, status: &BatchStatus) {
        let Some(hook) = &self.progress else { return };
        hook(BatchProgress {
            job_id: job_id.to_string(),
            batch_id: batch_id.to_string(),
            records_processed: status.records_processed(),
            records_failed: status.records_failed().filter(|count| *count > 0),
        });
    }
}

/// Pull the object name out of a query payload: the token following the
/// first case-insensitive `FROM`, trimmed to its leading identifier chars.
pub(crate) fn object_from_query(query: &str) -> Option<String> {
    let mut tokens = query.split_whitespace();
    while let Some(token) = tokens.next() {
        if token.eq_ignore_ascii_case("from") {
            let object: String = tokens
                .next()?
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            return (!object.is_empty()).then_some(object);
        }
    }
    None
}

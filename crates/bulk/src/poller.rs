//! Batch polling state machine.
//!
//! `BatchPoller` wraps the repeated status checks a batch needs between
//! submission and results. Each `advance` is one fresh poll; `wait` drives
//! `advance` with a delay between polls. The delay source is the `Sleeper`
//! trait so tests run the loop without real time passing.

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::debug;

use crate::client::BulkClient;
use crate::error::Result;
use crate::types::BatchStatus;

/// Pluggable delay source for the polling loop.
pub trait Sleeper: Send + Sync {
    /// Wait for the given duration.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// `Sleeper` backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Outcome of one polling step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchPoll {
    /// Batch is still queued or in progress.
    Pending,
    /// Batch completed; carries the final status.
    Complete(BatchStatus),
}

/// Polling state machine for one batch.
///
/// A terminal error state surfaces as `Err(BatchFailed)` from `advance`
/// and `wait` alike. `wait` has no deadline; callers that need one drive
/// `advance` themselves.
pub struct BatchPoller<'a> {
    client: &'a mut BulkClient,
    job_id: String,
    batch_id: String,
    interval: Duration,
    sleeper: Box<dyn Sleeper>,
}

impl fmt::Debug for BatchPoller<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchPoller")
            .field("job_id", &self.job_id)
            .field("batch_id", &self.batch_id)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl<'a> BatchPoller<'a> {
    /// Create a poller using the client's poll interval and the tokio
    /// timer.
    pub fn new(
        client: &'a mut BulkClient,
        job_id: impl Into<String>,
        batch_id: impl Into<String>,
    ) -> Self {
        let interval = client.poll_interval();
        Self {
            client,
            job_id: job_id.into(),
            batch_id: batch_id.into(),
            interval,
            sleeper: Box::new(TokioSleeper),
        }
    }

    /// Override the interval between polls.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replace the delay source.
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Poll the batch once.
    pub async fn advance(&mut self) -> Result<BatchPoll> {
        if self
            .client
            .is_batch_terminal_success(&self.job_id, &self.batch_id)
            .await?
        {
            // The success check just force-polled, so the cache is fresh.
            let status = self
                .client
                .cached_status(&self.batch_id)
                .cloned()
                .unwrap_or_default();
            return Ok(BatchPoll::Complete(status));
        }
        Ok(BatchPoll::Pending)
    }

    /// Poll until the batch completes, sleeping the interval between polls.
    pub async fn wait(&mut self) -> Result<BatchStatus> {
        loop {
            match self.advance().await? {
                BatchPoll::Complete(status) => return Ok(status),
                BatchPoll::Pending => {
                    debug!(
                        job_id = %self.job_id,
                        batch_id = %self.batch_id,
                        interval = ?self.interval,
                        "batch still pending"
                    );
                    self.sleeper.sleep(self.interval).await;
                }
            }
        }
    }
}

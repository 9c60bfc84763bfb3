//! Batch result retrieval.
//!
//! A completed query batch points at one or more server-side result sets.
//! The manifest lists their ids; this client fetches the first set, decodes
//! it as CSV and materializes a `Table`.

use tracing::{debug, instrument, warn};

use forcepull_table::Table;

use crate::client::BulkClient;
use crate::error::{Error, ErrorKind, Result};
use crate::poller::BatchPoller;
use crate::types::BatchState;

impl BulkClient {
    /// Fetch the result table of a batch.
    ///
    /// Consults the cached status (polling only when the batch was never
    /// polled) and returns `Ok(None)` unless that status is `Completed`;
    /// callers poll to completion first. On a completed batch this reads
    /// the result manifest, downloads the first listed result set and
    /// decodes it as CSV with the first row as header.
    #[instrument(skip(self))]
    pub async fn fetch_batch_result(
        &mut self,
        job_id: &str,
        batch_id: &str,
    ) -> Result<Option<Table>> {
        let status = self.poll_batch_status(job_id, batch_id, false).await?;
        if status.state() != Some(BatchState::Completed) {
            debug!(
                job_id,
                batch_id,
                state = status.state().map(|s| s.to_string()).unwrap_or_default(),
                "batch not completed, no result to fetch"
            );
            return Ok(None);
        }
        self.emit_progress(job_id, batch_id, &status);

        let manifest_url = self
            .session
            .async_url(&format!("job/{job_id}/batch/{batch_id}/result"));
        let manifest = self.session.get_text(&manifest_url).await?;

        let mut ids = result_ids(&manifest);
        if ids.is_empty() {
            return Err(Error::new(ErrorKind::InvalidResponse(
                "result manifest lists no result id".to_string(),
            )));
        }
        if ids.len() > 1 {
            warn!(
                job_id,
                batch_id,
                result_sets = ids.len(),
                "batch produced multiple result sets, fetching the first only"
            );
        }
        let result_id = ids.swap_remove(0);

        let result_url = self
            .session
            .async_url(&format!("job/{job_id}/batch/{batch_id}/result/{result_id}"));
        let bytes = self.session.get_bytes(&result_url).await?;
        let text = String::from_utf8(bytes.to_vec()).map_err(|err| {
            Error::with_source(
                ErrorKind::InvalidResponse("result set is not valid UTF-8".to_string()),
                err,
            )
        })?;

        let table = Table::from_csv_str(&text)?;
        debug!(
            job_id,
            batch_id,
            rows = table.num_rows(),
            columns = table.num_columns(),
            "decoded batch result"
        );
        Ok(Some(table))
    }

    /// Run a query through the bulk pipeline end to end.
    ///
    /// Creates a CSV query job for `object`, submits `soql` as its one
    /// batch, polls until the batch completes, closes the job and fetches
    /// the result table.
    #[instrument(skip(self, soql))]
    pub async fn run_query(&mut self, object: &str, soql: &str) -> Result<Table> {
        let job_id = self.create_query_job(object).await?;
        let batch_id = self.submit_batch(Some(&job_id), soql).await?;

        BatchPoller::new(self, &job_id, &batch_id).wait().await?;

        self.close_job(&job_id).await?;
        let table = self.fetch_batch_result(&job_id, &batch_id).await?;
        table.ok_or_else(|| {
            Error::new(ErrorKind::Job(format!(
                "batch {batch_id} completed but returned no result"
            )))
        })
    }
}

/// Result-set ids listed in a batch result manifest, in document order.
fn result_ids(manifest: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut rest = manifest;
    while let Some(start) = rest.find("<result>") {
        rest = &rest[start + "<result>".len()..];
        let Some(end) = rest.find("</result>") else { break };
        ids.push(rest[..end].trim().to_string());
        rest = &rest[end + "</result>".len()..];
    }
    ids
}

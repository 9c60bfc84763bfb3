//! Shared scaffolding: a mock org serving the async-API and REST routes.

use wiremock::matchers::{body_string, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JOB_XMLNS: &str = "http://www.force.com/2009/06/asyncapi/dataload";

/// One-time tracing setup for the test binary.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn job_info(job_id: &str, state: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <jobInfo xmlns=\"{JOB_XMLNS}\">\n\
           <id>{job_id}</id>\n\
           <state>{state}</state>\n\
         </jobInfo>"
    )
}

fn batch_info(batch_id: &str, state: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <batchInfo xmlns=\"{JOB_XMLNS}\">\n\
           <id>{batch_id}</id>\n\
           <state>{state}</state>\n\
           <numberRecordsProcessed>2</numberRecordsProcessed>\n\
           <numberRecordsFailed>0</numberRecordsFailed>\n\
         </batchInfo>"
    )
}

/// Mock org backing one test.
pub struct MockOrg {
    pub server: MockServer,
}

impl MockOrg {
    pub async fn start() -> Self {
        init_tracing();
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Expect exactly one job creation for `object`, answering `job_id`.
    pub async fn expect_create_job(&self, object: &str, job_id: &str) {
        Mock::given(method("POST"))
            .and(path("/services/async/62.0/job"))
            .and(body_string_contains(format!("<object>{object}</object>")))
            .respond_with(ResponseTemplate::new(201).set_body_string(job_info(job_id, "Open")))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Expect exactly one batch submission carrying `payload`.
    pub async fn expect_submit_batch(&self, job_id: &str, batch_id: &str, payload: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/services/async/62.0/job/{job_id}/batch")))
            .and(body_string(payload.to_string()))
            .respond_with(
                ResponseTemplate::new(201).set_body_string(batch_info(batch_id, "Queued")),
            )
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Serve the given states for consecutive status polls; the last state
    /// repeats for any further polls.
    pub async fn batch_status_sequence(&self, job_id: &str, batch_id: &str, states: &[&str]) {
        let (last, moving) = states.split_last().expect("at least one state");
        for state in moving {
            Mock::given(method("GET"))
                .and(path(format!(
                    "/services/async/62.0/job/{job_id}/batch/{batch_id}"
                )))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string(batch_info(batch_id, state)),
                )
                .up_to_n_times(1)
                .mount(&self.server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path(format!(
                "/services/async/62.0/job/{job_id}/batch/{batch_id}"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_string(batch_info(batch_id, last)))
            .mount(&self.server)
            .await;
    }

    /// Serve a one-entry result manifest and the CSV behind it.
    pub async fn serve_result(&self, job_id: &str, batch_id: &str, result_id: &str, csv: &str) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/services/async/62.0/job/{job_id}/batch/{batch_id}/result"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<result-list xmlns=\"{JOB_XMLNS}\"><result>{result_id}</result></result-list>"
            )))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!(
                "/services/async/62.0/job/{job_id}/batch/{batch_id}/result/{result_id}"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_string(csv.to_string()))
            .mount(&self.server)
            .await;
    }

    /// Expect exactly one close for `job_id`.
    pub async fn expect_close_job(&self, job_id: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/services/async/62.0/job/{job_id}")))
            .and(body_string_contains("<state>Closed</state>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(job_info(job_id, "Closed")))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Serve one final REST query page for an exact SOQL string.
    pub async fn serve_query(&self, soql: &str, records: serde_json::Value) {
        let total = records.as_array().map(Vec::len).unwrap_or(0);
        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/query"))
            .and(query_param("q", soql))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": total,
                "done": true,
                "records": records
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }
}

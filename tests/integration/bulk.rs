//! Bulk API lifecycle tests against the mock org.

use forcepull::bulk::BatchPoll;
use forcepull::{BatchPoller, BatchState, BulkClient, JobSpec};

use super::common::MockOrg;

#[tokio::test]
async fn test_account_bulk_query_lifecycle() {
    let org = MockOrg::start().await;
    org.expect_create_job("Account", "750AB0").await;
    org.expect_submit_batch("750AB0", "751AB0", "SELECT Id FROM Account")
        .await;
    org.batch_status_sequence("750AB0", "751AB0", &["InProgress", "Completed"])
        .await;
    org.serve_result(
        "750AB0",
        "751AB0",
        "752AB0",
        "Id\n001xx000003DGb1AAG\n001xx000003DGb2AAG\n",
    )
    .await;
    org.expect_close_job("750AB0").await;

    let mut client = BulkClient::new(org.uri(), "00Dxx!session").unwrap();

    let job_id = client.create_job(JobSpec::query("Account")).await.unwrap();
    assert_eq!(job_id, "750AB0");

    let batch_id = client
        .submit_batch(Some(&job_id), "SELECT Id FROM Account")
        .await
        .unwrap();
    assert_eq!(batch_id, "751AB0");

    // First poll sees the batch in flight, the second sees it done.
    let mut poller = BatchPoller::new(&mut client, &job_id, &batch_id);
    assert_eq!(poller.advance().await.unwrap(), BatchPoll::Pending);
    match poller.advance().await.unwrap() {
        BatchPoll::Complete(status) => {
            assert_eq!(status.state(), Some(BatchState::Completed));
        }
        BatchPoll::Pending => panic!("batch should have completed on the second poll"),
    }

    client.close_job(&job_id).await.unwrap();

    let table = client
        .fetch_batch_result(&job_id, &batch_id)
        .await
        .unwrap()
        .expect("completed batch must yield a table");

    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["Id"]);
    assert_eq!(table.num_rows(), 2);
    assert_eq!(
        table.get(0, "Id"),
        Some(&serde_json::json!("001xx000003DGb1AAG"))
    );
    assert_eq!(
        table.get(1, "Id"),
        Some(&serde_json::json!("001xx000003DGb2AAG"))
    );
}

#[tokio::test]
async fn test_run_query_drives_whole_pipeline() {
    let org = MockOrg::start().await;
    org.expect_create_job("Account", "750RQ0").await;
    org.expect_submit_batch("750RQ0", "751RQ0", "SELECT Id, Name FROM Account")
        .await;
    org.batch_status_sequence("750RQ0", "751RQ0", &["Completed"]).await;
    org.serve_result("750RQ0", "751RQ0", "752RQ0", "Id,Name\n001xxA,Acme\n001xxB,Globex\n")
        .await;
    org.expect_close_job("750RQ0").await;

    let mut client = BulkClient::new(org.uri(), "00Dxx!session").unwrap();
    let table = client
        .run_query("Account", "SELECT Id, Name FROM Account")
        .await
        .unwrap();

    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.get(1, "Name"), Some(&serde_json::json!("Globex")));
    // Registries track what went through this client
    assert!(client.jobs().any(|id| id == "750RQ0"));
    assert_eq!(client.job_for_batch("751RQ0"), Some("750RQ0"));
}

//! Cross-client workflow: bulk-extract ids, then query details by id list.

use serde_json::json;

use forcepull::{BulkClient, QueryClient, SalesforceSession};

use super::common::MockOrg;

#[tokio::test]
async fn test_bulk_extract_feeds_filtered_query() {
    let org = MockOrg::start().await;

    // Bulk side: extract the ids of every account.
    org.expect_create_job("Account", "750WF0").await;
    org.expect_submit_batch("750WF0", "751WF0", "SELECT Id FROM Account")
        .await;
    org.batch_status_sequence("750WF0", "751WF0", &["Queued", "Completed"])
        .await;
    org.serve_result("750WF0", "751WF0", "752WF0", "Id\n001xxA\n001xxB\n")
        .await;
    org.expect_close_job("750WF0").await;

    // REST side: pull names for exactly those ids.
    org.serve_query(
        "SELECT Id, Name FROM Account WHERE Id IN ('001xxA', '001xxB')",
        json!([
            {"attributes": {"type": "Account"}, "Id": "001xxA", "Name": "Acme"},
            {"attributes": {"type": "Account"}, "Id": "001xxB", "Name": "Globex"}
        ]),
    )
    .await;

    // Both clients share one session.
    let session = SalesforceSession::new(org.uri(), "00Dxx!session").unwrap();
    let mut bulk = BulkClient::from_session(session.clone())
        .with_poll_interval(std::time::Duration::from_millis(1));

    let ids_table = bulk
        .run_query("Account", "SELECT Id FROM Account")
        .await
        .unwrap();
    let ids: Vec<String> = ids_table
        .column("Id")
        .expect("bulk extract has an Id column")
        .cells()
        .iter()
        .map(|cell| cell.as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(ids, vec!["001xxA", "001xxB"]);

    let details = QueryClient::from_session(session)
        .filtered_query("SELECT Id, Name FROM Account WHERE Id IN", &ids)
        .await
        .unwrap();

    assert_eq!(details.num_rows(), 2);
    assert_eq!(details.get(0, "Name"), Some(&json!("Acme")));
    assert_eq!(details.get(1, "Name"), Some(&json!("Globex")));
}

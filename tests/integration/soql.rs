//! REST query tests against the mock org.

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use forcepull::QueryClient;

use super::common::MockOrg;

#[tokio::test]
async fn test_relationship_query_follows_pagination() {
    let org = MockOrg::start().await;
    let soql = "SELECT Id, NumberOfEmployees, Owner.Name FROM Account";

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/query"))
        .and(query_param("q", soql))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 3,
            "done": false,
            "nextRecordsUrl": "/services/data/v62.0/query/01gxx-2000",
            "records": [
                {
                    "attributes": {"type": "Account", "url": "/a/001xxA"},
                    "Id": "001xxA",
                    "NumberOfEmployees": "120",
                    "Owner": {"attributes": {"type": "User"}, "Name": "Ada"}
                },
                {
                    "attributes": {"type": "Account", "url": "/a/001xxB"},
                    "Id": "001xxB",
                    "NumberOfEmployees": "7",
                    "Owner": null
                }
            ]
        })))
        .expect(1)
        .mount(&org.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/query/01gxx-2000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 3,
            "done": true,
            "records": [
                {
                    "attributes": {"type": "Account", "url": "/a/001xxC"},
                    "Id": "001xxC",
                    "NumberOfEmployees": "5500",
                    "Owner": {"attributes": {"type": "User"}, "Name": "Grace"}
                }
            ]
        })))
        .expect(1)
        .mount(&org.server)
        .await;

    let client = QueryClient::new(org.uri(), "00Dxx!session").unwrap();
    let table = client.query(soql).await.unwrap();

    // All pages land in one flattened table
    assert_eq!(table.num_rows(), 3);
    assert!(!table.has_column("Owner"));
    assert!(!table.has_column("attributes"));
    assert_eq!(table.get(0, "User.Name"), Some(&json!("Ada")));
    assert_eq!(table.get(1, "User.Name"), Some(&Value::Null));
    assert_eq!(table.get(2, "User.Name"), Some(&json!("Grace")));
    assert_eq!(table.get(2, "NumberOfEmployees"), Some(&json!(5500)));
}

/// Renders the wire format the fan-out must produce, independent of the
/// client's own renderer.
fn quoted_list(keys: &[String]) -> String {
    let quoted: Vec<String> = keys.iter().map(|key| format!("'{key}'")).collect();
    format!("({})", quoted.join(", "))
}

#[tokio::test]
async fn test_filter_list_fanout_chunks_by_300() {
    let org = MockOrg::start().await;
    let template = "SELECT Id FROM Account WHERE Id IN";
    let keys: Vec<String> = (0..301).map(|i| format!("001xx{i:04}")).collect();

    org.serve_query(
        &format!("{} {}", template, quoted_list(&keys[..300])),
        json!([{"attributes": {"type": "Account"}, "Id": "001xx0000"}]),
    )
    .await;
    org.serve_query(
        &format!("{} {}", template, quoted_list(&keys[300..])),
        json!([{"attributes": {"type": "Account"}, "Id": "001xx0300"}]),
    )
    .await;

    let client = QueryClient::new(org.uri(), "00Dxx!session").unwrap();
    let table = client.filtered_query(template, &keys).await.unwrap();

    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.get(0, "Id"), Some(&json!("001xx0000")));
    assert_eq!(table.get(1, "Id"), Some(&json!("001xx0300")));
    assert_eq!(org.server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_filter_list_dedups_before_chunking() {
    let org = MockOrg::start().await;
    let template = "SELECT Id FROM Contact WHERE AccountId IN";

    // Three keys, two distinct: exactly one query goes out.
    org.serve_query(&format!("{template} ('001xxA', '001xxB')"), json!([]))
        .await;

    let client = QueryClient::new(org.uri(), "00Dxx!session").unwrap();
    let table = client
        .filtered_query(template, &["001xxA", "001xxB", "001xxA"])
        .await
        .unwrap();

    assert_eq!(table.num_rows(), 0);
    assert_eq!(org.server.received_requests().await.unwrap().len(), 1);
}

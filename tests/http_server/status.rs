use alertbridge::test_helpers::{TEST_HOST_NAME, TEST_UUID};

use crate::helpers::*;

#[tokio::test]
async fn status_endpoint_returns_status_json() {
    let server = TestServer::new().await;

    let resp = server.get("/status").await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["uuid"], TEST_UUID);
    assert_eq!(body["host_name"], TEST_HOST_NAME);
    assert_eq!(body["active_endpoint"], "http://icinga:5665/");
    assert!(body["uptime_secs"].as_u64().is_some());
    assert_eq!(body["webhooks_received"], 0);

    server.cleanup().await;
}

#[tokio::test]
async fn status_endpoint_counts_processed_alerts() {
    let server = TestServer::new().await;

    let resp = server
        .post("/webhook")
        .bearer_auth(TOKEN)
        .json(&firing_payload("DiskFull", "critical"))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = server.get("/status").await.json().await.unwrap();
    assert_eq!(body["webhooks_received"], 1);
    assert_eq!(body["alerts_synced"], 1);
    assert_eq!(body["alerts_failed"], 0);

    server.cleanup().await;
}

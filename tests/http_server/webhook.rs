use std::sync::Arc;

use alertbridge::{
    models::ExitStatus,
    object_store::InMemoryObjectStore,
    test_helpers::TEST_HOST_NAME,
};
use url::Url;

use crate::helpers::*;

#[tokio::test]
async fn webhook_creates_service_with_header_token() {
    let server = TestServer::new().await;

    let resp = server
        .post("/webhook")
        .bearer_auth(TOKEN)
        .json(&firing_payload("DiskFull", "critical"))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "Status": 200, "Message": "success" }));

    let services = server.store.services().await;
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].display_name, "DiskFull");
    assert_eq!(services[0].host_name, TEST_HOST_NAME);
    assert_eq!(services[0].state, Some(ExitStatus::Critical));

    let results = server.store.check_results().await;
    assert_eq!(results[0].1.plugin_output, "DiskFull on db-1");

    server.cleanup().await;
}

#[tokio::test]
async fn webhook_accepts_query_token() {
    let server = TestServer::new().await;

    let resp = server
        .post(&format!("/webhook?token={TOKEN}"))
        .json(&firing_payload("DiskFull", "warning"))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), 200);
    assert_eq!(server.store.services().await.len(), 1);

    server.cleanup().await;
}

#[tokio::test]
async fn webhook_rejects_missing_token() {
    let server = TestServer::new().await;

    let resp = server
        .post("/webhook")
        .json(&firing_payload("DiskFull", "critical"))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["Status"], 401);
    assert_eq!(body["Message"], "Request does not contain an authorization token");
    assert!(server.store.services().await.is_empty());

    server.cleanup().await;
}

#[tokio::test]
async fn webhook_rejects_malformed_payload() {
    let server = TestServer::new().await;

    let resp = server
        .post("/webhook")
        .bearer_auth(TOKEN)
        .body("{\"alerts\": [")
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), 400);

    server.cleanup().await;
}

#[tokio::test]
async fn webhook_fails_when_service_host_is_missing() {
    let store = Arc::new(InMemoryObjectStore::new(Url::parse("http://icinga:5665").unwrap()));
    let server = TestServer::with_store(store).await;

    let resp = server
        .post("/webhook")
        .bearer_auth(TOKEN)
        .json(&firing_payload("DiskFull", "critical"))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), 500);
    assert!(server.store.services().await.is_empty());

    server.cleanup().await;
}

#[tokio::test]
async fn concurrent_deliveries_of_one_alert_yield_one_service() {
    let server = TestServer::new().await;
    let payload = firing_payload("DiskFull", "critical");

    let requests = (0..5).map(|_| {
        server.post("/webhook").bearer_auth(TOKEN).json(&payload).send()
    });
    for resp in futures::future::join_all(requests).await {
        assert_eq!(resp.expect("Request failed").status(), 200);
    }

    assert_eq!(server.store.services().await.len(), 1);

    server.cleanup().await;
}

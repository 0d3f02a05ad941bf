use std::{net::SocketAddr, sync::Arc};

use alertbridge::{
    config::AppConfig,
    context::AppMetrics,
    engine::ServiceSynchronizer,
    http_server::{self, ApiState},
    models::Host,
    object_store::InMemoryObjectStore,
    test_helpers::{TEST_HOST_NAME, create_test_app_config},
};
use reqwest::Client;
use tokio::task;
use tokio_util::sync::CancellationToken;
use url::Url;

pub const TOKEN: &str = "test-token";

pub fn create_test_server_config(address: &str) -> AppConfig {
    let mut config = create_test_app_config();
    config.server.listen_address = address.to_string();
    config.server.bearer_token = Some(TOKEN.to_string());
    config
}

pub fn firing_payload(alertname: &str, severity: &str) -> serde_json::Value {
    serde_json::json!({
        "version": "4",
        "groupKey": "{}:{alertname=\"DiskFull\"}",
        "status": "firing",
        "receiver": "icinga",
        "groupLabels": {"alertname": alertname},
        "commonLabels": {"alertname": alertname},
        "commonAnnotations": {},
        "externalURL": "http://alertmanager:9093",
        "alerts": [{
            "status": "firing",
            "labels": {"alertname": alertname, "severity": severity, "instance": "db-1"},
            "annotations": {"message": format!("{alertname} on db-1")},
            "startsAt": "2024-05-01T10:00:00Z",
            "endsAt": "0001-01-01T00:00:00Z",
            "generatorURL": "http://prometheus:9090/graph",
            "fingerprint": "c0ffee"
        }]
    })
}

pub struct TestServer {
    pub address: SocketAddr,
    pub server_handle: task::JoinHandle<()>,
    pub client: Client,
    pub store: Arc<InMemoryObjectStore>,
    cancellation_token: CancellationToken,
}

impl TestServer {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryObjectStore::new(Url::parse("http://icinga:5665").unwrap()));
        store.insert_host(Host::new(TEST_HOST_NAME, "dummy")).await;
        Self::with_store(store).await
    }

    pub async fn with_store(store: Arc<InMemoryObjectStore>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get address");
        drop(listener); // Release port for the app to use

        let config = Arc::new(create_test_server_config(&addr.to_string()));
        let state = ApiState {
            config: Arc::clone(&config),
            synchronizer: Arc::new(ServiceSynchronizer::new(store.clone(), config)),
            store: store.clone(),
            app_metrics: AppMetrics::default(),
        };

        let cancellation_token = CancellationToken::new();
        let server_token = cancellation_token.clone();
        let server_handle = task::spawn(async move {
            http_server::run_server_from_config(state, server_token)
                .await
                .expect("Server failed");
        });

        // Wait for server to start
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;

        Self { address: addr, server_handle, client: Client::new(), store, cancellation_token }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        let url = format!("http://{}{}", self.address, path);
        self.client.get(&url).send().await.expect("Request failed")
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("http://{}{}", self.address, path);
        self.client.post(&url)
    }

    pub async fn cleanup(self) {
        self.cancellation_token.cancel();
        let _ = self.server_handle.await;
    }
}

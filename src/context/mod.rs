//! Application context and initialization logic.
//! This module handles loading configuration and connecting the object store
//! client to the first reachable Icinga2 endpoint. The `AppContext` struct
//! encapsulates these components for use throughout the application.

mod error;
mod metrics;

use std::sync::Arc;

pub use error::AppContextError;
pub use metrics::{AppMetrics, Metrics};

use crate::{
    config::AppConfig,
    object_store::{FailoverStore, IcingaClient, ObjectStore},
};

/// The application context, holding configuration and the connected object
/// store.
pub struct AppContext {
    /// Shared application configuration.
    pub config: AppConfig,

    /// The object store, wrapped in endpoint failover.
    pub store: Arc<dyn ObjectStore>,
}

/// A builder for the `AppContext`, allowing configuration overrides
/// and step-by-step initialization.
pub struct AppContextBuilder {
    /// Optional configuration directory to load settings from.
    config_dir: Option<String>,
}

impl AppContextBuilder {
    /// Creates a new `AppContextBuilder` with an optional configuration
    /// directory.
    pub fn new(config_dir: Option<String>) -> Self {
        Self { config_dir }
    }

    /// Builds the `AppContext`: loads the configuration, creates the Icinga2
    /// client and connects it to the first reachable endpoint. Fails when no
    /// endpoint answers.
    pub async fn build(self) -> Result<AppContext, AppContextError> {
        tracing::debug!("Loading application configuration...");
        let config = AppConfig::new(self.config_dir.as_deref())?;
        tracing::debug!(
            uuid = %config.uuid,
            host = %config.host_name,
            urls = ?config.object_store.urls,
            "Configuration loaded."
        );

        let store = Self::connect(&config).await?;
        Ok(AppContext { config, store })
    }

    /// Creates the failover-wrapped Icinga2 client and probes the endpoints.
    pub async fn connect(config: &AppConfig) -> Result<Arc<dyn ObjectStore>, AppContextError> {
        let client = Arc::new(IcingaClient::new(&config.object_store)?);
        let failover = Arc::new(FailoverStore::new(
            client,
            config.object_store.urls.clone(),
            config.object_store.reconnect_grace,
        ));
        let active = failover.connect().await?;
        tracing::info!(url = %active, retry_policy = ?config.object_store.http_retry, "Object store client initialized.");
        Ok(failover)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &std::path::Path, url: &str) {
        let content = format!(
            r#"
uuid: "5a7c1f2e-1111-4222-8333-944455556666"
host_name: "alertbridge_lab"
object_store:
  urls:
    - "{url}"
  username: "bridge"
  password: "secret"
"#
        );
        std::fs::write(dir.join("app.yaml"), content).unwrap();
    }

    #[tokio::test]
    async fn test_build_connects_to_reachable_endpoint() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/v1").with_status(200).with_body("{}").create_async().await;

        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), &server.url());

        let context = AppContextBuilder::new(Some(dir.path().to_string_lossy().to_string()))
            .build()
            .await
            .unwrap();
        assert_eq!(context.store.active_url().await.as_str(), format!("{}/", server.url()));
    }

    #[tokio::test]
    async fn test_build_fails_without_reachable_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "http://127.0.0.1:1");

        let result =
            AppContextBuilder::new(Some(dir.path().to_string_lossy().to_string())).build().await;
        assert!(matches!(result, Err(AppContextError::Failover(_))));
    }
}

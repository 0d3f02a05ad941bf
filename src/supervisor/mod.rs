//! The Supervisor module manages the lifecycle of the bridge.
//!
//! It owns the long-running services: the webhook server, the heartbeat
//! emitter and the garbage collector. It listens for shutdown signals
//! (Ctrl+C or SIGTERM) and cancels every service when one of them fails,
//! so the process exits instead of running partially.

mod builder;

use std::sync::Arc;

pub use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    config::AppConfig,
    context::AppMetrics,
    engine::{GarbageCollector, HeartbeatEmitter, ServiceSynchronizer, SyncError},
    http_server::{self, ApiState},
    object_store::ObjectStore,
};

/// Represents the set of errors that can occur during the supervisor's
/// operation.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// An object store was not provided to the `SupervisorBuilder`.
    #[error("Missing object store for Supervisor")]
    MissingObjectStore,

    /// The service host could not be created.
    #[error("Failed to set up service host: {0}")]
    HostSetup(#[source] SyncError),
}

/// The primary runtime manager for the application.
pub struct Supervisor {
    /// Shared application configuration.
    config: Arc<AppConfig>,

    /// The object store all services write to.
    store: Arc<dyn ObjectStore>,

    /// The shared application metrics.
    app_metrics: AppMetrics,

    /// Reflects alerts into the object store.
    synchronizer: Arc<ServiceSynchronizer>,

    /// A token used to signal a graceful shutdown to all supervised tasks.
    cancellation_token: CancellationToken,

    /// A set of all spawned tasks that the supervisor is actively managing.
    join_set: tokio::task::JoinSet<()>,
}

impl Supervisor {
    /// Creates a new Supervisor instance with all its required components.
    pub fn new(config: AppConfig, store: Arc<dyn ObjectStore>, app_metrics: AppMetrics) -> Self {
        let config = Arc::new(config);
        let synchronizer =
            Arc::new(ServiceSynchronizer::new(Arc::clone(&store), Arc::clone(&config)));
        Self {
            config,
            store,
            app_metrics,
            synchronizer,
            cancellation_token: CancellationToken::new(),
            join_set: tokio::task::JoinSet::new(),
        }
    }

    /// Returns a new `SupervisorBuilder` instance.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// A handle that shuts the supervisor down when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Starts all services and blocks until shutdown.
    ///
    /// Creates the service host first when `create_host` is set; failing to
    /// do so is fatal. A missing host is otherwise only reported, since the
    /// webhook rejects batches until it appears.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        if self.config.server.bearer_token.is_none() {
            tracing::warn!("No bearer token configured, the webhook accepts unauthenticated requests.");
        }

        match self.synchronizer.ensure_host(self.config.create_host).await {
            Ok(_) => {}
            Err(e) if self.config.create_host => return Err(SupervisorError::HostSetup(e)),
            Err(e) => tracing::warn!(error = %e, "Service host is not available yet."),
        }

        let cancellation_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("Failed to register SIGTERM handler")
                    .recv()
                    .await;
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
                _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
                _ = cancellation_token.cancelled() => {}
            }

            cancellation_token.cancel();
        });

        let state = ApiState {
            config: Arc::clone(&self.config),
            synchronizer: Arc::clone(&self.synchronizer),
            store: Arc::clone(&self.store),
            app_metrics: self.app_metrics.clone(),
        };
        let http_cancellation_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            if let Err(e) =
                http_server::run_server_from_config(state, http_cancellation_token.clone()).await
            {
                tracing::error!(error = %e, "HTTP server failed. Initiating shutdown.");
                http_cancellation_token.cancel();
            }
        });

        let heartbeat = HeartbeatEmitter::new(Arc::clone(&self.store), Arc::clone(&self.config));
        let heartbeat_cancellation_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            heartbeat.run(heartbeat_cancellation_token).await;
        });

        let gc = GarbageCollector::new(Arc::clone(&self.store), Arc::clone(&self.config));
        let gc_cancellation_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            gc.run(gc_cancellation_token).await;
        });

        loop {
            tokio::select! {
                maybe_result = self.join_set.join_next() => {
                    match maybe_result {
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::error!("A critical task failed: {:?}. Initiating shutdown.", e);
                            self.cancellation_token.cancel();
                        }
                        None => break,
                    }
                }
                _ = self.cancellation_token.cancelled() => break,
            }
        }

        self.join_set.shutdown().await;
        tracing::info!("Supervisor shutdown complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use super::*;
    use crate::{object_store::InMemoryObjectStore, test_helpers::create_test_app_config};

    fn test_config() -> AppConfig {
        let mut config = create_test_app_config();
        config.server.listen_address = "127.0.0.1:0".to_string();
        config.create_host = true;
        config
    }

    #[tokio::test]
    async fn test_run_creates_host_and_stops_on_cancel() {
        let store = Arc::new(InMemoryObjectStore::new(Url::parse("http://icinga:5665").unwrap()));
        let supervisor =
            Supervisor::builder().config(test_config()).store(store.clone()).build().unwrap();
        let token = supervisor.cancellation_token();

        let handle = tokio::spawn(supervisor.run());
        tokio::time::sleep(Duration::from_millis(200)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert!(result.is_ok());
        assert!(store.host("alertbridge_lab").await.is_some());
    }

    #[tokio::test]
    async fn test_run_fails_when_host_cannot_be_created() {
        let url = Url::parse("http://icinga:5665").unwrap();
        let store = Arc::new(InMemoryObjectStore::new(url.clone()));
        store.set_reachable(&url, false).await;

        let supervisor = Supervisor::builder().config(test_config()).store(store).build().unwrap();
        let result = supervisor.run().await;
        assert!(matches!(result, Err(SupervisorError::HostSetup(_))));
    }
}

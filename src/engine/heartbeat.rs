//! The bridge's own liveness signal: a periodic OK result on the
//! `heartbeat` service of the service host.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    config::AppConfig,
    models::{CheckResult, ExitStatus, service::full_service_name},
    object_store::{ObjectStore, ObjectStoreError},
};

/// Name of the service the bridge reports its own liveness to.
pub const HEARTBEAT_SERVICE: &str = "heartbeat";

/// Errors raised while emitting a heartbeat.
#[derive(Debug, Error)]
pub enum HeartbeatError {
    /// The service host does not exist.
    #[error("Service host '{0}' does not exist")]
    MissingHost(String),

    /// The heartbeat service does not exist; it is provisioned in Icinga, not
    /// by the bridge.
    #[error("Heartbeat service '{0}' does not exist")]
    MissingService(String),

    /// The object store failed.
    #[error("Object store error: {0}")]
    Store(#[from] ObjectStoreError),
}

/// Periodically submits `OK: <timestamp>` to `<host>!heartbeat`.
pub struct HeartbeatEmitter {
    store: Arc<dyn ObjectStore>,
    config: Arc<AppConfig>,
}

impl HeartbeatEmitter {
    /// Creates an emitter for the configured host.
    pub fn new(store: Arc<dyn ObjectStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Emits heartbeats every `heartbeat_interval` until cancelled, starting
    /// immediately.
    pub async fn run(&self, cancellation_token: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.heartbeat_interval);
        tracing::info!(interval = ?self.config.heartbeat_interval, "Starting heartbeat.");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.emit(Utc::now()).await {
                        tracing::error!(error = %e, "Failed to send heartbeat.");
                    }
                }
                _ = cancellation_token.cancelled() => {
                    tracing::info!("Heartbeat received shutdown signal.");
                    break;
                }
            }
        }
    }

    /// Submits a single heartbeat stamped with `now`.
    pub async fn emit(&self, now: DateTime<Utc>) -> Result<(), HeartbeatError> {
        let host_name = &self.config.host_name;
        if self.store.get_host(host_name).await?.is_none() {
            return Err(HeartbeatError::MissingHost(host_name.clone()));
        }

        let full_name = full_service_name(host_name, HEARTBEAT_SERVICE);
        let service = self
            .store
            .get_service(&full_name)
            .await?
            .ok_or_else(|| HeartbeatError::MissingService(full_name.clone()))?;

        let output = format!("OK: {}", now.to_rfc3339_opts(SecondsFormat::Secs, true));
        tracing::debug!(service = %full_name, output = %output, "Sending heartbeat.");
        self.store.submit_check_result(&service, &CheckResult::new(ExitStatus::Ok, output)).await?;
        Ok(())
    }
}

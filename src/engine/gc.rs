//! Periodic removal of resolved services owned by this bridge instance.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    config::AppConfig,
    models::{Downtime, ExitStatus, ServiceRecord},
    object_store::{ObjectFilter, ObjectStore, ObjectStoreError},
};

/// Errors that abort a collection cycle.
#[derive(Debug, Error)]
pub enum GcError {
    /// Services could not be listed.
    #[error("Failed to list services: {0}")]
    ListServices(#[source] ObjectStoreError),

    /// Downtimes could not be listed.
    #[error("Failed to list downtimes: {0}")]
    ListDowntimes(#[source] ObjectStoreError),
}

/// Summary of one collection cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcReport {
    /// Services owned by this instance.
    pub examined: usize,
    /// Full names of the deleted services.
    pub deleted: Vec<String>,
    /// Services kept.
    pub retained: usize,
    /// Services whose deletion failed.
    pub failed: usize,
}

/// Why a service survives a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Retention {
    Heartbeat,
    NotOk,
    Downtimed,
    Young,
}

/// Deletes services that have been OK for longer than their `keep_for`.
///
/// Only services tagged with this instance's UUID are considered. Heartbeat
/// services are never collected: they are OK whenever the sender is alive,
/// which is exactly when they must stay.
pub struct GarbageCollector {
    store: Arc<dyn ObjectStore>,
    config: Arc<AppConfig>,
}

impl GarbageCollector {
    /// Creates a collector for the services on the configured host.
    pub fn new(store: Arc<dyn ObjectStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Runs collection cycles every `gc_interval` until cancelled. The first
    /// cycle runs one interval after start.
    pub async fn run(&self, cancellation_token: CancellationToken) {
        let period = self.config.gc_interval;
        let mut interval =
            tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        tracing::info!(interval = ?period, "Starting garbage collector.");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.collect(Utc::now()).await {
                        tracing::error!(error = %e, "Garbage collection cycle aborted.");
                    }
                }
                _ = cancellation_token.cancelled() => {
                    tracing::info!("Garbage collector received shutdown signal.");
                    break;
                }
            }
        }
    }

    /// Runs a single collection cycle as of `now`.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn collect(&self, now: DateTime<Utc>) -> Result<GcReport, GcError> {
        let filter = ObjectFilter::Host(self.config.host_name.clone());
        let services = self.store.list_services(&filter).await.map_err(GcError::ListServices)?;
        let downtimes = self.store.list_downtimes(&filter).await.map_err(GcError::ListDowntimes)?;
        tracing::debug!(
            services = services.len(),
            downtimes = downtimes.len(),
            host = %self.config.host_name,
            "Listed objects for garbage collection."
        );

        let mut report = GcReport::default();
        for service in services.iter().filter(|s| s.owner() == Some(self.config.uuid.as_str())) {
            report.examined += 1;
            let full_name = service.full_name();

            if let Some(reason) = self.retention(service, &downtimes, now) {
                tracing::debug!(service = %full_name, reason = ?reason, "Keeping service.");
                report.retained += 1;
                continue;
            }

            match self.store.delete_service(&full_name).await {
                Ok(()) => {
                    tracing::info!(service = %full_name, "Deleted stale service.");
                    report.deleted.push(full_name);
                }
                Err(e) => {
                    tracing::error!(service = %full_name, error = %e, "Failed to delete service.");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            examined = report.examined,
            deleted = report.deleted.len(),
            retained = report.retained,
            failed = report.failed,
            "Garbage collection completed."
        );
        Ok(report)
    }

    fn retention(
        &self,
        service: &ServiceRecord,
        downtimes: &[Downtime],
        now: DateTime<Utc>,
    ) -> Option<Retention> {
        if service.is_heartbeat() {
            return Some(Retention::Heartbeat);
        }
        if service.state != Some(ExitStatus::Ok) {
            return Some(Retention::NotOk);
        }

        let now_secs = now.timestamp_millis() as f64 / 1000.0;
        if downtimes.iter().any(|d| d.service_name == service.name && d.is_open(now_secs)) {
            return Some(Retention::Downtimed);
        }

        let keep_for = service.keep_for().unwrap_or(self.config.keep_for);
        let age = Duration::from_secs_f64((now_secs - service.last_state_change).max(0.0));
        if age < keep_for { Some(Retention::Young) } else { None }
    }
}

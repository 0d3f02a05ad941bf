use std::sync::Arc;

use tokio::sync::RwLock;

use crate::engine::{SyncError, SyncOutcome};

/// A struct to hold application metrics.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// The time the application started.
    pub start_time: tokio::time::Instant,
    /// Webhook deliveries accepted.
    pub webhooks_received: u64,
    /// Alerts that created or updated a service.
    pub alerts_synced: u64,
    /// Alerts that intentionally touched nothing.
    pub alerts_skipped: u64,
    /// Alerts that failed.
    pub alerts_failed: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            start_time: tokio::time::Instant::now(),
            webhooks_received: 0,
            alerts_synced: 0,
            alerts_skipped: 0,
            alerts_failed: 0,
        }
    }
}

/// Shared application metrics for the HTTP server.
#[derive(Clone, Default)]
pub struct AppMetrics {
    /// Shared metrics.
    pub metrics: Arc<RwLock<Metrics>>,
}

impl AppMetrics {
    /// Counts an accepted webhook delivery and the outcome of its alerts.
    pub async fn record_delivery(&self, results: &[Result<SyncOutcome, SyncError>]) {
        let mut metrics = self.metrics.write().await;
        metrics.webhooks_received += 1;
        for result in results {
            match result {
                Ok(SyncOutcome::Created(_)) | Ok(SyncOutcome::Updated(_)) => metrics.alerts_synced += 1,
                Ok(SyncOutcome::Skipped(_)) => metrics.alerts_skipped += 1,
                Err(_) => metrics.alerts_failed += 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{IdentityError, SkipReason};

    #[tokio::test]
    async fn test_record_delivery() {
        let app_metrics = AppMetrics::default();
        app_metrics
            .record_delivery(&[
                Ok(SyncOutcome::Created("a".into())),
                Ok(SyncOutcome::Updated("b".into())),
                Ok(SyncOutcome::Skipped(SkipReason::ResolvedHeartbeat)),
                Err(SyncError::Identity(IdentityError::InvalidServiceName("x y".into()))),
            ])
            .await;

        let metrics = app_metrics.metrics.read().await;
        assert_eq!(metrics.webhooks_received, 1);
        assert_eq!(metrics.alerts_synced, 2);
        assert_eq!(metrics.alerts_skipped, 1);
        assert_eq!(metrics.alerts_failed, 1);
    }
}

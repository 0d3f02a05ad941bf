//! Represents the `/status` endpoint handler and response structure.
//! Provides application status and metrics.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};

/// Represents the response from the `/status` endpoint.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StatusResponse {
    /// The version of the application.
    pub version: String,
    /// The instance UUID services are tagged with.
    pub uuid: String,
    /// The Icinga host services are attached to.
    pub host_name: String,
    /// The Icinga2 API endpoint currently in use.
    pub active_endpoint: String,
    /// The uptime of the application in seconds.
    pub uptime_secs: u64,
    /// Webhook deliveries accepted.
    pub webhooks_received: u64,
    /// Alerts that created or updated a service.
    pub alerts_synced: u64,
    /// Alerts that intentionally touched nothing.
    pub alerts_skipped: u64,
    /// Alerts that failed.
    pub alerts_failed: u64,
}

/// Retrieves application status and metrics.
pub async fn status(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let active_endpoint = state.store.active_url().await.to_string();
    let metrics = state.app_metrics.metrics.read().await;
    let response = StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uuid: state.config.uuid.clone(),
        host_name: state.config.host_name.clone(),
        active_endpoint,
        uptime_secs: metrics.start_time.elapsed().as_secs(),
        webhooks_received: metrics.webhooks_received,
        alerts_synced: metrics.alerts_synced,
        alerts_skipped: metrics.alerts_skipped,
        alerts_failed: metrics.alerts_failed,
    };
    Ok((StatusCode::OK, Json(response)))
}

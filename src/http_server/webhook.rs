//! The Alertmanager webhook receiver.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use super::{ApiError, ApiState, error::reply};
use crate::models::WebhookData;

/// Decodes an alert batch and reflects it into the object store.
///
/// Individual alert failures are logged and counted but do not fail the
/// request: Alertmanager would otherwise resend the whole group.
pub async fn webhook(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let data: WebhookData =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!(
        receiver = %data.receiver,
        status = %data.status,
        group_labels = ?data.group_labels,
        alerts = data.alerts.len(),
        "Received alert batch."
    );

    state
        .synchronizer
        .ensure_host(false)
        .await
        .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

    let results = state.synchronizer.sync_alerts(&data.alerts).await;
    state.app_metrics.record_delivery(&results).await;

    Ok(reply(StatusCode::OK, "success"))
}

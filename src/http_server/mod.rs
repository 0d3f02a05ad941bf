//! HTTP server module: the Alertmanager webhook receiver plus health and
//! status endpoints.

mod auth;
mod error;
mod status;
mod webhook;

use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, post},
};
pub use error::ApiError;
use serde_json::json;
pub use status::StatusResponse;
use tokio_util::sync::CancellationToken;

use crate::{
    config::AppConfig, context::AppMetrics, engine::ServiceSynchronizer,
    object_store::ObjectStore,
};

/// Shared state of the request handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Reflects alert batches into the object store.
    pub synchronizer: Arc<ServiceSynchronizer>,
    /// The object store, used for status reporting.
    pub store: Arc<dyn ObjectStore>,
    /// Counters exposed on `/status`.
    pub app_metrics: AppMetrics,
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Builds the router. Only `/webhook` requires the bearer token.
pub fn router(state: ApiState) -> Router {
    let webhook = Router::new()
        .route("/webhook", post(webhook::webhook))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::auth));

    Router::new()
        .route("/healthz", get(health))
        .route("/status", get(status::status))
        .merge(webhook)
        .with_state(state)
}

/// Runs the HTTP server on the configured listen address until the
/// cancellation token fires.
pub async fn run_server_from_config(
    state: ApiState,
    cancellation_token: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&state.config.server.listen_address).await?;
    tracing::info!(address = %listener.local_addr()?, "HTTP server listening.");

    let app = router(state);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move { cancellation_token.cancelled().await })
        .await
}

//! Replays a webhook payload against an in-memory object store and prints
//! what the bridge would have written.

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use serde::Serialize;
use thiserror::Error;

use crate::{
    config::AppConfig,
    engine::ServiceSynchronizer,
    models::{CheckResult, Host, ServiceRecord, WebhookData},
    object_store::InMemoryObjectStore,
};

/// Errors of the `dry-run` subcommand.
#[derive(Error, Debug)]
pub enum DryRunError {
    /// The payload file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    /// The payload is not a webhook payload, or the report could not be
    /// serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// No object store URL is configured.
    #[error("No object store URL configured")]
    NoEndpoint,
}

/// Arguments of the `dry-run` subcommand.
#[derive(Parser, Debug)]
pub struct DryRunArgs {
    /// Path to an Alertmanager webhook payload (JSON).
    #[arg(short, long)]
    pub payload: PathBuf,
}

/// What a replayed payload produced.
#[derive(Debug, Serialize)]
pub struct DryRunReport {
    /// Services as they would exist afterwards.
    pub services: Vec<ServiceRecord>,
    /// Check results as `(full service name, result)`, in submission order.
    pub check_results: Vec<(String, CheckResult)>,
    /// Alerts that failed, with the reason.
    pub errors: Vec<String>,
}

/// Replays `data` against an empty in-memory store holding only the service
/// host.
pub async fn replay(config: AppConfig, data: &WebhookData) -> Result<DryRunReport, DryRunError> {
    let config = Arc::new(config);
    let primary = config.object_store.urls.first().cloned().ok_or(DryRunError::NoEndpoint)?;
    let store = Arc::new(InMemoryObjectStore::new(primary));
    store.insert_host(Host::new(&config.host_name, &config.checks.check_command)).await;

    let synchronizer = ServiceSynchronizer::new(store.clone(), Arc::clone(&config));
    let errors = synchronizer
        .sync_alerts(&data.alerts)
        .await
        .into_iter()
        .filter_map(Result::err)
        .map(|e| e.to_string())
        .collect();

    Ok(DryRunReport {
        services: store.services().await,
        check_results: store.check_results().await,
        errors,
    })
}

/// Executes the `dry-run` subcommand.
pub async fn execute(args: DryRunArgs, config_dir: Option<&str>) -> Result<(), DryRunError> {
    let config = AppConfig::new(config_dir)?;
    let payload = std::fs::read(&args.payload)?;
    let data: WebhookData = serde_json::from_slice(&payload)?;
    tracing::info!(path = %args.payload.display(), alerts = data.alerts.len(), "Replaying payload.");

    let report = replay(config, &data).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

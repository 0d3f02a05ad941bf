//! Reflects alerts into services: idempotent upsert followed by a passive
//! check result.

use std::{
    sync::{Arc, LazyLock},
    time::Duration,
};

use regex::Regex;
use thiserror::Error;

use super::{
    identity::{IdentityError, compute_display_name, compute_service_name},
    severity::severity_to_exit_status,
    variables::{ANNOTATION_PREFIX, LABEL_PREFIX, add_static_variables, map_variables},
};
use crate::{
    config::{AppConfig, PluginOutputConfig, SeverityLevels},
    models::{
        Alert, AlertStatus, CheckResult, ExitStatus, Host, ServiceRecord, VarValue, Vars,
        service::{BRIDGE_UUID_VAR, DUMMY_STATE_VAR, DUMMY_TEXT_VAR, KEEP_FOR_VAR, full_service_name},
    },
    object_store::{ObjectStore, ObjectStoreError},
};

/// Margin added to a heartbeat interval so that pushes delayed by the
/// network do not trip the active check.
const HEARTBEAT_SLACK: f64 = 1.1;

/// A heartbeat interval: one or more `<decimal><unit>` components, e.g.
/// `90s`, `1.5m` or `1h30m`.
static HEARTBEAT_INTERVAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]*(?:\.[0-9]*)?(?:ns|us|µs|μs|ms|s|m|h))+$").expect("Is a valid regex")
});

static HEARTBEAT_COMPONENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]*(?:\.[0-9]*)?)(ns|us|µs|μs|ms|s|m|h)").expect("Is a valid regex")
});

/// Why a `heartbeat` label was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeartbeatIntervalError {
    /// The value does not follow the `<decimal><unit>` grammar.
    #[error("expected a duration such as '90s', '1.5m' or '1h30m'")]
    Malformed,

    /// The value parsed to zero or less.
    #[error("interval must be positive")]
    NotPositive,
}

/// Why an alert did not touch the object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A resolved heartbeat carries no information.
    ResolvedHeartbeat,
    /// The alert is OK and there is no service to update.
    NoServiceToUpdate,
}

/// Result of reflecting one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The service was created; holds its name.
    Created(String),
    /// The existing service was updated; holds its name.
    Updated(String),
    /// Nothing was written.
    Skipped(SkipReason),
}

/// Errors raised while reflecting an alert.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No valid service name could be derived from the alert.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// The `heartbeat` label is not a duration.
    #[error("Invalid heartbeat interval '{value}': {source}")]
    InvalidHeartbeat {
        /// The raw label value.
        value: String,
        /// The parse failure.
        #[source]
        source: HeartbeatIntervalError,
    },

    /// The service host does not exist.
    #[error("Service host '{0}' does not exist")]
    MissingHost(String),

    /// The object store rejected or failed an operation.
    #[error("Object store error: {0}")]
    Store(#[from] ObjectStoreError),
}

/// Reflects alerts into services on the configured host.
pub struct ServiceSynchronizer {
    store: Arc<dyn ObjectStore>,
    config: Arc<AppConfig>,
    severity_levels: SeverityLevels,
}

impl ServiceSynchronizer {
    /// Creates a synchronizer writing to `store`.
    pub fn new(store: Arc<dyn ObjectStore>, config: Arc<AppConfig>) -> Self {
        let severity_levels = config.severity_levels();
        Self { store, config, severity_levels }
    }

    /// Checks that the service host exists, creating it when `create` is set.
    pub async fn ensure_host(&self, create: bool) -> Result<Host, SyncError> {
        let host_name = &self.config.host_name;
        if let Some(host) = self.store.get_host(host_name).await? {
            tracing::debug!(host = %host_name, "Found service host.");
            return Ok(host);
        }
        if !create {
            return Err(SyncError::MissingHost(host_name.clone()));
        }

        tracing::info!(host = %host_name, "Creating service host.");
        let mut host = Host::new(host_name, &self.config.checks.check_command);
        host.vars.insert(BRIDGE_UUID_VAR.to_string(), VarValue::from(self.config.uuid.as_str()));
        Ok(self.store.create_host(&host).await?)
    }

    /// Reflects every alert of a batch. A failing alert does not stop the
    /// ones after it.
    pub async fn sync_alerts(&self, alerts: &[Alert]) -> Vec<Result<SyncOutcome, SyncError>> {
        let mut results = Vec::with_capacity(alerts.len());
        for alert in alerts {
            let result = self.sync_alert(alert).await;
            if let Err(e) = &result {
                tracing::error!(alertname = %alert.alertname(), error = %e, "Failed to sync alert.");
            }
            results.push(result);
        }
        results
    }

    /// Upserts the service for `alert` and submits its check result.
    #[tracing::instrument(skip(self, alert), fields(alertname = %alert.alertname(), status = %alert.status))]
    pub async fn sync_alert(&self, alert: &Alert) -> Result<SyncOutcome, SyncError> {
        let heartbeat = match alert.heartbeat() {
            Some(_) if alert.status == AlertStatus::Resolved => {
                tracing::info!("Not processing resolved heartbeat.");
                return Ok(SyncOutcome::Skipped(SkipReason::ResolvedHeartbeat));
            }
            Some(raw) => Some(parse_heartbeat_interval(raw).map_err(|source| {
                SyncError::InvalidHeartbeat { value: raw.to_string(), source }
            })?),
            None => None,
        };

        let name = compute_service_name(alert, &self.config.uuid)?;
        let display_name = compute_display_name(alert);

        let status = severity_to_exit_status(alert.status, alert.severity(), &self.severity_levels);
        let service = self.build_service(alert, name, display_name, status, heartbeat);
        let full_name = service.full_name();

        let outcome = match self.store.get_service(&full_name).await? {
            Some(_) => {
                tracing::info!(service = %full_name, "Updating service.");
                self.store.update_service(&service).await?;
                SyncOutcome::Updated(service.name.clone())
            }
            None if status.is_problem() => {
                tracing::info!(service = %full_name, "Creating service.");
                self.store.create_service(&service).await?;
                SyncOutcome::Created(service.name.clone())
            }
            None => {
                tracing::info!(service = %full_name, state = ?status, "Not creating service for OK alert.");
                return Ok(SyncOutcome::Skipped(SkipReason::NoServiceToUpdate));
            }
        };

        // A heartbeat push is itself the liveness signal; the alert severity
        // only applies once pushes stop and the active check runs.
        let exit_status = if heartbeat.is_some() { ExitStatus::Ok } else { status };
        let result =
            CheckResult::new(exit_status, select_plugin_output(alert, status, &self.config.plugin_output));
        tracing::debug!(service = %full_name, exit_status = ?exit_status, "Submitting check result.");
        self.store.submit_check_result(&service, &result).await?;

        Ok(outcome)
    }

    /// Builds the service record for an alert.
    pub fn build_service(
        &self,
        alert: &Alert,
        name: String,
        display_name: String,
        status: ExitStatus,
        heartbeat: Option<Duration>,
    ) -> ServiceRecord {
        let config = &self.config;

        let mut vars = Vars::new();
        vars.insert(KEEP_FOR_VAR.to_string(), VarValue::Number(config.keep_for.as_secs() as i64));
        map_variables(&mut vars, &alert.labels, LABEL_PREFIX);
        map_variables(&mut vars, &alert.annotations, ANNOTATION_PREFIX);
        add_static_variables(&mut vars, &config.static_service_vars);
        vars.insert(BRIDGE_UUID_VAR.to_string(), VarValue::from(config.uuid.as_str()));

        let interval = config.checks.interval.as_secs_f64();
        let mut service = ServiceRecord {
            name,
            display_name,
            host_name: config.host_name.clone(),
            check_command: config.checks.check_command.clone(),
            enable_active_checks: false,
            vars,
            notes: alert.annotation("description").to_string(),
            action_url: alert.generator_url.clone(),
            notes_url: alert.annotation("runbook_url").to_string(),
            check_interval: interval,
            retry_interval: interval,
            max_check_attempts: config.checks.max_check_attempts,
            ..Default::default()
        };

        if let Some(heartbeat) = heartbeat {
            tracing::debug!(interval = ?heartbeat, "Shaping service as heartbeat.");
            let interval = heartbeat.as_secs_f64() * HEARTBEAT_SLACK;
            service.check_interval = interval;
            service.retry_interval = interval;
            service.enable_active_checks = true;
            service.vars.insert(
                DUMMY_TEXT_VAR.to_string(),
                VarValue::Text(select_plugin_output(alert, status, &config.plugin_output)),
            );
            service.vars.insert(DUMMY_STATE_VAR.to_string(), VarValue::Number(status.code()));
        }

        service
    }

    /// The `<host>!<service>` name an alert maps to.
    pub fn full_name_for(&self, alert: &Alert) -> Result<String, SyncError> {
        let name = compute_service_name(alert, &self.config.uuid)?;
        Ok(full_service_name(&self.config.host_name, &name))
    }
}

/// Parses a `heartbeat` label value into a positive interval.
///
/// Components are summed, so `1h30m` is 5400 seconds. A bare `0` and signed
/// values are accepted by the grammar but rejected as not positive.
pub fn parse_heartbeat_interval(raw: &str) -> Result<Duration, HeartbeatIntervalError> {
    let raw = raw.trim();
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if unsigned == "0" {
        return Err(HeartbeatIntervalError::NotPositive);
    }
    if !HEARTBEAT_INTERVAL_PATTERN.is_match(unsigned) {
        return Err(HeartbeatIntervalError::Malformed);
    }

    let mut seconds = 0.0;
    for component in HEARTBEAT_COMPONENT_PATTERN.captures_iter(unsigned) {
        let value: f64 = component[1].parse().map_err(|_| HeartbeatIntervalError::Malformed)?;
        let unit = match &component[2] {
            "ns" => 1e-9,
            "us" | "µs" | "μs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            _ => 3600.0,
        };
        seconds += value * unit;
    }

    if negative || seconds <= 0.0 {
        return Err(HeartbeatIntervalError::NotPositive);
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| HeartbeatIntervalError::Malformed)
}

/// Picks the plugin output from the configured annotations.
///
/// Keys are tried in order. With `by_states` set, `<key>_<state>` (e.g.
/// `message_critical`) is preferred over `<key>`. The first non-empty value
/// wins; without one the output is empty.
pub fn select_plugin_output(alert: &Alert, status: ExitStatus, config: &PluginOutputConfig) -> String {
    for key in &config.annotations {
        if config.by_states {
            let value = alert.annotation(&format!("{key}_{}", status.suffix()));
            if !value.is_empty() {
                return value.to_string();
            }
        }
        let value = alert.annotation(key);
        if !value.is_empty() {
            return value.to_string();
        }
    }
    String::new()
}

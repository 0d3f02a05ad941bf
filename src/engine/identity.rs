//! Deterministic naming of the service an alert is reflected into.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::{Alert, alert::SEVERITY_LABEL};

/// Object names Icinga accepts for services.
static SERVICE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+_.:,a-zA-Z0-9]{1,128}$").expect("Is a valid regex"));

/// Bytes of the label digest kept in the service name.
const LABEL_HASH_BYTES: usize = 8;

/// Errors raised while naming a service.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The computed name contains characters Icinga rejects or is too long.
    #[error("Service name '{0}' does not match the object name constraints")]
    InvalidServiceName(String),
}

/// Whether `name` is a valid service object name.
pub fn validate_service_name(name: &str) -> bool {
    SERVICE_NAME_PATTERN.is_match(name)
}

/// Renders the labels, minus `severity`, as `key:value ` pairs sorted by key.
///
/// The result does not depend on map iteration order, so an alert keeps its
/// identity across deliveries and when only its severity changes.
pub fn stable_label_string(alert: &Alert) -> String {
    let mut keys: Vec<&String> = alert.labels.keys().filter(|k| *k != SEVERITY_LABEL).collect();
    keys.sort();
    keys.into_iter().map(|k| format!("{}:{} ", k, alert.labels[k])).collect()
}

/// Computes the service name: `<alertname>_<labelhash>`.
///
/// The label hash is the hex encoded first eight bytes of
/// `sha256(instance_uuid || stable_label_string)`. Salting with the instance
/// UUID keeps instances sharing a host from touching each other's services.
pub fn compute_service_name(alert: &Alert, instance_uuid: &str) -> Result<String, IdentityError> {
    let mut hasher = Sha256::new();
    hasher.update(instance_uuid.as_bytes());
    hasher.update(stable_label_string(alert).as_bytes());
    let label_hash = hex::encode(&hasher.finalize()[..LABEL_HASH_BYTES]);

    let alertname = alert.alertname();
    let name = if alertname.is_empty() {
        tracing::debug!(label_hash = %label_hash, "Alert has no alertname label, naming service by hash only.");
        label_hash
    } else {
        format!("{alertname}_{label_hash}")
    };

    if validate_service_name(&name) { Ok(name) } else { Err(IdentityError::InvalidServiceName(name)) }
}

/// The human readable service name: the `alertname` label, possibly empty.
pub fn compute_display_name(alert: &Alert) -> String {
    alert.alertname().to_string()
}

//! The Alertmanager webhook payload.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label holding the alert name.
pub const ALERTNAME_LABEL: &str = "alertname";

/// Label holding the severity keyword.
pub const SEVERITY_LABEL: &str = "severity";

/// Label marking an alert as a heartbeat; the value is the expected interval.
pub const HEARTBEAT_LABEL: &str = "heartbeat";

/// A grouped batch of alerts as posted by Alertmanager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookData {
    /// Payload format version.
    #[serde(default)]
    pub version: String,
    /// Key identifying the alert group.
    #[serde(default)]
    pub group_key: String,
    /// Name of the receiver that delivered the batch.
    #[serde(default)]
    pub receiver: String,
    /// Status of the group as a whole.
    #[serde(default)]
    pub status: AlertStatus,
    /// The alerts of this group.
    pub alerts: Vec<Alert>,
    /// Labels the group was formed by.
    #[serde(default)]
    pub group_labels: HashMap<String, String>,
    /// Labels shared by every alert in the group.
    #[serde(default)]
    pub common_labels: HashMap<String, String>,
    /// Annotations shared by every alert in the group.
    #[serde(default)]
    pub common_annotations: HashMap<String, String>,
    /// Link back to the Alertmanager.
    #[serde(default, rename = "externalURL")]
    pub external_url: String,
}

/// Whether an alert is currently active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// The alert condition holds.
    Firing,
    /// The alert condition cleared.
    Resolved,
    /// Anything Alertmanager might send that we do not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertStatus::Firing => "firing",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A single alert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Firing or resolved.
    #[serde(default)]
    pub status: AlertStatus,
    /// Identifying labels.
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Informational annotations.
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    /// When the alert started firing.
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// When the alert resolved, if it did.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Link to the expression that generated the alert.
    #[serde(default, rename = "generatorURL")]
    pub generator_url: String,
    /// Alertmanager's fingerprint of the label set.
    #[serde(default)]
    pub fingerprint: String,
}

impl Alert {
    /// The `alertname` label, empty if missing.
    pub fn alertname(&self) -> &str {
        self.label(ALERTNAME_LABEL)
    }

    /// The `severity` label, empty if missing.
    pub fn severity(&self) -> &str {
        self.label(SEVERITY_LABEL)
    }

    /// The raw `heartbeat` label, if this is a heartbeat alert.
    pub fn heartbeat(&self) -> Option<&str> {
        self.labels.get(HEARTBEAT_LABEL).map(String::as_str)
    }

    /// A label value, empty if missing.
    pub fn label(&self, key: &str) -> &str {
        self.labels.get(key).map(String::as_str).unwrap_or_default()
    }

    /// An annotation value, empty if missing.
    pub fn annotation(&self, key: &str) -> &str {
        self.annotations.get(key).map(String::as_str).unwrap_or_default()
    }
}

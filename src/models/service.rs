//! Icinga service objects managed by the bridge.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use super::{ExitStatus, deserialize_count, deserialize_null_default};

/// Variable tagging a service with the UUID of the bridge instance owning it.
pub const BRIDGE_UUID_VAR: &str = "bridge_uuid";

/// Variable holding the retention of a resolved service, in seconds.
pub const KEEP_FOR_VAR: &str = "keep_for";

/// Variable holding the output of the fallback active check of a heartbeat.
pub const DUMMY_TEXT_VAR: &str = "dummy_text";

/// Variable holding the state of the fallback active check of a heartbeat.
pub const DUMMY_STATE_VAR: &str = "dummy_state";

/// Prefixed variable carrying the `heartbeat` label.
pub const HEARTBEAT_VAR: &str = "label_heartbeat";

/// A custom variable value.
///
/// The bridge only ever writes strings and integers. Anything else found on
/// an object read back from Icinga is preserved as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    /// An integer.
    Number(i64),
    /// A string.
    Text(String),
    /// Any other JSON value.
    Other(serde_json::Value),
}

impl VarValue {
    /// The value as an integer, accepting floats as Icinga sometimes reports
    /// numbers that way.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            VarValue::Number(n) => Some(*n),
            VarValue::Other(value) => value.as_f64().map(|f| f as i64),
            VarValue::Text(_) => None,
        }
    }

    /// The value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            VarValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for VarValue {
    fn from(value: i64) -> Self {
        VarValue::Number(value)
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        VarValue::Text(value)
    }
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        VarValue::Text(value.to_string())
    }
}

/// Custom variables of an Icinga object.
pub type Vars = BTreeMap<String, VarValue>;

/// A service object, both as written by the bridge and as read back from
/// Icinga.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Object name, unique per host.
    #[serde(default)]
    pub name: String,
    /// Human readable name.
    #[serde(default)]
    pub display_name: String,
    /// The host the service belongs to.
    #[serde(default)]
    pub host_name: String,
    /// Check command, a passive placeholder.
    #[serde(default)]
    pub check_command: String,
    /// Whether Icinga runs the check command itself.
    #[serde(default)]
    pub enable_active_checks: bool,
    /// Custom variables.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub vars: Vars,
    /// Free text notes.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub notes: String,
    /// Link shown as the action URL.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub action_url: String,
    /// Link shown as the notes URL.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub notes_url: String,
    /// Check interval in seconds.
    #[serde(default)]
    pub check_interval: f64,
    /// Retry interval in seconds.
    #[serde(default)]
    pub retry_interval: f64,
    /// Attempts before a hard state.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub max_check_attempts: u32,
    /// Current state. Only present on objects read from Icinga.
    #[serde(default, skip_serializing)]
    pub state: Option<ExitStatus>,
    /// Unix timestamp of the last state change. Only present on objects read
    /// from Icinga.
    #[serde(default, skip_serializing)]
    pub last_state_change: f64,
}

impl ServiceRecord {
    /// The `<host>!<service>` name Icinga addresses services by.
    pub fn full_name(&self) -> String {
        full_service_name(&self.host_name, &self.name)
    }

    /// Whether the service was created from a heartbeat alert.
    pub fn is_heartbeat(&self) -> bool {
        self.vars.contains_key(HEARTBEAT_VAR)
    }

    /// The UUID of the bridge instance that owns the service.
    pub fn owner(&self) -> Option<&str> {
        self.vars.get(BRIDGE_UUID_VAR).and_then(VarValue::as_str)
    }

    /// Retention of this service once it is OK, as stored at creation time.
    pub fn keep_for(&self) -> Option<Duration> {
        self.vars
            .get(KEEP_FOR_VAR)
            .and_then(VarValue::as_i64)
            .map(|secs| Duration::from_secs(secs.max(0) as u64))
    }
}

/// Builds the `<host>!<service>` name.
pub fn full_service_name(host_name: &str, service_name: &str) -> String {
    format!("{host_name}!{service_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_record_helpers() {
        let mut service = ServiceRecord {
            name: "DiskFull_0123456789abcdef".to_string(),
            host_name: "bridge".to_string(),
            ..Default::default()
        };
        service.vars.insert(BRIDGE_UUID_VAR.to_string(), "uuid-1".into());
        service.vars.insert(KEEP_FOR_VAR.to_string(), 3600.into());

        assert_eq!(service.full_name(), "bridge!DiskFull_0123456789abcdef");
        assert_eq!(service.owner(), Some("uuid-1"));
        assert_eq!(service.keep_for(), Some(Duration::from_secs(3600)));
        assert!(!service.is_heartbeat());
    }

    #[test]
    fn test_deserialize_icinga_attrs() {
        let json = r#"{
            "name": "DiskFull_0123456789abcdef",
            "host_name": "bridge",
            "display_name": "DiskFull",
            "check_command": "dummy",
            "enable_active_checks": false,
            "vars": {"bridge_uuid": "uuid-1", "keep_for": 3600.0, "tags": ["a"], "b": 42},
            "notes": null,
            "state": 2.0,
            "last_state_change": 1714557600.25,
            "check_interval": 43200.0,
            "retry_interval": 43200.0,
            "max_check_attempts": 1.0
        }"#;

        let service: ServiceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(service.state, Some(ExitStatus::Critical));
        assert_eq!(service.notes, "");
        assert_eq!(service.vars.get("b"), Some(&VarValue::Number(42)));
        assert_eq!(service.keep_for(), Some(Duration::from_secs(3600)));
        assert!(matches!(service.vars.get("tags"), Some(VarValue::Other(_))));
        assert_eq!(service.max_check_attempts, 1);
    }

    #[test]
    fn test_max_check_attempts_accepts_integers_and_rejects_fractions() {
        let service: ServiceRecord = serde_json::from_str(r#"{"max_check_attempts": 3}"#).unwrap();
        assert_eq!(service.max_check_attempts, 3);

        assert!(serde_json::from_str::<ServiceRecord>(r#"{"max_check_attempts": 1.5}"#).is_err());
        assert!(serde_json::from_str::<ServiceRecord>(r#"{"max_check_attempts": -1.0}"#).is_err());
    }

    #[test]
    fn test_read_only_fields_are_not_serialized() {
        let service = ServiceRecord { state: Some(ExitStatus::Ok), ..Default::default() };
        let json = serde_json::to_value(&service).unwrap();
        assert!(json.get("state").is_none());
        assert!(json.get("last_state_change").is_none());
    }
}

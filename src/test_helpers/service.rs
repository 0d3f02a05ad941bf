//! A builder for creating `ServiceRecord` instances as Icinga reports them.

use chrono::{DateTime, Utc};

use super::{TEST_HOST_NAME, TEST_UUID};
use crate::models::{
    ExitStatus, ServiceRecord, VarValue,
    service::{BRIDGE_UUID_VAR, HEARTBEAT_VAR, KEEP_FOR_VAR},
};

/// A builder for services read back from the object store. Services belong
/// to the test host and instance and are `OK` unless configured otherwise.
#[derive(Debug, Clone)]
pub struct ServiceBuilder {
    service: ServiceRecord,
}

impl ServiceBuilder {
    /// Creates a builder for the service `name`.
    pub fn new(name: &str) -> Self {
        let mut service = ServiceRecord {
            name: name.to_string(),
            display_name: name.to_string(),
            host_name: TEST_HOST_NAME.to_string(),
            check_command: "dummy".to_string(),
            max_check_attempts: 1,
            state: Some(ExitStatus::Ok),
            ..Default::default()
        };
        service.vars.insert(BRIDGE_UUID_VAR.to_string(), VarValue::from(TEST_UUID));
        Self { service }
    }

    /// Sets the owning instance; an empty value removes the tag.
    pub fn owner(mut self, uuid: &str) -> Self {
        if uuid.is_empty() {
            self.service.vars.remove(BRIDGE_UUID_VAR);
        } else {
            self.service.vars.insert(BRIDGE_UUID_VAR.to_string(), VarValue::from(uuid));
        }
        self
    }

    /// Sets the per-service retention in seconds.
    pub fn keep_for(mut self, secs: i64) -> Self {
        self.service.vars.insert(KEEP_FOR_VAR.to_string(), VarValue::Number(secs));
        self
    }

    /// Marks the service as created from a heartbeat alert.
    pub fn heartbeat(mut self, interval: &str) -> Self {
        self.service.vars.insert(HEARTBEAT_VAR.to_string(), VarValue::from(interval));
        self
    }

    /// Sets the current state.
    pub fn state(mut self, state: ExitStatus) -> Self {
        self.service.state = Some(state);
        self
    }

    /// Sets the time of the last state change.
    pub fn changed_at(mut self, at: DateTime<Utc>) -> Self {
        self.service.last_state_change = at.timestamp() as f64;
        self
    }

    /// Builds the `ServiceRecord`.
    pub fn build(self) -> ServiceRecord {
        self.service
    }
}

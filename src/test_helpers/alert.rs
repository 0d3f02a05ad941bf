//! A builder for creating `Alert` instances for testing.

use std::collections::HashMap;

use crate::models::{Alert, AlertStatus, alert::ALERTNAME_LABEL};

/// A builder for creating `Alert` instances for testing. Alerts are firing
/// unless marked resolved.
#[derive(Debug, Clone)]
pub struct AlertBuilder {
    status: AlertStatus,
    labels: HashMap<String, String>,
    annotations: HashMap<String, String>,
    generator_url: String,
}

impl AlertBuilder {
    /// Creates a builder for an alert named `alertname`. An empty name leaves
    /// the `alertname` label out.
    pub fn new(alertname: &str) -> Self {
        let mut labels = HashMap::new();
        if !alertname.is_empty() {
            labels.insert(ALERTNAME_LABEL.to_string(), alertname.to_string());
        }
        Self {
            status: AlertStatus::Firing,
            labels,
            annotations: HashMap::new(),
            generator_url: String::new(),
        }
    }

    /// Adds a label.
    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Adds an annotation.
    pub fn annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }

    /// Sets the alert status.
    pub fn status(mut self, status: AlertStatus) -> Self {
        self.status = status;
        self
    }

    /// Marks the alert as resolved.
    pub fn resolved(self) -> Self {
        self.status(AlertStatus::Resolved)
    }

    /// Sets the generator URL.
    pub fn generator_url(mut self, url: &str) -> Self {
        self.generator_url = url.to_string();
        self
    }

    /// Builds the `Alert`.
    pub fn build(self) -> Alert {
        Alert {
            status: self.status,
            labels: self.labels,
            annotations: self.annotations,
            starts_at: None,
            ends_at: None,
            generator_url: self.generator_url,
            fingerprint: String::new(),
        }
    }
}

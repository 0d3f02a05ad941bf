use std::time::Duration;

use serde::Deserialize;

use super::deserialize_duration_from_str;

fn default_check_interval() -> Duration {
    Duration::from_secs(12 * 60 * 60)
}

fn default_max_check_attempts() -> u32 {
    1
}

fn default_check_command() -> String {
    "dummy".to_string()
}

fn default_plugin_output_annotations() -> Vec<String> {
    vec!["message".to_string(), "description".to_string(), "summary".to_string()]
}

fn default_by_states() -> bool {
    true
}

/// Check settings applied to every service the bridge creates.
#[derive(Debug, Deserialize, Clone)]
pub struct ChecksConfig {
    /// Check and retry interval for regular (non heartbeat) services. State
    /// is pushed, so this only needs to be long enough never to fire between
    /// two alert deliveries.
    #[serde(default = "default_check_interval", deserialize_with = "deserialize_duration_from_str")]
    pub interval: Duration,

    /// Soft states are not needed: Alertmanager already applies `for:` grace
    /// periods.
    #[serde(default = "default_max_check_attempts")]
    pub max_check_attempts: u32,

    /// The passive placeholder check command.
    #[serde(default = "default_check_command")]
    pub check_command: String,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            interval: default_check_interval(),
            max_check_attempts: default_max_check_attempts(),
            check_command: default_check_command(),
        }
    }
}

/// Selects which annotation becomes the plugin output of a check result.
#[derive(Debug, Deserialize, Clone)]
pub struct PluginOutputConfig {
    /// Annotation keys to try, in order.
    #[serde(default = "default_plugin_output_annotations")]
    pub annotations: Vec<String>,

    /// Prefer `<key>_<state>` (e.g. `message_critical`) over `<key>`.
    #[serde(default = "default_by_states")]
    pub by_states: bool,
}

impl Default for PluginOutputConfig {
    fn default() -> Self {
        Self { annotations: default_plugin_output_annotations(), by_states: default_by_states() }
    }
}

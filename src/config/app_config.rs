use std::{collections::HashMap, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::{
    ChecksConfig, ObjectStoreConfig, PluginOutputConfig, ServerConfig, SeverityLevels,
    deserialize_duration_from_str,
};

fn default_heartbeat_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_gc_interval() -> Duration {
    Duration::from_secs(15 * 60)
}

fn default_keep_for() -> Duration {
    Duration::from_secs(168 * 60 * 60)
}

/// Application configuration for alertbridge.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Instance UUID. Every service this instance creates is tagged with it,
    /// and it salts the service name hash.
    pub uuid: String,

    /// The Icinga host all services are attached to.
    pub host_name: String,

    /// Create the service host at startup when it does not exist yet.
    #[serde(default)]
    pub create_host: bool,

    /// Icinga2 API connection settings.
    pub object_store: ObjectStoreConfig,

    /// Webhook server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Interval of the bridge's own heartbeat check result.
    #[serde(default = "default_heartbeat_interval", deserialize_with = "deserialize_duration_from_str")]
    pub heartbeat_interval: Duration,

    /// Interval of the garbage collection sweep.
    #[serde(default = "default_gc_interval", deserialize_with = "deserialize_duration_from_str")]
    pub gc_interval: Duration,

    /// How long a resolved service is kept before it is garbage collected.
    #[serde(default = "default_keep_for", deserialize_with = "deserialize_duration_from_str")]
    pub keep_for: Duration,

    /// Variables set on every created service unless the alert already
    /// provides them.
    #[serde(default)]
    pub static_service_vars: HashMap<String, String>,

    /// Additional or overriding severity keyword levels (`0`..=`3`).
    #[serde(default)]
    pub custom_severity_levels: HashMap<String, String>,

    /// Plugin output selection.
    #[serde(default)]
    pub plugin_output: PluginOutputConfig,

    /// Check settings of created services.
    #[serde(default)]
    pub checks: ChecksConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            uuid: String::new(),
            host_name: String::new(),
            create_host: false,
            object_store: ObjectStoreConfig::default(),
            server: ServerConfig::default(),
            heartbeat_interval: default_heartbeat_interval(),
            gc_interval: default_gc_interval(),
            keep_for: default_keep_for(),
            static_service_vars: HashMap::new(),
            custom_severity_levels: HashMap::new(),
            plugin_output: PluginOutputConfig::default(),
            checks: ChecksConfig::default(),
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading `app.yaml` from the configuration
    /// directory, overridden by `ALERTBRIDGE__*` environment variables.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)))
            .add_source(
                Environment::with_prefix("ALERTBRIDGE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("object_store.urls")
                    .with_list_parse_key("object_store.templates")
                    .with_list_parse_key("plugin_output.annotations")
                    .try_parsing(true),
            )
            .build()?;
        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants the deserializer cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uuid.trim().is_empty() {
            return Err(ConfigError::Message("uuid must not be empty".into()));
        }
        if self.host_name.trim().is_empty() {
            return Err(ConfigError::Message("host_name must not be empty".into()));
        }
        if self.object_store.urls.is_empty() {
            return Err(ConfigError::Message("object_store.urls must not be empty".into()));
        }
        if self.heartbeat_interval.is_zero() || self.gc_interval.is_zero() {
            return Err(ConfigError::Message("intervals must be greater than zero".into()));
        }
        Ok(())
    }

    /// The built-in severity levels merged with `custom_severity_levels`.
    pub fn severity_levels(&self) -> SeverityLevels {
        SeverityLevels::merged(&self.custom_severity_levels)
    }
}

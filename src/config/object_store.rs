use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::{
    BaseHttpClientConfig, HttpRetryConfig, deserialize_duration_from_str, deserialize_urls,
};

fn default_reconnect_grace() -> Duration {
    Duration::from_secs(5)
}

/// Connection settings for the Icinga2 API.
#[derive(Debug, Deserialize, Clone)]
pub struct ObjectStoreConfig {
    /// Candidate API URLs. The first one is the primary and is preferred
    /// whenever it is reachable.
    #[serde(deserialize_with = "deserialize_urls")]
    pub urls: Vec<Url>,

    /// API user.
    #[serde(default)]
    pub username: String,

    /// API password.
    #[serde(default)]
    pub password: String,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure_tls: bool,

    /// PEM encoded CA certificate used instead of the system roots.
    #[serde(default)]
    pub ca_data: Option<String>,

    /// How long to wait after a connection failure before probing the
    /// endpoints again. Absorbs a reload of the primary.
    #[serde(default = "default_reconnect_grace", deserialize_with = "deserialize_duration_from_str")]
    pub reconnect_grace: Duration,

    /// Templates to import into created services.
    #[serde(default)]
    pub templates: Vec<String>,

    /// Retry policy of the underlying HTTP client.
    #[serde(default)]
    pub http_retry: HttpRetryConfig,

    /// Base HTTP client settings.
    #[serde(default)]
    pub http_base: BaseHttpClientConfig,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            username: String::new(),
            password: String::new(),
            insecure_tls: false,
            ca_data: None,
            reconnect_grace: default_reconnect_grace(),
            templates: Vec::new(),
            http_retry: HttpRetryConfig::default(),
            http_base: BaseHttpClientConfig::default(),
        }
    }
}

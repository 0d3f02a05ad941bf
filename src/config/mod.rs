//! Configuration module for alertbridge.

mod app_config;
mod checks;
mod helpers;
mod http_base;
mod http_retry;
mod object_store;
mod server;
mod severity;

pub use app_config::AppConfig;
pub use checks::{ChecksConfig, PluginOutputConfig};
pub use helpers::{
    deserialize_duration_from_seconds, deserialize_duration_from_str, deserialize_urls,
    serialize_duration_to_seconds, serialize_duration_to_str,
};
pub use http_base::BaseHttpClientConfig;
pub use http_retry::{HttpRetryConfig, JitterSetting};
pub use object_store::ObjectStoreConfig;
pub use server::ServerConfig;
pub use severity::SeverityLevels;

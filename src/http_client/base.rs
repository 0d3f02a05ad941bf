//! Construction of the plain `reqwest::Client` underneath the middleware
//! stack.

use reqwest::{Certificate, Client};
use thiserror::Error;

use crate::config::BaseHttpClientConfig;

/// Errors that can occur while building an HTTP client.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The configured CA bundle is not valid PEM.
    #[error("Invalid CA certificate: {0}")]
    InvalidCaCertificate(#[source] reqwest::Error),

    /// An error occurred while building the underlying `reqwest::Client`.
    #[error("Failed to create HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// TLS trust settings for a client.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// Accept any server certificate.
    pub insecure: bool,
    /// PEM encoded CA bundle replacing the built-in roots.
    pub ca_pem: Option<String>,
}

/// Builds a `reqwest::Client` from the base client settings and TLS options.
pub fn create_base_http_client(
    config: &BaseHttpClientConfig,
    tls: &TlsOptions,
) -> Result<Client, HttpClientError> {
    let max_idle = if config.disable_keepalives { 0 } else { config.max_idle_per_host };

    let mut builder = Client::builder()
        .pool_max_idle_per_host(max_idle)
        .pool_idle_timeout(Some(config.idle_timeout))
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout);

    if let Some(pem) = tls.ca_pem.as_deref().filter(|pem| !pem.trim().is_empty()) {
        let certificate =
            Certificate::from_pem(pem.as_bytes()).map_err(HttpClientError::InvalidCaCertificate)?;
        builder = builder.tls_built_in_root_certs(false).add_root_certificate(certificate);
    }

    if tls.insecure {
        tracing::warn!("TLS certificate verification is disabled for the object store client.");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().map_err(HttpClientError::Build)
}

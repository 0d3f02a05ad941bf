//! This module defines the capability interface of the monitoring object
//! store the bridge reflects alerts into.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use url::Url;

use crate::{
    http_client::HttpClientError,
    models::{CheckResult, Downtime, Host, ServiceRecord},
};

/// Errors returned by object store operations.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    /// The request could not be sent or its response could not be read.
    #[error("Request error: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// The API answered with a non-success status code.
    #[error("Unexpected response status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The API response did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The endpoint could not be reached at all.
    #[error("Endpoint {0} is unreachable")]
    Unreachable(Url),

    /// No API URL was configured.
    #[error("No API URL configured")]
    NoEndpoint,

    /// A URL could not be used as an API base.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(Url),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] HttpClientError),
}

impl ObjectStoreError {
    /// Whether the error indicates lost connectivity rather than a rejected
    /// request. Transient errors trigger an endpoint failover.
    pub fn is_transient(&self) -> bool {
        match self {
            ObjectStoreError::Request(reqwest_middleware::Error::Reqwest(e)) => {
                e.is_connect() || e.is_timeout() || e.is_request()
            }
            ObjectStoreError::Request(reqwest_middleware::Error::Middleware(_)) => true,
            ObjectStoreError::Status { status, .. } => matches!(status, 502..=504),
            ObjectStoreError::Unreachable(_) => true,
            ObjectStoreError::Decode(_)
            | ObjectStoreError::NoEndpoint
            | ObjectStoreError::InvalidUrl(_)
            | ObjectStoreError::HttpClient(_) => false,
        }
    }
}

/// Selects the objects returned by the list operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectFilter {
    /// Objects attached to the named host.
    Host(String),
}

impl ObjectFilter {
    /// Filter expression for service queries.
    pub fn service_expression(&self) -> String {
        match self {
            ObjectFilter::Host(host) => format!("host.name==\"{}\"", escape(host)),
        }
    }

    /// Filter expression for downtime queries.
    pub fn downtime_expression(&self) -> String {
        match self {
            ObjectFilter::Host(host) => format!("downtime.host_name==\"{}\"", escape(host)),
        }
    }

    /// Whether a service passes the filter.
    pub fn matches_service(&self, service: &ServiceRecord) -> bool {
        match self {
            ObjectFilter::Host(host) => &service.host_name == host,
        }
    }

    /// Whether a downtime passes the filter.
    pub fn matches_downtime(&self, downtime: &Downtime) -> bool {
        match self {
            ObjectFilter::Host(host) => &downtime.host_name == host,
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Operations the bridge needs from the monitoring object store.
///
/// Services are addressed by their full `<host>!<service>` name.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetches a host, `None` when it does not exist.
    async fn get_host(&self, name: &str) -> Result<Option<Host>, ObjectStoreError>;

    /// Creates a host.
    async fn create_host(&self, host: &Host) -> Result<Host, ObjectStoreError>;

    /// Fetches a service, `None` when it does not exist.
    async fn get_service(&self, full_name: &str) -> Result<Option<ServiceRecord>, ObjectStoreError>;

    /// Creates a service.
    async fn create_service(&self, service: &ServiceRecord)
    -> Result<ServiceRecord, ObjectStoreError>;

    /// Updates the attributes of an existing service.
    async fn update_service(&self, service: &ServiceRecord)
    -> Result<ServiceRecord, ObjectStoreError>;

    /// Deletes a service together with its dependent objects.
    async fn delete_service(&self, full_name: &str) -> Result<(), ObjectStoreError>;

    /// Lists the services passing the filter.
    async fn list_services(
        &self,
        filter: &ObjectFilter,
    ) -> Result<Vec<ServiceRecord>, ObjectStoreError>;

    /// Lists the downtimes passing the filter.
    async fn list_downtimes(&self, filter: &ObjectFilter) -> Result<Vec<Downtime>, ObjectStoreError>;

    /// Submits a passive check result for a service.
    async fn submit_check_result(
        &self,
        service: &ServiceRecord,
        result: &CheckResult,
    ) -> Result<(), ObjectStoreError>;

    /// Checks whether the API at `url` answers.
    async fn probe_connectivity(&self, url: &Url) -> Result<(), ObjectStoreError>;

    /// Points subsequent requests at `url`.
    async fn set_active_url(&self, url: Url);

    /// The URL requests currently go to.
    async fn active_url(&self) -> Url;
}

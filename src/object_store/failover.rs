//! Keeps an `ObjectStore` connected to one of several equivalent endpoints,
//! preferring the first (primary) one whenever it answers.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

use super::traits::{ObjectFilter, ObjectStore, ObjectStoreError};
use crate::models::{CheckResult, Downtime, Host, ServiceRecord};

/// Errors raised while establishing the initial connection.
#[derive(Debug, Error)]
pub enum FailoverError {
    /// No endpoint was configured.
    #[error("No object store endpoint configured")]
    NoEndpoint,

    /// None of the configured endpoints answered.
    #[error("None of the {0} configured object store endpoints is reachable")]
    NoneReachable(usize),
}

/// An `ObjectStore` decorator that moves the wrapped store between endpoints.
///
/// After a transient failure it waits for the grace period, re-probes the
/// active endpoint and, if that is still down, switches to the first
/// reachable endpoint in configuration order. While running on a secondary
/// endpoint every successful operation re-probes the primary and switches
/// back once it answers. Only one task switches at a time; others skip.
pub struct FailoverStore {
    inner: Arc<dyn ObjectStore>,
    urls: Vec<Url>,
    grace: Duration,
    switching: Mutex<()>,
}

impl FailoverStore {
    /// Wraps `inner`, failing over between `urls` with the given grace period.
    pub fn new(inner: Arc<dyn ObjectStore>, urls: Vec<Url>, grace: Duration) -> Self {
        Self { inner, urls, grace, switching: Mutex::new(()) }
    }

    /// Probes the endpoints in order and activates the first reachable one.
    pub async fn connect(&self) -> Result<Url, FailoverError> {
        if self.urls.is_empty() {
            return Err(FailoverError::NoEndpoint);
        }
        let _guard = self.switching.lock().await;
        let url = self.first_reachable().await.ok_or(FailoverError::NoneReachable(self.urls.len()))?;
        self.inner.set_active_url(url.clone()).await;
        tracing::info!(url = %url, "Connected to object store endpoint.");
        Ok(url)
    }

    async fn first_reachable(&self) -> Option<Url> {
        for url in &self.urls {
            match self.inner.probe_connectivity(url).await {
                Ok(()) => return Some(url.clone()),
                Err(e) => tracing::debug!(url = %url, error = %e, "Endpoint probe failed."),
            }
        }
        None
    }

    async fn observe<T>(&self, result: Result<T, ObjectStoreError>) -> Result<T, ObjectStoreError> {
        match &result {
            Ok(_) => self.prefer_primary().await,
            Err(e) if e.is_transient() => self.recover().await,
            Err(_) => {}
        }
        result
    }

    async fn recover(&self) {
        let Ok(_guard) = self.switching.try_lock() else {
            return;
        };
        let active = self.inner.active_url().await;
        tracing::warn!(
            url = %active,
            grace = ?self.grace,
            "Lost connection to object store, probing again after grace period."
        );
        tokio::time::sleep(self.grace).await;

        if self.inner.probe_connectivity(&active).await.is_ok() {
            tracing::info!(url = %active, "Object store endpoint is reachable again.");
            return;
        }

        match self.first_reachable().await {
            Some(url) => {
                if url != active {
                    tracing::warn!(from = %active, to = %url, "Switching object store endpoint.");
                }
                self.inner.set_active_url(url).await;
            }
            None => tracing::error!("No object store endpoint is reachable."),
        }
    }

    async fn prefer_primary(&self) {
        let Some(primary) = self.urls.first() else {
            return;
        };
        if self.inner.active_url().await == *primary {
            return;
        }
        let Ok(_guard) = self.switching.try_lock() else {
            return;
        };
        if self.inner.probe_connectivity(primary).await.is_ok() {
            tracing::info!(url = %primary, "Primary object store endpoint is back, switching.");
            self.inner.set_active_url(primary.clone()).await;
        }
    }
}

#[async_trait]
impl ObjectStore for FailoverStore {
    async fn get_host(&self, name: &str) -> Result<Option<Host>, ObjectStoreError> {
        self.observe(self.inner.get_host(name).await).await
    }

    async fn create_host(&self, host: &Host) -> Result<Host, ObjectStoreError> {
        self.observe(self.inner.create_host(host).await).await
    }

    async fn get_service(&self, full_name: &str) -> Result<Option<ServiceRecord>, ObjectStoreError> {
        self.observe(self.inner.get_service(full_name).await).await
    }

    async fn create_service(
        &self,
        service: &ServiceRecord,
    ) -> Result<ServiceRecord, ObjectStoreError> {
        self.observe(self.inner.create_service(service).await).await
    }

    async fn update_service(
        &self,
        service: &ServiceRecord,
    ) -> Result<ServiceRecord, ObjectStoreError> {
        self.observe(self.inner.update_service(service).await).await
    }

    async fn delete_service(&self, full_name: &str) -> Result<(), ObjectStoreError> {
        self.observe(self.inner.delete_service(full_name).await).await
    }

    async fn list_services(
        &self,
        filter: &ObjectFilter,
    ) -> Result<Vec<ServiceRecord>, ObjectStoreError> {
        self.observe(self.inner.list_services(filter).await).await
    }

    async fn list_downtimes(&self, filter: &ObjectFilter) -> Result<Vec<Downtime>, ObjectStoreError> {
        self.observe(self.inner.list_downtimes(filter).await).await
    }

    async fn submit_check_result(
        &self,
        service: &ServiceRecord,
        result: &CheckResult,
    ) -> Result<(), ObjectStoreError> {
        self.observe(self.inner.submit_check_result(service, result).await).await
    }

    async fn probe_connectivity(&self, url: &Url) -> Result<(), ObjectStoreError> {
        self.inner.probe_connectivity(url).await
    }

    async fn set_active_url(&self, url: Url) {
        self.inner.set_active_url(url).await
    }

    async fn active_url(&self) -> Url {
        self.inner.active_url().await
    }
}

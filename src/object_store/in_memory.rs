//! An in-process `ObjectStore` used to drive the engine without an Icinga
//! instance.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use url::Url;

use super::traits::{ObjectFilter, ObjectStore, ObjectStoreError};
use crate::models::{CheckResult, Downtime, ExitStatus, Host, ServiceRecord};

#[derive(Debug)]
struct State {
    active_url: Url,
    unreachable: HashSet<Url>,
    hosts: BTreeMap<String, Host>,
    services: BTreeMap<String, ServiceRecord>,
    downtimes: Vec<Downtime>,
    check_results: Vec<(String, CheckResult)>,
    probes: Vec<Url>,
    creates: usize,
    updates: usize,
}

impl State {
    fn ensure_reachable(&self) -> Result<(), ObjectStoreError> {
        if self.unreachable.contains(&self.active_url) {
            return Err(ObjectStoreError::Unreachable(self.active_url.clone()));
        }
        Ok(())
    }
}

fn not_found(full_name: &str) -> ObjectStoreError {
    ObjectStoreError::Status { status: 404, body: format!("No objects found: {full_name}") }
}

/// An `ObjectStore` keeping every object in memory.
///
/// Endpoints can be marked unreachable to exercise failover; while the
/// active URL is unreachable every operation fails with a transient error.
/// Submitted check results update the service state the way Icinga does.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    state: Mutex<State>,
}

impl InMemoryObjectStore {
    /// Creates an empty store whose active endpoint is `active_url`.
    pub fn new(active_url: Url) -> Self {
        Self {
            state: Mutex::new(State {
                active_url,
                unreachable: HashSet::new(),
                hosts: BTreeMap::new(),
                services: BTreeMap::new(),
                downtimes: Vec::new(),
                check_results: Vec::new(),
                probes: Vec::new(),
                creates: 0,
                updates: 0,
            }),
        }
    }

    /// Marks an endpoint as (un)reachable.
    pub async fn set_reachable(&self, url: &Url, reachable: bool) {
        let mut state = self.state.lock().await;
        if reachable {
            state.unreachable.remove(url);
        } else {
            state.unreachable.insert(url.clone());
        }
    }

    /// Stores a host as-is.
    pub async fn insert_host(&self, host: Host) {
        self.state.lock().await.hosts.insert(host.name.clone(), host);
    }

    /// Stores a service as-is, including its state fields.
    pub async fn insert_service(&self, service: ServiceRecord) {
        self.state.lock().await.services.insert(service.full_name(), service);
    }

    /// Stores a downtime.
    pub async fn insert_downtime(&self, downtime: Downtime) {
        self.state.lock().await.downtimes.push(downtime);
    }

    /// Returns a stored service by full name.
    pub async fn service(&self, full_name: &str) -> Option<ServiceRecord> {
        self.state.lock().await.services.get(full_name).cloned()
    }

    /// Returns every stored service.
    pub async fn services(&self) -> Vec<ServiceRecord> {
        self.state.lock().await.services.values().cloned().collect()
    }

    /// Returns a stored host by name.
    pub async fn host(&self, name: &str) -> Option<Host> {
        self.state.lock().await.hosts.get(name).cloned()
    }

    /// Returns the submitted check results as `(full name, result)` pairs, in
    /// submission order.
    pub async fn check_results(&self) -> Vec<(String, CheckResult)> {
        self.state.lock().await.check_results.clone()
    }

    /// Returns the probed URLs in probe order.
    pub async fn probes(&self) -> Vec<Url> {
        self.state.lock().await.probes.clone()
    }

    /// Number of services created so far.
    pub async fn create_count(&self) -> usize {
        self.state.lock().await.creates
    }

    /// Number of services updated so far.
    pub async fn update_count(&self) -> usize {
        self.state.lock().await.updates
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_host(&self, name: &str) -> Result<Option<Host>, ObjectStoreError> {
        let state = self.state.lock().await;
        state.ensure_reachable()?;
        Ok(state.hosts.get(name).cloned())
    }

    async fn create_host(&self, host: &Host) -> Result<Host, ObjectStoreError> {
        let mut state = self.state.lock().await;
        state.ensure_reachable()?;
        state.hosts.insert(host.name.clone(), host.clone());
        Ok(host.clone())
    }

    async fn get_service(&self, full_name: &str) -> Result<Option<ServiceRecord>, ObjectStoreError> {
        let state = self.state.lock().await;
        state.ensure_reachable()?;
        Ok(state.services.get(full_name).cloned())
    }

    async fn create_service(
        &self,
        service: &ServiceRecord,
    ) -> Result<ServiceRecord, ObjectStoreError> {
        let mut state = self.state.lock().await;
        state.ensure_reachable()?;
        let full_name = service.full_name();
        if state.services.contains_key(&full_name) {
            return Err(ObjectStoreError::Status {
                status: 500,
                body: format!("Object {full_name} already exists"),
            });
        }
        let mut stored = service.clone();
        stored.state = Some(ExitStatus::Ok);
        stored.last_state_change = Utc::now().timestamp() as f64;
        state.services.insert(full_name, stored.clone());
        state.creates += 1;
        Ok(stored)
    }

    async fn update_service(
        &self,
        service: &ServiceRecord,
    ) -> Result<ServiceRecord, ObjectStoreError> {
        let mut state = self.state.lock().await;
        state.ensure_reachable()?;
        let full_name = service.full_name();
        let existing = state.services.get_mut(&full_name).ok_or_else(|| not_found(&full_name))?;
        let mut updated = service.clone();
        updated.state = existing.state;
        updated.last_state_change = existing.last_state_change;
        *existing = updated.clone();
        state.updates += 1;
        Ok(updated)
    }

    async fn delete_service(&self, full_name: &str) -> Result<(), ObjectStoreError> {
        let mut state = self.state.lock().await;
        state.ensure_reachable()?;
        state.services.remove(full_name).map(|_| ()).ok_or_else(|| not_found(full_name))
    }

    async fn list_services(
        &self,
        filter: &ObjectFilter,
    ) -> Result<Vec<ServiceRecord>, ObjectStoreError> {
        let state = self.state.lock().await;
        state.ensure_reachable()?;
        Ok(state.services.values().filter(|s| filter.matches_service(s)).cloned().collect())
    }

    async fn list_downtimes(&self, filter: &ObjectFilter) -> Result<Vec<Downtime>, ObjectStoreError> {
        let state = self.state.lock().await;
        state.ensure_reachable()?;
        Ok(state.downtimes.iter().filter(|d| filter.matches_downtime(d)).cloned().collect())
    }

    async fn submit_check_result(
        &self,
        service: &ServiceRecord,
        result: &CheckResult,
    ) -> Result<(), ObjectStoreError> {
        let mut state = self.state.lock().await;
        state.ensure_reachable()?;
        let full_name = service.full_name();
        let stored = state.services.get_mut(&full_name).ok_or_else(|| not_found(&full_name))?;
        if stored.state != Some(result.exit_status) {
            stored.state = Some(result.exit_status);
            stored.last_state_change = Utc::now().timestamp() as f64;
        }
        state.check_results.push((full_name, result.clone()));
        Ok(())
    }

    async fn probe_connectivity(&self, url: &Url) -> Result<(), ObjectStoreError> {
        let mut state = self.state.lock().await;
        state.probes.push(url.clone());
        if state.unreachable.contains(url) {
            return Err(ObjectStoreError::Unreachable(url.clone()));
        }
        Ok(())
    }

    async fn set_active_url(&self, url: Url) {
        self.state.lock().await.active_url = url;
    }

    async fn active_url(&self) -> Url {
        self.state.lock().await.active_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn service(name: &str) -> ServiceRecord {
        ServiceRecord {
            name: name.to_string(),
            host_name: "bridge".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_check_result_updates_state() {
        let store = InMemoryObjectStore::new(url("https://a.example.com"));
        let created = store.create_service(&service("svc")).await.unwrap();
        assert_eq!(created.state, Some(ExitStatus::Ok));

        store
            .submit_check_result(&service("svc"), &CheckResult::new(ExitStatus::Critical, "down"))
            .await
            .unwrap();

        let stored = store.service("bridge!svc").await.unwrap();
        assert_eq!(stored.state, Some(ExitStatus::Critical));
        assert_eq!(store.check_results().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_active_url_fails_operations() {
        let a = url("https://a.example.com");
        let store = InMemoryObjectStore::new(a.clone());
        store.set_reachable(&a, false).await;

        let err = store.get_service("bridge!svc").await.unwrap_err();
        assert!(err.is_transient());
        assert!(store.probe_connectivity(&a).await.is_err());

        store.set_reachable(&a, true).await;
        assert!(store.get_service("bridge!svc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_service_fails() {
        let store = InMemoryObjectStore::new(url("https://a.example.com"));
        let err = store.update_service(&service("svc")).await.unwrap_err();
        assert!(matches!(err, ObjectStoreError::Status { status: 404, .. }));
    }
}

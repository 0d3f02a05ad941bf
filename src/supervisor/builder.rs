//! This module provides the `SupervisorBuilder` for constructing a `Supervisor`.

use std::sync::Arc;

use super::{Supervisor, SupervisorError};
use crate::{config::AppConfig, context::AppMetrics, object_store::ObjectStore};

/// A builder for creating a `Supervisor` instance.
#[derive(Default)]
pub struct SupervisorBuilder {
    config: Option<AppConfig>,
    store: Option<Arc<dyn ObjectStore>>,
    app_metrics: Option<AppMetrics>,
}

impl SupervisorBuilder {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application configuration for the `Supervisor`.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the object store the services write to.
    pub fn store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets shared application metrics. Fresh metrics are used otherwise.
    pub fn app_metrics(mut self, app_metrics: AppMetrics) -> Self {
        self.app_metrics = Some(app_metrics);
        self
    }

    /// Assembles and validates the components to build a `Supervisor`.
    pub fn build(self) -> Result<Supervisor, SupervisorError> {
        let config = self.config.ok_or(SupervisorError::MissingConfig)?;
        let store = self.store.ok_or(SupervisorError::MissingObjectStore)?;
        let app_metrics = self.app_metrics.unwrap_or_default();

        Ok(Supervisor::new(config, store, app_metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{object_store::MockObjectStore, test_helpers::create_test_app_config};

    #[test]
    fn build_succeeds_with_all_components() {
        let result = SupervisorBuilder::new()
            .config(create_test_app_config())
            .store(Arc::new(MockObjectStore::new()))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn build_fails_if_config_is_missing() {
        let result = SupervisorBuilder::new().store(Arc::new(MockObjectStore::new())).build();
        assert!(matches!(result, Err(SupervisorError::MissingConfig)));
    }

    #[test]
    fn build_fails_if_store_is_missing() {
        let result = SupervisorBuilder::new().config(create_test_app_config()).build();
        assert!(matches!(result, Err(SupervisorError::MissingObjectStore)));
    }
}

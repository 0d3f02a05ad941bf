use thiserror::Error;

use crate::object_store::{FailoverError, ObjectStoreError};

/// Errors that can occur during application context initialization.
#[derive(Debug, Error)]
pub enum AppContextError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// The object store client could not be created.
    #[error("Object store error: {0}")]
    ObjectStore(#[from] ObjectStoreError),

    /// No object store endpoint could be reached.
    #[error("Failover error: {0}")]
    Failover(#[from] FailoverError),
}

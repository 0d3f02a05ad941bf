//! The monitoring object store: the capability interface the engine works
//! against, the Icinga2 REST implementation, an in-memory implementation and
//! the endpoint failover decorator.

mod failover;
mod http;
mod in_memory;
mod traits;

pub use failover::{FailoverError, FailoverStore};
pub use http::IcingaClient;
pub use in_memory::InMemoryObjectStore;
#[cfg(test)]
pub use traits::MockObjectStore;
pub use traits::{ObjectFilter, ObjectStore, ObjectStoreError};

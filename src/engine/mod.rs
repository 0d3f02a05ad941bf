//! The alert-to-service engine: naming, state mapping, variable mapping,
//! synchronization and the periodic background jobs.

pub mod gc;
pub mod heartbeat;
pub mod identity;
pub mod severity;
pub mod synchronizer;
pub mod variables;

pub use gc::{GarbageCollector, GcError, GcReport};
pub use heartbeat::{HeartbeatEmitter, HeartbeatError};
pub use identity::{IdentityError, compute_display_name, compute_service_name};
pub use severity::severity_to_exit_status;
pub use synchronizer::{
    HeartbeatIntervalError, ServiceSynchronizer, SkipReason, SyncError, SyncOutcome, parse_heartbeat_interval,
};

//! Data structures shared across the bridge: the inbound Alertmanager payload
//! and the Icinga2 objects it is reflected into.

pub mod alert;
pub mod check;
pub mod downtime;
pub mod host;
pub mod service;

pub use alert::{Alert, AlertStatus, WebhookData};
pub use check::{CheckResult, ExitStatus};
pub use downtime::Downtime;
pub use host::Host;
pub use service::{ServiceRecord, VarValue, Vars};

use serde::{Deserialize, Deserializer};

/// Treats an explicit `null` like a missing field.
pub(crate) fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a non-negative count that Icinga may report as a float (`1.0`).
pub(crate) fn deserialize_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(serde::de::Error::custom(format!("invalid count {value}")))
    }
}

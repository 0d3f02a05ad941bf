//! Mapping of alert status and severity to a check state.

use crate::{
    config::SeverityLevels,
    models::{AlertStatus, ExitStatus},
};

/// Computes the check state for an alert.
///
/// Resolved alerts are always `OK`. Firing alerts take the level of their
/// severity keyword, `UNKNOWN` when the keyword is not configured. Any other
/// status is `UNKNOWN` as well.
pub fn severity_to_exit_status(
    status: AlertStatus,
    severity: &str,
    levels: &SeverityLevels,
) -> ExitStatus {
    match status {
        AlertStatus::Resolved => ExitStatus::Ok,
        AlertStatus::Firing => {
            levels.level(severity).map(ExitStatus::from_level).unwrap_or(ExitStatus::Unknown)
        }
        AlertStatus::Unknown => ExitStatus::Unknown,
    }
}

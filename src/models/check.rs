//! Passive check results.

use serde::{Deserialize, Serialize};

/// Exit status of a check, as understood by the monitoring plugin protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExitStatus {
    /// 0
    Ok,
    /// 1
    Warning,
    /// 2
    Critical,
    /// 3
    Unknown,
}

impl ExitStatus {
    /// Maps a numeric level to a status. Anything above 3 is `Unknown`.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => ExitStatus::Ok,
            1 => ExitStatus::Warning,
            2 => ExitStatus::Critical,
            _ => ExitStatus::Unknown,
        }
    }

    /// The numeric exit code.
    pub fn code(self) -> i64 {
        match self {
            ExitStatus::Ok => 0,
            ExitStatus::Warning => 1,
            ExitStatus::Critical => 2,
            ExitStatus::Unknown => 3,
        }
    }

    /// Suffix used to look up state specific annotations, e.g.
    /// `message_critical`.
    pub fn suffix(self) -> &'static str {
        match self {
            ExitStatus::Ok => "ok",
            ExitStatus::Warning => "warning",
            ExitStatus::Critical => "critical",
            ExitStatus::Unknown => "unknown",
        }
    }

    /// Whether this status represents a problem.
    pub fn is_problem(self) -> bool {
        self != ExitStatus::Ok
    }
}

impl Serialize for ExitStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for ExitStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Icinga reports states as floats.
        let value = f64::deserialize(deserializer)?;
        Ok(if value < 0.0 { ExitStatus::Unknown } else { ExitStatus::from_level(value as u8) })
    }
}

/// A passive check result submitted for a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The resulting state.
    pub exit_status: ExitStatus,
    /// Human readable output.
    pub plugin_output: String,
}

impl CheckResult {
    /// Creates a new check result.
    pub fn new(exit_status: ExitStatus, plugin_output: impl Into<String>) -> Self {
        Self { exit_status, plugin_output: plugin_output.into() }
    }
}

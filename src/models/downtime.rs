use serde::{Deserialize, Serialize};

/// A scheduled downtime as reported by Icinga.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Downtime {
    /// Downtime object name.
    #[serde(default)]
    pub name: String,
    /// Host the downtime applies to.
    #[serde(default)]
    pub host_name: String,
    /// Service the downtime applies to, empty for host downtimes.
    #[serde(default)]
    pub service_name: String,
    /// Window start, unix seconds.
    #[serde(default)]
    pub start_time: f64,
    /// Window end, unix seconds. `0` means open ended.
    #[serde(default)]
    pub end_time: f64,
}

impl Downtime {
    /// Whether the window has not ended at `now` (unix seconds).
    pub fn is_open(&self, now: f64) -> bool {
        self.end_time <= 0.0 || now < self.end_time
    }
}

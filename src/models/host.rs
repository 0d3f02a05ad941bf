use serde::{Deserialize, Serialize};

use super::{Vars, deserialize_null_default};

/// An Icinga host object. The bridge only ever deals with its own service
/// host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// Object name.
    #[serde(default)]
    pub name: String,
    /// Human readable name.
    #[serde(default)]
    pub display_name: String,
    /// Check command used for the host itself.
    #[serde(default)]
    pub check_command: String,
    /// Custom variables.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub vars: Vars,
}

impl Host {
    /// A passive host as created by the bridge.
    pub fn new(name: &str, check_command: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            check_command: check_command.to_string(),
            vars: Vars::new(),
        }
    }
}

//! Mapping of alert labels and annotations into service variables.
//!
//! Every pair is stored verbatim under a prefixed key. Keys of the form
//! `icinga_<type>_<name>` additionally produce a typed, unprefixed `<name>`
//! variable, e.g. `icinga_number_port="8080"` yields `port = 8080`.

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

use crate::models::{VarValue, Vars};

static MAPPING_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^icinga_([a-z]+)_(.*)$").expect("Is a valid regex"));

/// Prefix of variables holding alert labels.
pub const LABEL_PREFIX: &str = "label_";

/// Prefix of variables holding alert annotations.
pub const ANNOTATION_PREFIX: &str = "annotation_";

/// The type requested by a mapping key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingType {
    /// `icinga_number_*`: parsed as an integer.
    Number,
    /// `icinga_string_*`: copied verbatim.
    String,
    /// Any other type name.
    Unknown(String),
}

impl From<&str> for MappingType {
    fn from(value: &str) -> Self {
        match value {
            "number" => MappingType::Number,
            "string" => MappingType::String,
            other => MappingType::Unknown(other.to_string()),
        }
    }
}

/// Errors raised for mapping keys whose value cannot be converted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    /// The value of a `number` mapping is not an integer.
    #[error("Value '{value}' of '{key}' is not a number")]
    InvalidNumber {
        /// The full mapping key.
        key: String,
        /// The offending value.
        value: String,
    },

    /// The mapping key names a type that is not supported.
    #[error("Unknown mapping type '{kind}' in '{key}'")]
    UnknownType {
        /// The full mapping key.
        key: String,
        /// The type name.
        kind: String,
    },
}

/// Converts a single mapping key into a typed variable.
///
/// Returns `Ok(None)` when `key` is not a mapping key.
pub fn map_variable(key: &str, value: &str) -> Result<Option<(String, VarValue)>, MappingError> {
    let Some(captures) = MAPPING_KEY_PATTERN.captures(key) else {
        return Ok(None);
    };
    let name = captures[2].to_string();

    match MappingType::from(&captures[1]) {
        MappingType::Number => value
            .parse::<i64>()
            .map(|number| Some((name, VarValue::Number(number))))
            .map_err(|_| MappingError::InvalidNumber {
                key: key.to_string(),
                value: value.to_string(),
            }),
        MappingType::String => Ok(Some((name, VarValue::Text(value.to_string())))),
        MappingType::Unknown(kind) => Err(MappingError::UnknownType { key: key.to_string(), kind }),
    }
}

/// Stores every pair of `kv` under `prefix + key`, plus the typed variable of
/// each mapping key. A mapping that fails is logged and skipped; the prefixed
/// raw entry is kept regardless.
pub fn map_variables(vars: &mut Vars, kv: &HashMap<String, String>, prefix: &str) {
    let mut keys: Vec<&String> = kv.keys().collect();
    keys.sort();

    for key in keys {
        let value = &kv[key];
        vars.insert(format!("{prefix}{key}"), VarValue::Text(value.clone()));

        match map_variable(key, value) {
            Ok(Some((name, mapped))) => {
                vars.insert(name, mapped);
            }
            Ok(None) => {}
            Err(e) => tracing::info!(key = %key, error = %e, "Failed to map variable."),
        }
    }
}

/// Adds operator supplied defaults without overwriting variables already
/// present.
pub fn add_static_variables(vars: &mut Vars, static_vars: &HashMap<String, String>) {
    for (key, value) in static_vars {
        if vars.contains_key(key) {
            tracing::debug!(key = %key, "Static variable shadowed by alert variable.");
            continue;
        }
        vars.insert(key.clone(), VarValue::Text(value.clone()));
    }
}

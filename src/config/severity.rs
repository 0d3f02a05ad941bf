//! Severity keyword to check level mapping.

use std::collections::HashMap;

/// Highest level the check result protocol understands (`UNKNOWN`).
const MAX_LEVEL: u8 = 3;

/// Built-in severity keywords.
const DEFAULT_LEVELS: [(&str, u8); 3] = [("normal", 0), ("warning", 1), ("critical", 2)];

/// The merged map of severity keywords to check levels.
///
/// Starts from the built-in `normal`/`warning`/`critical` levels and layers
/// operator supplied overrides on top. Keywords are matched case
/// insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityLevels {
    levels: HashMap<String, u8>,
}

impl SeverityLevels {
    /// Merges custom levels into the built-in defaults.
    ///
    /// An override that is not an integer in `0..=3` is mapped to `3`
    /// (`UNKNOWN`) instead of being rejected.
    pub fn merged(custom: &HashMap<String, String>) -> Self {
        let mut levels: HashMap<String, u8> =
            DEFAULT_LEVELS.iter().map(|(name, level)| (name.to_string(), *level)).collect();

        for (name, raw) in custom {
            let level = match raw.trim().parse::<i64>() {
                Ok(value) if (0..=MAX_LEVEL as i64).contains(&value) => value as u8,
                _ => {
                    tracing::warn!(
                        severity = %name,
                        value = %raw,
                        "Invalid custom severity level, falling back to UNKNOWN."
                    );
                    MAX_LEVEL
                }
            };
            levels.insert(name.to_lowercase(), level);
        }

        Self { levels }
    }

    /// Looks up the level for a severity keyword.
    pub fn level(&self, severity: &str) -> Option<u8> {
        self.levels.get(&severity.to_lowercase()).copied()
    }
}

impl Default for SeverityLevels {
    fn default() -> Self {
        Self::merged(&HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_default_levels() {
        let levels = SeverityLevels::default();
        assert_eq!(levels.level("normal"), Some(0));
        assert_eq!(levels.level("warning"), Some(1));
        assert_eq!(levels.level("critical"), Some(2));
        assert_eq!(levels.level("page"), None);
    }

    #[test]
    fn test_custom_levels_add_and_override() {
        let levels = SeverityLevels::merged(&custom(&[("info", "0"), ("Warning", "2")]));
        assert_eq!(levels.level("info"), Some(0));
        assert_eq!(levels.level("warning"), Some(2));
        assert_eq!(levels.level("critical"), Some(2));
    }

    #[test]
    fn test_invalid_custom_levels_degrade_to_unknown() {
        let levels =
            SeverityLevels::merged(&custom(&[("high", "7"), ("low", "-1"), ("odd", "loud")]));
        assert_eq!(levels.level("high"), Some(3));
        assert_eq!(levels.level("low"), Some(3));
        assert_eq!(levels.level("odd"), Some(3));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let levels = SeverityLevels::default();
        assert_eq!(levels.level("CRITICAL"), Some(2));
    }
}

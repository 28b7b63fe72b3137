//! Table Engine Configuration
//!
//! Behavior toggles are explicit per-instance state passed in at
//! construction, never read from ambient process state.

use serde::{Deserialize, Serialize};

/// Behavior toggles for one schema table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Reinterpret string fields as integer/float/timestamp during
    /// classification (default: true)
    #[serde(default = "default_enabled")]
    pub normalize_on_read: bool,

    /// Let sanitize-batch rewrite conflicting values and auto-extend the
    /// schema (default: true)
    #[serde(default = "default_enabled")]
    pub sanitize_on_import: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            normalize_on_read: default_enabled(),
            sanitize_on_import: default_enabled(),
        }
    }
}

impl TableConfig {
    /// Config with every toggle disabled: strings stay verbatim and
    /// sanitize passes batches through unchanged.
    pub fn passthrough() -> Self {
        Self {
            normalize_on_read: false,
            sanitize_on_import: false,
        }
    }

    /// Override the normalization toggle
    pub fn with_normalize_on_read(mut self, enabled: bool) -> Self {
        self.normalize_on_read = enabled;
        self
    }

    /// Override the sanitize toggle
    pub fn with_sanitize_on_import(mut self, enabled: bool) -> Self {
        self.sanitize_on_import = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let config = TableConfig::default();
        assert!(config.normalize_on_read);
        assert!(config.sanitize_on_import);
    }

    #[test]
    fn test_passthrough_disables_everything() {
        let config = TableConfig::passthrough();
        assert!(!config.normalize_on_read);
        assert!(!config.sanitize_on_import);
    }

    #[test]
    fn test_deserialize_fills_missing_toggles() {
        let config: TableConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TableConfig::default());

        let config: TableConfig =
            serde_json::from_str(r#"{"normalize_on_read": false}"#).unwrap();
        assert!(!config.normalize_on_read);
        assert!(config.sanitize_on_import);
    }
}

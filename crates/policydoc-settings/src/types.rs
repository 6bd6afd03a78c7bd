//! Settings type definitions.
//!
//! Field names are camelCase in JSON. Every section is `#[serde(default)]`,
//! so a settings file only needs the values it changes:
//!
//! ```json
//! {
//!   "logging": { "level": "info" },
//!   "render": { "sourceUrl": "https://github.com/org/policy/blob/main" }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocSettings {
    /// Diagnostic output.
    pub logging: LoggingSettings,
    /// Rule-source discovery.
    pub discovery: DiscoverySettings,
    /// Page rendering.
    pub render: RenderSettings,
}

impl DocSettings {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let discovery = &self.discovery;
        if discovery.rule_suffix.is_empty() {
            return Err(SettingsError::InvalidValue(
                "discovery.ruleSuffix must not be empty".to_string(),
            ));
        }
        if !discovery.test_suffix.ends_with(&discovery.rule_suffix) {
            return Err(SettingsError::InvalidValue(format!(
                "discovery.testSuffix '{}' must end with ruleSuffix '{}'",
                discovery.test_suffix, discovery.rule_suffix
            )));
        }
        if !is_log_level(&self.logging.level) {
            return Err(SettingsError::InvalidValue(format!(
                "logging.level '{}' is not one of trace, debug, info, warn, error",
                self.logging.level
            )));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level written to stderr (`RUST_LOG` wins when set).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Which files count as rule sources.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoverySettings {
    /// File name suffix of rule sources.
    pub rule_suffix: String,
    /// File name suffix of rule tests, which are skipped.
    pub test_suffix: String,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            rule_suffix: ".rego".to_string(),
            test_suffix: "_test.rego".to_string(),
        }
    }
}

/// Page rendering options.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    /// Base URL that source file paths are appended to for "Source" links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

/// Whether `level` is a plain tracing level name.
pub fn is_log_level(level: &str) -> bool {
    matches!(
        level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

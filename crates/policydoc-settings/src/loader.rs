//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`DocSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply `POLICYDOC_*` environment variable overrides
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{DiscoverySettings, DocSettings, is_log_level};

/// Default settings file, relative to the working directory.
pub const SETTINGS_FILENAME: &str = ".policydoc.json";

/// Log level override.
pub const LOG_LEVEL_VAR: &str = "POLICYDOC_LOG_LEVEL";
/// Rule source suffix override.
pub const RULE_SUFFIX_VAR: &str = "POLICYDOC_RULE_SUFFIX";
/// Rule test suffix override.
pub const TEST_SUFFIX_VAR: &str = "POLICYDOC_TEST_SUFFIX";
/// Source link base URL override.
pub const SOURCE_URL_VAR: &str = "POLICYDOC_SOURCE_URL";

/// Test marker placed before a rule suffix when none can be recovered.
const DEFAULT_TEST_MARKER: &str = "_test";

/// An environment override that was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredOverride {
    /// Variable name.
    pub key: &'static str,
    /// Value found in the environment.
    pub value: String,
    /// Why the value was rejected.
    pub reason: String,
}

impl fmt::Display for IgnoredOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}='{}' ignored: {}", self.key, self.value, self.reason)
    }
}

/// Loaded settings and the overrides that were rejected on the way.
///
/// Loading happens before logging is set up, so rejected overrides are
/// returned for the caller to report once a subscriber exists.
#[derive(Debug, Clone, Default)]
pub struct LoadedSettings {
    /// Effective settings.
    pub settings: DocSettings,
    /// Environment overrides that were not applied.
    pub ignored: Vec<IgnoredOverride>,
}

/// Path of the default settings file.
pub fn settings_path() -> PathBuf {
    PathBuf::from(SETTINGS_FILENAME)
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<LoadedSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. An unreadable file, invalid JSON or an
/// invalid final value is an error.
pub fn load_settings_from_path(path: &Path) -> Result<LoadedSettings> {
    load_with_env(path, |name| std::env::var(name).ok())
}

/// Load settings, reading overrides through `env` instead of the process
/// environment.
pub fn load_with_env(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<LoadedSettings> {
    let defaults = serde_json::to_value(DocSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: DocSettings = serde_json::from_value(merged)?;
    let ignored = apply_env_overrides(&mut settings, env);
    settings.validate()?;
    Ok(LoadedSettings { settings, ignored })
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment overrides and return the ones that were rejected.
///
/// Empty values are treated as unset. An unrecognized log level is
/// rejected. Suffixes are applied as a pair: a rule suffix set on its own
/// carries the current test marker over (`.rg` gives `_test.rg`), and a
/// pair whose test suffix does not end with the rule suffix is rejected.
pub fn apply_env_overrides(
    settings: &mut DocSettings,
    env: impl Fn(&str) -> Option<String>,
) -> Vec<IgnoredOverride> {
    let read = |name: &str| env(name).filter(|v| !v.is_empty());
    let mut ignored = Vec::new();

    if let Some(v) = read(LOG_LEVEL_VAR) {
        if is_log_level(&v) {
            settings.logging.level = v.to_ascii_lowercase();
        } else {
            ignored.push(IgnoredOverride {
                key: LOG_LEVEL_VAR,
                value: v,
                reason: "not one of trace, debug, info, warn, error".to_string(),
            });
        }
    }

    apply_suffix_overrides(
        &mut settings.discovery,
        read(RULE_SUFFIX_VAR),
        read(TEST_SUFFIX_VAR),
        &mut ignored,
    );

    if let Some(v) = read(SOURCE_URL_VAR) {
        settings.render.source_url = Some(v);
    }

    ignored
}

fn apply_suffix_overrides(
    discovery: &mut DiscoverySettings,
    rule: Option<String>,
    test: Option<String>,
    ignored: &mut Vec<IgnoredOverride>,
) {
    let rule_suffix = rule.clone().unwrap_or_else(|| discovery.rule_suffix.clone());
    let test_suffix = match (&rule, &test) {
        (_, Some(test)) => test.clone(),
        (Some(_), None) => {
            let marker = discovery
                .test_suffix
                .strip_suffix(discovery.rule_suffix.as_str())
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_TEST_MARKER);
            format!("{marker}{rule_suffix}")
        }
        (None, None) => return,
    };

    if test_suffix.ends_with(&rule_suffix) {
        discovery.rule_suffix = rule_suffix;
        discovery.test_suffix = test_suffix;
        return;
    }

    let reason = format!("testSuffix '{test_suffix}' must end with ruleSuffix '{rule_suffix}'");
    for (key, value) in [(RULE_SUFFIX_VAR, rule), (TEST_SUFFIX_VAR, test)] {
        if let Some(value) = value {
            ignored.push(IgnoredOverride {
                key,
                value,
                reason: reason.clone(),
            });
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::errors::SettingsError;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"discovery": {"ruleSuffix": ".rego", "testSuffix": "_test.rego"}});
        let source = serde_json::json!({"discovery": {"testSuffix": "_spec.rego"}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["discovery"]["ruleSuffix"], ".rego");
        assert_eq!(merged["discovery"]["testSuffix"], "_spec.rego");
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4]});
        assert_eq!(deep_merge(target, source)["items"], serde_json::json!([4]));
    }

    // ── load_with_env ───────────────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let loaded = load_with_env(Path::new("/nonexistent/.policydoc.json"), no_env).unwrap();
        let settings = loaded.settings;
        assert!(loaded.ignored.is_empty());
        assert_eq!(settings.logging.level, "warn");
        assert_eq!(settings.discovery.rule_suffix, ".rego");
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"logging": {"level": "debug"}, "render": {"sourceUrl": "https://example.com/blob/main"}}"#,
        )
        .unwrap();

        let settings = load_with_env(&path, no_env).unwrap().settings;
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(
            settings.render.source_url.as_deref(),
            Some("https://example.com/blob/main")
        );
        assert_eq!(settings.discovery.test_suffix, "_test.rego");
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = load_with_env(&path, no_env);
        assert!(matches!(result.unwrap_err(), SettingsError::Json(_)));
    }

    #[test]
    fn load_rejects_invalid_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"discovery": {"ruleSuffix": ""}}"#).unwrap();

        let result = load_with_env(&path, no_env);
        assert!(matches!(result.unwrap_err(), SettingsError::InvalidValue(_)));
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"logging": {"level": "debug"}}"#).unwrap();

        let env = env_from(&[
            ("POLICYDOC_LOG_LEVEL", "INFO"),
            ("POLICYDOC_SOURCE_URL", "https://git.example/tree/main"),
        ]);
        let settings = load_with_env(&path, env).unwrap().settings;
        assert_eq!(settings.logging.level, "info");
        assert_eq!(
            settings.render.source_url.as_deref(),
            Some("https://git.example/tree/main")
        );
    }

    #[test]
    fn invalid_env_level_is_ignored() {
        let mut settings = DocSettings::default();
        let ignored =
            apply_env_overrides(&mut settings, env_from(&[("POLICYDOC_LOG_LEVEL", "chatty")]));
        assert_eq!(settings.logging.level, "warn");
        assert_eq!(ignored.len(), 1);
        assert_eq!(ignored[0].key, "POLICYDOC_LOG_LEVEL");
        assert_eq!(ignored[0].value, "chatty");
        assert!(ignored[0].to_string().starts_with("POLICYDOC_LOG_LEVEL='chatty' ignored"));
    }

    #[test]
    fn load_reports_ignored_overrides() {
        let env = env_from(&[("POLICYDOC_LOG_LEVEL", "chatty"), ("POLICYDOC_SOURCE_URL", "https://x")]);
        let loaded = load_with_env(Path::new("/nonexistent/.policydoc.json"), env).unwrap();
        assert_eq!(loaded.settings.logging.level, "warn");
        assert_eq!(loaded.settings.render.source_url.as_deref(), Some("https://x"));
        let keys: Vec<&str> = loaded.ignored.iter().map(|o| o.key).collect();
        assert_eq!(keys, vec!["POLICYDOC_LOG_LEVEL"]);
    }

    #[test]
    fn empty_env_value_is_unset() {
        let mut settings = DocSettings::default();
        let ignored = apply_env_overrides(&mut settings, env_from(&[("POLICYDOC_RULE_SUFFIX", "")]));
        assert_eq!(settings.discovery.rule_suffix, ".rego");
        assert!(ignored.is_empty());
    }

    #[test]
    fn lone_rule_suffix_keeps_test_marker() {
        let env = env_from(&[("POLICYDOC_RULE_SUFFIX", ".rg")]);
        let loaded = load_with_env(Path::new("/nonexistent/.policydoc.json"), env).unwrap();
        assert_eq!(loaded.settings.discovery.rule_suffix, ".rg");
        assert_eq!(loaded.settings.discovery.test_suffix, "_test.rg");
        assert!(loaded.ignored.is_empty());
    }

    #[test]
    fn lone_rule_suffix_follows_file_test_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"discovery": {"testSuffix": "_spec.rego"}}"#).unwrap();

        let env = env_from(&[("POLICYDOC_RULE_SUFFIX", ".rg")]);
        let settings = load_with_env(&path, env).unwrap().settings;
        assert_eq!(settings.discovery.test_suffix, "_spec.rg");
    }

    #[test]
    fn mismatched_suffix_pair_is_ignored() {
        let env = env_from(&[
            ("POLICYDOC_RULE_SUFFIX", ".rg"),
            ("POLICYDOC_TEST_SUFFIX", "_test.rego"),
        ]);
        let loaded = load_with_env(Path::new("/nonexistent/.policydoc.json"), env).unwrap();
        assert_eq!(loaded.settings.discovery.rule_suffix, ".rego");
        assert_eq!(loaded.settings.discovery.test_suffix, "_test.rego");
        let keys: Vec<&str> = loaded.ignored.iter().map(|o| o.key).collect();
        assert_eq!(keys, vec!["POLICYDOC_RULE_SUFFIX", "POLICYDOC_TEST_SUFFIX"]);
        assert!(loaded.ignored[0].reason.contains("must end with ruleSuffix '.rg'"));
    }

    #[test]
    fn lone_test_suffix_must_fit_rule_suffix() {
        let mut settings = DocSettings::default();
        let ignored =
            apply_env_overrides(&mut settings, env_from(&[("POLICYDOC_TEST_SUFFIX", "_test.py")]));
        assert_eq!(settings.discovery.test_suffix, "_test.rego");
        assert_eq!(ignored.len(), 1);
        assert_eq!(ignored[0].key, "POLICYDOC_TEST_SUFFIX");
    }

    #[test]
    fn env_suffix_overrides() {
        let mut settings = DocSettings::default();
        let _ = apply_env_overrides(
            &mut settings,
            env_from(&[
                ("POLICYDOC_RULE_SUFFIX", ".rg"),
                ("POLICYDOC_TEST_SUFFIX", "_test.rg"),
            ]),
        );
        assert_eq!(settings.discovery.rule_suffix, ".rg");
        assert_eq!(settings.discovery.test_suffix, "_test.rg");
        assert!(settings.validate().is_ok());
    }
}

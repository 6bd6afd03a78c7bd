//! Pure helpers shared by page renderers.
//!
//! Each helper reports a [`DocError::Contract`] instead of panicking when an
//! annotation lacks what it needs.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use policydoc_core::constants::{BUILTIN_COLLECTION, RULE_DATA_KEY};
use policydoc_core::{Annotation, DocError, Result, Scope};
use policydoc_model::Package;

/// Suffix of a package anchor.
const PACKAGE_ANCHOR_SUFFIX: &str = "_package";
/// Separator between package segment and short name in a rule anchor.
const RULE_ANCHOR_SEPARATOR: &str = "__";

/// How a rule's violations are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Rules under a `deny` target.
    Failure,
    /// Rules under a `warn` target.
    Warning,
}

impl Severity {
    /// Lowercase label, `failure` or `warning`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Failure => "failure",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable cross-reference id for a package or rule.
///
/// Packages anchor on their last target segment plus `_package`. Rules
/// anchor on their package's last segment, `__`, and their `short_name`.
pub fn anchor(a: &Annotation) -> Result<String> {
    let path = &a.target_path;
    match a.scope {
        Scope::Package => {
            let last = path.last().ok_or_else(|| {
                DocError::Contract(format!("package '{}' has an empty target path", a.title))
            })?;
            Ok(format!("{last}{PACKAGE_ANCHOR_SUFFIX}"))
        }
        Scope::Rule => {
            let Some(package) = path.len().checked_sub(2).and_then(|i| path.get(i)) else {
                return Err(DocError::Contract(format!(
                    "rule '{}' target path '{}' is too short for an anchor",
                    a.title,
                    a.dotted_target()
                )));
            };
            let short_name = a.short_name().ok_or_else(|| {
                DocError::Contract(format!("rule '{}' has no custom.short_name", a.title))
            })?;
            Ok(format!("{package}{RULE_ANCHOR_SEPARATOR}{short_name}"))
        }
    }
}

/// Classify a rule by the last segment of its target path.
pub fn severity(a: &Annotation) -> Result<Severity> {
    let target = a.dotted_target();
    if target.ends_with(".deny") {
        Ok(Severity::Failure)
    } else if target.ends_with(".warn") {
        Ok(Severity::Warning)
    } else {
        Err(DocError::Contract(format!(
            "cannot classify '{target}' as a warning or failure rule"
        )))
    }
}

/// Whether `builtin` is one of the annotation's collection tags.
pub fn is_built_in(a: &Annotation) -> bool {
    a.collections()
        .is_some_and(|tags| tags.contains(&BUILTIN_COLLECTION))
}

/// Parameters a rule reads, keyed by name.
///
/// Starts from the rule's own `custom.rule_data` and overlays the package
/// annotation's `custom.<short_name>.rule_data`; package values win. Values
/// that are not objects are ignored.
pub fn rule_data<'a>(
    package: &'a Annotation,
    rule: &'a Annotation,
) -> BTreeMap<&'a str, &'a Value> {
    let own = rule.custom.get(RULE_DATA_KEY);
    let from_package = rule
        .short_name()
        .and_then(|name| package.custom.get(name))
        .and_then(|entry| entry.get(RULE_DATA_KEY));

    [own, from_package]
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .flat_map(|data| data.iter().map(|(k, v)| (k.as_str(), v)))
        .collect()
}

/// Short package name, the last segment of the package's target path.
pub fn package_name(p: &Package) -> Result<&str> {
    p.annotation
        .target_path
        .last()
        .map(String::as_str)
        .ok_or_else(|| {
            DocError::Contract(format!("package '{}' has an empty target path", p.title()))
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! Normalized annotation records.
//!
//! An [`Annotation`] is the rule-language independent shape of one metadata
//! block: everything downstream (model building, rendering) works on these
//! records only, so the extractor can be swapped per rule language.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{COLLECTIONS_KEY, COLLECTION_MARKER, SHORT_NAME_KEY};

/// What an annotation describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// A whole package (module namespace).
    Package,
    /// A single rule inside a package.
    Rule,
}

impl Scope {
    /// Parse a scope keyword as written in annotation metadata.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "package" => Some(Self::Package),
            "rule" => Some(Self::Rule),
            _ => None,
        }
    }

    /// The keyword for this scope.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Rule => "rule",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an annotation was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file, relative to the root it was discovered under.
    pub file: PathBuf,
    /// 1-based line of the annotation block.
    pub row: usize,
    /// Dotted path of the declaring package, e.g. `data.policy.release.example`.
    pub package_path: String,
}

/// One normalized metadata record attached to a package or rule declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Package or rule.
    pub scope: Scope,
    /// Human-readable title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Free-form custom metadata.
    pub custom: BTreeMap<String, Value>,
    /// Path segments of the annotated package or rule, starting with `data`.
    pub target_path: Vec<String>,
    /// Declaration site.
    pub location: SourceLocation,
}

impl Annotation {
    /// Target path joined with dots, e.g. `data.policy.release.example.deny`.
    pub fn dotted_target(&self) -> String {
        self.target_path.join(".")
    }

    /// A custom value as a string, if present and a string.
    pub fn custom_str(&self, key: &str) -> Option<&str> {
        self.custom.get(key).and_then(Value::as_str)
    }

    /// The rule's `short_name`.
    pub fn short_name(&self) -> Option<&str> {
        self.custom_str(SHORT_NAME_KEY)
    }

    /// Collection tags declared in `custom.collections`.
    ///
    /// Returns `None` unless the value is a sequence with at least one string
    /// element; non-string elements are skipped.
    pub fn collections(&self) -> Option<Vec<&str>> {
        let tags: Vec<&str> = self
            .custom
            .get(COLLECTIONS_KEY)?
            .as_array()?
            .iter()
            .filter_map(Value::as_str)
            .collect();
        (!tags.is_empty()).then_some(tags)
    }

    /// Whether the declaring package is a collection definition module.
    pub fn in_collection_module(&self) -> bool {
        is_collection_path(&self.location.package_path)
    }
}

/// Whether a dotted package path contains the collection marker segment.
///
/// Only packages nested under a `collection` segment qualify; a package
/// named `collection` itself is an ordinary package.
pub fn is_collection_path(package_path: &str) -> bool {
    package_path.contains(COLLECTION_MARKER)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

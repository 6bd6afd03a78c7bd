//! Error types for the documentation pipeline.
//!
//! Every [`DocError`] is fatal: the run stops at the first one. Problems that
//! only affect collection membership are reported as [`LookupWarning`]s.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Fatal errors raised while generating documentation.
#[derive(Debug, Error)]
pub enum DocError {
    /// A source root or file could not be read or walked.
    #[error("failed to read {}: {source}", path.display())]
    Discovery {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed annotation syntax or a broken module grouping convention.
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        /// Source file, relative to its root.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// A page could not be rendered or written.
    #[error("failed to render {}: {message}", path.display())]
    Render {
        /// Output artifact path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// An annotation violates a contract the renderer relies on.
    #[error("annotation contract violation: {0}")]
    Contract(String),
}

impl DocError {
    /// Shorthand for a [`DocError::Parse`].
    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, DocError>;

/// A collection-tagged rule whose owning package has no annotation.
///
/// The rule is left out of every collection; it stays in its own package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupWarning {
    /// Title of the rule that could not be placed.
    pub rule_title: String,
    /// Declaring file.
    pub file: PathBuf,
    /// Package path that was not found in the index.
    pub package_path: String,
}

impl fmt::Display for LookupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "package path '{}' not found for rule '{}' ({})",
            self.package_path,
            self.rule_title,
            self.file.display()
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

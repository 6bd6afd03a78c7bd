//! Fixed documentation topics.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Directory all topic sources live under.
pub const POLICY_DIR: &str = "policy";

/// A documentation category selecting modules by source directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Topic {
    /// Display name, e.g. `Build Task`.
    pub name: &'static str,
    /// Identifier used in source directories and output file names.
    pub qualifier: &'static str,
    /// Introductory text for the topic overview page.
    pub description: &'static str,
}

impl Topic {
    /// Source directory prefix, `policy/<qualifier>`.
    pub fn path_prefix(&self) -> PathBuf {
        Path::new(POLICY_DIR).join(self.qualifier)
    }

    /// Whether a root-relative module path belongs to this topic.
    ///
    /// Matches whole path components, so `policy/task` does not claim
    /// `policy/task_bundle/...`.
    pub fn contains(&self, file: &Path) -> bool {
        file.starts_with(self.path_prefix())
    }
}

/// Topics in generation order.
pub const TOPICS: [Topic; 5] = [
    Topic {
        name: "Release",
        qualifier: "release",
        description: "These rules are applied to pipeline run attestations associated with container images built by Konflux.",
    },
    Topic {
        name: "Pipeline",
        qualifier: "pipeline",
        description: "These rules are applied to Tekton pipeline definitions.",
    },
    Topic {
        name: "Task",
        qualifier: "task",
        description: "These rules are applied to Tekton task definitions.",
    },
    Topic {
        name: "Build Task",
        qualifier: "build_task",
        description: "These rules are applied to Tekton build task definitions.",
    },
    Topic {
        name: "StepAction",
        qualifier: "stepaction",
        description: "These rules are applied to Tekton StepAction definitions.",
    },
];

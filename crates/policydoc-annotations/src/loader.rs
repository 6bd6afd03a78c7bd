//! Filesystem rule-module scanner.
//!
//! Walks each source root for rule modules, skipping test modules, and feeds
//! them through the extractor into one [`AnnotationSet`]. Entries are visited
//! in file-name order so repeated runs see modules in the same order.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use policydoc_core::{DocError, Result};
use policydoc_settings::DiscoverySettings;

use crate::parser::parse_module;
use crate::registry::AnnotationSet;

/// A rule module found under a source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredModule {
    /// Source root the module was found under.
    pub root: PathBuf,
    /// Module path relative to `root`.
    pub relative_path: PathBuf,
}

impl DiscoveredModule {
    /// Full path of the module on disk.
    pub fn full_path(&self) -> PathBuf {
        self.root.join(&self.relative_path)
    }
}

/// Whether a file name denotes a rule module (and not a rule test).
pub fn is_rule_source(file_name: &str, settings: &DiscoverySettings) -> bool {
    file_name.ends_with(&settings.rule_suffix) && !file_name.ends_with(&settings.test_suffix)
}

/// Enumerate rule modules under every root, roots in the given order.
///
/// Symbolic links are followed, so linked modules and directories are
/// scanned like regular ones. Any root or entry that cannot be read aborts
/// discovery, including a link cycle.
pub fn discover(roots: &[PathBuf], settings: &DiscoverySettings) -> Result<Vec<DiscoveredModule>> {
    let mut modules = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| DocError::Discovery {
                path: e.path().map_or_else(|| root.clone(), Path::to_path_buf),
                source: e.into(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                debug!(path = %entry.path().display(), "skipping entry with non-UTF-8 name");
                continue;
            };
            if !is_rule_source(name, settings) {
                continue;
            }

            let relative_path = match entry.path().strip_prefix(root) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
                _ => PathBuf::from(name),
            };
            modules.push(DiscoveredModule {
                root: root.clone(),
                relative_path,
            });
        }
    }

    debug!(roots = roots.len(), modules = modules.len(), "discovery complete");
    Ok(modules)
}

/// Discover, extract, and aggregate every module under `roots`.
pub fn load_all(roots: &[PathBuf], settings: &DiscoverySettings) -> Result<AnnotationSet> {
    let mut set = AnnotationSet::new();

    for module in discover(roots, settings)? {
        let full_path = module.full_path();
        let content = std::fs::read_to_string(&full_path).map_err(|source| DocError::Discovery {
            path: full_path.clone(),
            source,
        })?;

        let annotations = parse_module(&module.relative_path, &content)?;
        debug!(
            file = %module.relative_path.display(),
            annotations = annotations.len(),
            "module loaded"
        );
        set.insert_module(&module.root, &module.relative_path, annotations);
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn rel_paths(modules: &[DiscoveredModule]) -> Vec<String> {
        modules
            .iter()
            .map(|m| m.relative_path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_is_rule_source() {
        let settings = DiscoverySettings::default();
        assert!(is_rule_source("example.rego", &settings));
        assert!(!is_rule_source("example_test.rego", &settings));
        assert!(!is_rule_source("README.md", &settings));
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "policy/release/b/b.rego", "package b\n");
        write(tmp.path(), "policy/release/a/a.rego", "package a\n");
        write(tmp.path(), "policy/release/a/a_test.rego", "package a_test\n");
        write(tmp.path(), "policy/release/a/data.yml", "x: 1\n");

        let modules = discover(&[tmp.path().to_path_buf()], &DiscoverySettings::default()).unwrap();
        assert_eq!(
            rel_paths(&modules),
            vec!["policy/release/a/a.rego", "policy/release/b/b.rego"]
        );
        assert!(modules.iter().all(|m| m.root == tmp.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_follows_symlinks() {
        use std::os::unix::fs::symlink;

        let shared = TempDir::new().unwrap();
        write(shared.path(), "common/common.rego", "package common\n");
        write(shared.path(), "linked.rego", "package linked\n");

        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "policy/own.rego", "package own\n");
        symlink(shared.path().join("linked.rego"), tmp.path().join("policy/linked.rego")).unwrap();
        symlink(shared.path().join("common"), tmp.path().join("policy/common")).unwrap();

        let modules = discover(&[tmp.path().to_path_buf()], &DiscoverySettings::default()).unwrap();
        assert_eq!(
            rel_paths(&modules),
            vec!["policy/common/common.rego", "policy/linked.rego", "policy/own.rego"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_logs_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        use policydoc_core::logging::capture_logs;
        use tracing::Level;

        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "ok.rego", "package ok\n");
        let odd = tmp.path().join(OsStr::from_bytes(b"bad\xff.rego"));
        // Some filesystems refuse non-UTF-8 names outright.
        if fs::write(&odd, "package bad\n").is_err() {
            return;
        }

        let (logs, _guard) = capture_logs();
        let modules = discover(&[tmp.path().to_path_buf()], &DiscoverySettings::default()).unwrap();
        assert_eq!(rel_paths(&modules), vec!["ok.rego"]);
        assert!(logs.has_event(Level::DEBUG, "skipping entry with non-UTF-8 name"));
    }

    #[test]
    fn test_discover_multiple_roots_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(second.path(), "z.rego", "package z\n");
        write(first.path(), "y.rego", "package y\n");

        let roots = vec![second.path().to_path_buf(), first.path().to_path_buf()];
        let modules = discover(&roots, &DiscoverySettings::default()).unwrap();
        assert_eq!(rel_paths(&modules), vec!["z.rego", "y.rego"]);
    }

    #[test]
    fn test_discover_missing_root_is_error() {
        let err = discover(
            &[PathBuf::from("/nonexistent/policy/root")],
            &DiscoverySettings::default(),
        )
        .unwrap_err();
        match err {
            DocError::Discovery { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/policy/root"));
            }
            other => panic!("expected discovery error, got {other:?}"),
        }
    }

    #[test]
    fn test_discover_custom_suffixes() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.rg", "package a\n");
        write(tmp.path(), "a_test.rg", "package a\n");
        write(tmp.path(), "b.rego", "package b\n");

        let settings = DiscoverySettings {
            rule_suffix: ".rg".to_string(),
            test_suffix: "_test.rg".to_string(),
        };
        let modules = discover(&[tmp.path().to_path_buf()], &settings).unwrap();
        assert_eq!(rel_paths(&modules), vec!["a.rg"]);
    }

    #[test]
    fn test_load_all_aggregates() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "policy/release/example/example.rego",
            "# METADATA\n# title: Example\npackage policy.release.example\n\n# METADATA\n# title: Rule\n# custom:\n#   short_name: rule\ndeny contains r if { true }\n",
        );
        write(tmp.path(), "policy/lib/lib.rego", "package lib\n");

        let set = load_all(&[tmp.path().to_path_buf()], &DiscoverySettings::default()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.modules().len(), 1);
        let module = &set.modules()[0];
        assert_eq!(
            module.file,
            PathBuf::from("policy/release/example/example.rego")
        );
        assert_eq!(
            set.iter().nth(1).unwrap().location.file,
            PathBuf::from("policy/release/example/example.rego")
        );
    }

    #[test]
    fn test_load_all_propagates_parse_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "bad.rego", "# METADATA\n# title: [oops\npackage bad\n");

        let err = load_all(&[tmp.path().to_path_buf()], &DiscoverySettings::default()).unwrap_err();
        assert!(matches!(err, DocError::Parse { .. }));
    }
}

//! Aggregated annotation set.
//!
//! Keeps every module's annotations in encounter order and indexes package
//! annotations by package path. Modules that share a package path are not
//! merged here; the model builder unions their rules.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use policydoc_core::{Annotation, Scope};

/// The annotations extracted from one module.
#[derive(Debug, Clone)]
pub struct ModuleAnnotations {
    /// Discovery root the module was found under.
    pub root: PathBuf,
    /// Module path relative to `root`.
    pub file: PathBuf,
    /// Annotations in source order.
    pub annotations: Vec<Annotation>,
}

impl ModuleAnnotations {
    /// Dotted package path of the module.
    pub fn package_path(&self) -> Option<&str> {
        self.annotations
            .first()
            .map(|a| a.location.package_path.as_str())
    }
}

/// All annotations of one generation run.
#[derive(Debug, Default)]
pub struct AnnotationSet {
    modules: Vec<ModuleAnnotations>,
    /// Package path → (module index, annotation index).
    packages: HashMap<String, (usize, usize)>,
}

impl AnnotationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one module's annotations. Modules without annotations are skipped.
    ///
    /// The first package annotation seen for a package path is the one the
    /// index returns.
    pub fn insert_module(&mut self, root: &Path, file: &Path, annotations: Vec<Annotation>) {
        if annotations.is_empty() {
            return;
        }

        let module_idx = self.modules.len();
        for (idx, a) in annotations.iter().enumerate() {
            if a.scope != Scope::Package {
                continue;
            }
            let path = &a.location.package_path;
            if self.packages.contains_key(path) {
                debug!(package = %path, file = %file.display(), "package already indexed, keeping first declaration");
            } else {
                let _ = self.packages.insert(path.clone(), (module_idx, idx));
            }
        }

        self.modules.push(ModuleAnnotations {
            root: root.to_path_buf(),
            file: file.to_path_buf(),
            annotations,
        });
    }

    /// Modules in encounter order.
    pub fn modules(&self) -> &[ModuleAnnotations] {
        &self.modules
    }

    /// Every annotation, flattened in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.modules.iter().flat_map(|m| m.annotations.iter())
    }

    /// The package annotation declared for a dotted package path.
    pub fn package(&self, package_path: &str) -> Option<&Annotation> {
        let &(module, idx) = self.packages.get(package_path)?;
        self.modules.get(module)?.annotations.get(idx)
    }

    /// Total number of annotations.
    pub fn len(&self) -> usize {
        self.modules.iter().map(|m| m.annotations.len()).sum()
    }

    /// Whether the set holds no annotations.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_module;

    fn module(file: &str, src: &str) -> (PathBuf, Vec<Annotation>) {
        let path = PathBuf::from(file);
        let annotations = parse_module(&path, src).unwrap();
        (path, annotations)
    }

    fn set_from(modules: &[(&str, &str)]) -> AnnotationSet {
        let mut set = AnnotationSet::new();
        for (file, src) in modules {
            let (path, annotations) = module(file, src);
            set.insert_module(Path::new("/repo"), &path, annotations);
        }
        set
    }

    #[test]
    fn test_new_set_is_empty() {
        let set = AnnotationSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_empty_module_skipped() {
        let set = set_from(&[("policy/lib.rego", "package lib\n")]);
        assert!(set.is_empty());
        assert!(set.modules().is_empty());
    }

    #[test]
    fn test_flat_iteration_in_encounter_order() {
        let set = set_from(&[
            (
                "policy/release/b.rego",
                "# METADATA\n# title: B\npackage policy.release.b\n# METADATA\n# title: B1\ndeny := 1\n",
            ),
            ("policy/release/a.rego", "# METADATA\n# title: A\npackage policy.release.a\n"),
        ]);
        let titles: Vec<&str> = set.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "B1", "A"]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.modules()[0].package_path(), Some("data.policy.release.b"));
    }

    #[test]
    fn test_package_lookup() {
        let set = set_from(&[(
            "policy/release/a.rego",
            "# METADATA\n# title: Alpha\npackage policy.release.a\n",
        )]);
        assert_eq!(set.package("data.policy.release.a").unwrap().title, "Alpha");
        assert!(set.package("data.policy.release.missing").is_none());
    }

    #[test]
    fn test_first_package_declaration_wins() {
        let set = set_from(&[
            ("policy/a/one.rego", "# METADATA\n# title: First\npackage policy.a\n"),
            ("policy/a/two.rego", "# METADATA\n# title: Second\npackage policy.a\n"),
        ]);
        assert_eq!(set.package("data.policy.a").unwrap().title, "First");
        assert_eq!(set.modules().len(), 2);
    }
}

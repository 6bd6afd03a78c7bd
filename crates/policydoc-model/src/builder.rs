//! Topic model construction.
//!
//! Building runs in two phases. [`ModelBuilder::new`] resolves collection
//! membership once over the whole annotation set, because a collection may
//! pull rules from any topic. [`ModelBuilder::build`] then assembles one
//! topic: it groups the topic's modules into packages and collections and
//! sorts everything by title.

use std::collections::HashMap;

use tracing::{debug, warn};

use policydoc_annotations::AnnotationSet;
use policydoc_core::{Annotation, LookupWarning, Scope};

use crate::topic::{TOPICS, Topic};
use crate::types::{Collection, CollectionRule, Package, TopicDoc};

/// Builds [`TopicDoc`]s from one run's annotations.
#[derive(Debug)]
pub struct ModelBuilder<'a> {
    set: &'a AnnotationSet,
    /// Collection tag → member rules, sorted.
    memberships: HashMap<String, Vec<CollectionRule>>,
    warnings: Vec<LookupWarning>,
}

impl<'a> ModelBuilder<'a> {
    /// Resolve collection membership across the whole set.
    ///
    /// Rules tagged with collections whose package has no annotation are
    /// reported as [`LookupWarning`]s and left out of every collection.
    pub fn new(set: &'a AnnotationSet) -> Self {
        let mut memberships: HashMap<String, Vec<CollectionRule>> = HashMap::new();
        let mut warnings = Vec::new();

        for rule in set.iter().filter(|a| a.scope == Scope::Rule) {
            let Some(tags) = rule.collections() else {
                continue;
            };

            let package_path = &rule.location.package_path;
            let Some(package) = set.package(package_path) else {
                warn!(
                    rule = %rule.title,
                    file = %rule.location.file.display(),
                    package = %package_path,
                    "package path not found for collection rule, skipping"
                );
                warnings.push(LookupWarning {
                    rule_title: rule.title.clone(),
                    file: rule.location.file.clone(),
                    package_path: package_path.clone(),
                });
                continue;
            };

            let mut seen: Vec<&str> = Vec::with_capacity(tags.len());
            for tag in tags {
                if seen.contains(&tag) {
                    continue;
                }
                seen.push(tag);
                memberships
                    .entry(tag.to_string())
                    .or_default()
                    .push(CollectionRule::new(&package.title, rule));
            }
        }

        for rules in memberships.values_mut() {
            rules.sort_by(|a, b| {
                (a.package_title.as_str(), a.annotation.title.as_str())
                    .cmp(&(b.package_title.as_str(), b.annotation.title.as_str()))
            });
        }

        Self {
            set,
            memberships,
            warnings,
        }
    }

    /// Lookup warnings raised while resolving collections.
    pub fn warnings(&self) -> &[LookupWarning] {
        &self.warnings
    }

    /// Build the model for every registered topic, in registry order.
    pub fn build_all(&self) -> Vec<TopicDoc> {
        TOPICS.iter().map(|topic| self.build(topic)).collect()
    }

    /// Build the model for one topic.
    pub fn build(&self, topic: &Topic) -> TopicDoc {
        let mut packages: Vec<Package> = Vec::new();
        let mut by_path: HashMap<&str, usize> = HashMap::new();
        let mut collections: Vec<Collection> = Vec::new();

        for module in self.set.modules().iter().filter(|m| topic.contains(&m.file)) {
            let mut current: Option<usize> = None;

            for a in &module.annotations {
                if a.in_collection_module() {
                    match a.scope {
                        Scope::Package => collections.push(self.collection(a)),
                        Scope::Rule => {
                            debug!(rule = %a.title, file = %module.file.display(), "rule in collection module is not documented");
                        }
                    }
                    continue;
                }

                match a.scope {
                    Scope::Package => {
                        let idx = *by_path
                            .entry(a.location.package_path.as_str())
                            .or_insert_with(|| {
                                packages.push(Package::new(a.clone()));
                                packages.len() - 1
                            });
                        current = Some(idx);
                    }
                    Scope::Rule => {
                        let owner = current
                            .or_else(|| by_path.get(a.location.package_path.as_str()).copied());
                        match owner {
                            Some(idx) => packages[idx].rules.push(a.clone()),
                            None => warn!(
                                rule = %a.title,
                                file = %module.file.display(),
                                "rule has no package annotation in this topic, skipping"
                            ),
                        }
                    }
                }
            }
        }

        for package in &mut packages {
            package.rules.sort_by(|a, b| a.title.cmp(&b.title));
        }
        packages.sort_by(|a, b| a.title().cmp(b.title()));
        collections.sort_by(|a, b| a.title().cmp(b.title()));

        debug!(
            topic = topic.qualifier,
            packages = packages.len(),
            collections = collections.len(),
            "topic model built"
        );

        TopicDoc {
            topic: *topic,
            packages: (!packages.is_empty()).then_some(packages),
            collections: (!collections.is_empty()).then_some(collections),
        }
    }

    fn collection(&self, annotation: &Annotation) -> Collection {
        Collection {
            annotation: annotation.clone(),
            rules: self
                .memberships
                .get(&annotation.title)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

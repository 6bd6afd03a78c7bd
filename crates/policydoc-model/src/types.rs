//! Document model types.

use serde::Serialize;
use serde_json::Value;

use policydoc_core::Annotation;
use policydoc_core::constants::PACKAGE_TITLE_KEY;

use crate::topic::Topic;

/// A package annotation and the rule annotations it owns.
#[derive(Debug, Clone, Serialize)]
pub struct Package {
    /// The package-scope annotation.
    pub annotation: Annotation,
    /// Owned rules, sorted by title.
    pub rules: Vec<Annotation>,
}

impl Package {
    /// Start a package with no rules.
    pub fn new(annotation: Annotation) -> Self {
        Self {
            annotation,
            rules: Vec::new(),
        }
    }

    /// Package title.
    pub fn title(&self) -> &str {
        &self.annotation.title
    }
}

/// A rule listed in a collection, tagged with its owning package's title.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionRule {
    /// Title of the package that declares the rule.
    pub package_title: String,
    /// The rule annotation; its custom map also carries `package_title`.
    pub annotation: Annotation,
}

impl CollectionRule {
    /// Tag a copy of `rule` with its package title.
    pub fn new(package_title: &str, rule: &Annotation) -> Self {
        let mut annotation = rule.clone();
        let _ = annotation.custom.insert(
            PACKAGE_TITLE_KEY.to_string(),
            Value::String(package_title.to_string()),
        );
        Self {
            package_title: package_title.to_string(),
            annotation,
        }
    }
}

/// A cross-cutting group of rules sharing a collection tag.
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    /// The collection's defining annotation; its title is the tag.
    pub annotation: Annotation,
    /// Member rules, sorted by `(package_title, rule title)`.
    pub rules: Vec<CollectionRule>,
}

impl Collection {
    /// Collection title (the tag rules use to join it).
    pub fn title(&self) -> &str {
        &self.annotation.title
    }
}

/// The model of one topic, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct TopicDoc {
    /// The topic this model belongs to.
    pub topic: Topic,
    /// Packages sorted by title, `None` when the topic has none.
    pub packages: Option<Vec<Package>>,
    /// Collections sorted by title, `None` when the topic has none.
    pub collections: Option<Vec<Collection>>,
}

impl TopicDoc {
    /// Packages, or an empty slice.
    pub fn packages(&self) -> &[Package] {
        self.packages.as_deref().unwrap_or_default()
    }

    /// Collections, or an empty slice.
    pub fn collections(&self) -> &[Collection] {
        self.collections.as_deref().unwrap_or_default()
    }
}

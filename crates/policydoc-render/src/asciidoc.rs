//! Built-in AsciiDoc renderer.
//!
//! Pages follow Antora conventions: cross references are relative to the
//! module's `pages` family, so the overview links `packages/<q>_<name>.adoc`
//! and the nav partial links both page kinds by name.

use std::fmt::Write;
use std::path::Path;

use serde_json::Value;

use policydoc_core::constants::{EFFECTIVE_ON_KEY, FAILURE_MSG_KEY, SOLUTION_KEY};
use policydoc_core::{Annotation, Result};
use policydoc_model::{Collection, CollectionRule, Package, TOPICS, TopicDoc};

use crate::helpers::{anchor, is_built_in, package_name, rule_data, severity};
use crate::renderer::PageRenderer;
use crate::writer::{overview_page, package_page};

/// Id of the overview section listing collections.
const COLLECTIONS_SECTION: &str = "_available_rule_collections";
/// Id of the overview section listing packages.
const PACKAGES_SECTION: &str = "_available_rule_packages";

/// Renders AsciiDoc pages for an Antora documentation module.
#[derive(Debug, Clone, Default)]
pub struct AsciidocRenderer {
    /// Base URL rule sources are linked under, e.g. a repository tree URL.
    source_url: Option<String>,
}

impl AsciidocRenderer {
    /// Create a renderer. Without a `source_url`, rule sources are shown
    /// as plain `file:row` references.
    pub fn new(source_url: Option<String>) -> Self {
        let source_url = source_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        Self { source_url }
    }

    fn source_reference(&self, rule: &Annotation) -> String {
        let file = display_path(&rule.location.file);
        let row = rule.location.row;
        match &self.source_url {
            Some(base) => format!("{base}/{file}#L{row}[{file}:{row}, window=\"_blank\"]"),
            None => format!("`{file}:{row}`"),
        }
    }

    fn write_collection(out: &mut String, collection: &Collection) -> Result<()> {
        let _ = writeln!(out, "[#{}]", anchor(&collection.annotation)?);
        let _ = writeln!(out, "=== {}\n", collection.title());
        write_description(out, &collection.annotation);

        if collection.rules.is_empty() {
            let _ = writeln!(out, "No rules are included in this collection.\n");
            return Ok(());
        }

        let _ = writeln!(out, "Rules included:\n");
        for member in &collection.rules {
            let _ = writeln!(out, "* {}", collection_rule_link(member)?);
        }
        out.push('\n');
        Ok(())
    }

    fn write_rule(
        &self,
        out: &mut String,
        package: &Package,
        name: &str,
        rule: &Annotation,
    ) -> Result<()> {
        let id = anchor(rule)?;
        let severity = severity(rule)?;

        let _ = writeln!(out, "[#{id}]");
        let _ = writeln!(out, "=== link:#{id}[{}]\n", rule.title);
        write_description(out, rule);

        if let Some(solution) = rule.custom_str(SOLUTION_KEY) {
            let _ = writeln!(out, "*Solution*: {}\n", solution.trim_end());
        }

        let label = severity.as_str().to_uppercase();
        let _ = writeln!(
            out,
            "* Rule type: [rule-type-indicator {severity}]#{label}#"
        );
        if let Some(message) = rule.custom_str(FAILURE_MSG_KEY) {
            let _ = writeln!(out, "* {label} message: `{message}`");
        }
        if let Some(short_name) = rule.short_name() {
            let _ = writeln!(out, "* Code: `{name}.{short_name}`");
        }
        if let Some(date) = rule.custom_str(EFFECTIVE_ON_KEY) {
            let _ = writeln!(out, "* Effective from: `{date}`");
        }
        let data = rule_data(&package.annotation, rule);
        if !data.is_empty() {
            let _ = writeln!(out, "* Rule data:");
            for (key, value) in data {
                let _ = writeln!(out, "** `{key}`: `{}`", data_value(value));
            }
        }
        if is_built_in(rule) {
            let _ = writeln!(out, "* Included in the built-in collection");
        }
        let _ = writeln!(out, "* Source: {}\n", self.source_reference(rule));
        Ok(())
    }
}

impl PageRenderer for AsciidocRenderer {
    fn render_nav(&self, doc: &TopicDoc) -> Result<String> {
        let topic = &doc.topic;
        let page = overview_page(topic.qualifier);
        let mut out = String::new();

        let _ = writeln!(out, "* xref:{page}[{} Policy]", topic.name);

        if !doc.collections().is_empty() {
            let _ = writeln!(out, "** xref:{page}#{COLLECTIONS_SECTION}[Rule Collections]");
            for collection in doc.collections() {
                let _ = writeln!(
                    out,
                    "*** xref:{page}#{}[{}]",
                    anchor(&collection.annotation)?,
                    collection.title()
                );
            }
        }

        if !doc.packages().is_empty() {
            let _ = writeln!(out, "** xref:{page}#{PACKAGES_SECTION}[Rule Packages]");
            for package in doc.packages() {
                let _ = writeln!(
                    out,
                    "*** xref:packages/{}[{}]",
                    package_page(topic.qualifier, package_name(package)?),
                    package.title()
                );
            }
        }

        Ok(out)
    }

    fn render_overview(&self, doc: &TopicDoc) -> Result<String> {
        let topic = &doc.topic;
        let mut out = String::new();

        let _ = writeln!(out, "= {} Policy\n", topic.name);
        let _ = writeln!(out, "{}\n", topic.description);

        if !doc.collections().is_empty() {
            let _ = writeln!(out, "[#{COLLECTIONS_SECTION}]");
            let _ = writeln!(out, "== Available rule collections\n");
            for collection in doc.collections() {
                Self::write_collection(&mut out, collection)?;
            }
        }

        if !doc.packages().is_empty() {
            let _ = writeln!(out, "[#{PACKAGES_SECTION}]");
            let _ = writeln!(out, "== Available rule packages\n");
            let _ = writeln!(out, "[cols=\"2,6\"]");
            let _ = writeln!(out, "|===");
            let _ = writeln!(out, "|*Package Name*");
            let _ = writeln!(out, "|*Description*\n");
            for package in doc.packages() {
                let name = package_name(package)?;
                let _ = writeln!(
                    out,
                    "| [#{}]xref:packages/{}[{name}]",
                    anchor(&package.annotation)?,
                    package_page(topic.qualifier, name)
                );
                let _ = writeln!(out, "a| {}\n", package.annotation.description.trim_end());
            }
            let _ = writeln!(out, "|===");
        }

        Ok(out)
    }

    fn render_package(&self, _doc: &TopicDoc, package: &Package) -> Result<String> {
        let name = package_name(package)?;
        let mut out = String::new();

        let _ = writeln!(out, "= {} Package\n", package.title());
        write_description(&mut out, &package.annotation);
        let _ = writeln!(out, "== Package Name\n");
        let _ = writeln!(out, "* `{name}`\n");

        if package.rules.is_empty() {
            return Ok(out);
        }

        let _ = writeln!(out, "== Rules Included\n");
        for rule in &package.rules {
            self.write_rule(&mut out, package, name, rule)?;
        }

        Ok(out)
    }
}

/// Link from a collection listing to the rule's section on its package page.
///
/// The package page belongs to whichever topic holds the rule's source,
/// which need not be the collection's topic. Rules outside every topic have
/// no page and are listed as plain text.
fn collection_rule_link(member: &CollectionRule) -> Result<String> {
    let rule = &member.annotation;
    let label = format!("{}: {}", member.package_title, rule.title);

    let Some(topic) = TOPICS.iter().find(|t| t.contains(&rule.location.file)) else {
        return Ok(label);
    };
    let id = anchor(rule)?;
    let path = &rule.target_path;
    let Some(package) = path.len().checked_sub(2).and_then(|i| path.get(i)) else {
        return Ok(label);
    };
    Ok(format!(
        "xref:packages/{}#{id}[{label}]",
        package_page(topic.qualifier, package)
    ))
}

/// Strings as written, anything else as compact JSON.
fn data_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_description(out: &mut String, a: &Annotation) {
    let description = a.description.trim_end();
    if !description.is_empty() {
        let _ = writeln!(out, "{description}\n");
    }
}

/// Forward-slash form of a relative path, for links and references.
fn display_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

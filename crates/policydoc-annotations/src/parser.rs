//! Rego annotation extractor.
//!
//! An annotation block starts with a `# METADATA` comment line. The comment
//! lines that follow it, with `#` and one space stripped, form a YAML mapping.
//! The block documents the next statement in the file: the `package`
//! declaration or a rule head.
//!
//! ```text
//! # METADATA
//! # title: No bad things
//! # custom:
//! #   short_name: no_bad_things
//! #   collections: [builtin]
//! deny contains result if {
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use policydoc_core::constants::DATA_ROOT;
use policydoc_core::{Annotation, DocError, Result, Scope, SourceLocation};

const METADATA_MARKER: &str = "METADATA";

/// YAML body of an annotation block. Unlisted OPA keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnnotation {
    scope: Option<String>,
    title: Option<String>,
    description: Option<String>,
    custom: BTreeMap<String, Value>,
}

/// An annotation block awaiting its statement.
struct Block {
    row: usize,
    yaml: String,
}

/// A statement an annotation block can attach to.
enum Statement {
    Package,
    Rule(String),
}

/// Extract all annotations from one module's source.
///
/// `path` is the module path relative to its discovery root; it is recorded
/// in each annotation's [`SourceLocation`]. A module without annotation
/// blocks yields an empty vector.
pub fn parse_module(path: &Path, content: &str) -> Result<Vec<Annotation>> {
    let lines: Vec<&str> = content.lines().collect();
    let mut package: Option<Vec<String>> = None;
    let mut pending: Option<Block> = None;
    let mut annotations = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        let row = i + 1;
        i += 1;

        if is_metadata_marker(line) {
            if let Some(block) = pending {
                return Err(DocError::parse(
                    path,
                    block.row,
                    "annotation block is not followed by a package or rule",
                ));
            }
            let mut yaml = String::new();
            while i < lines.len() {
                let next = lines[i].trim_start();
                if is_metadata_marker(next.trim_end()) {
                    break;
                }
                let Some(rest) = next.strip_prefix('#') else {
                    break;
                };
                yaml.push_str(rest.strip_prefix(' ').unwrap_or(rest));
                yaml.push('\n');
                i += 1;
            }
            pending = Some(Block { row, yaml });
            continue;
        }

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(decl) = line.strip_prefix("package ") {
            if package.is_some() {
                return Err(DocError::parse(path, row, "duplicate package declaration"));
            }
            package = Some(parse_package_path(decl));
            if let Some(block) = pending.take() {
                annotations.push(build_annotation(
                    path,
                    &block,
                    Statement::Package,
                    package.as_deref(),
                )?);
            }
            continue;
        }

        let Some(block) = pending.take() else {
            continue;
        };
        let Some(name) = rule_name(line) else {
            return Err(DocError::parse(
                path,
                row,
                format!("annotation block must precede a package or rule, found '{line}'"),
            ));
        };
        annotations.push(build_annotation(
            path,
            &block,
            Statement::Rule(name),
            package.as_deref(),
        )?);
    }

    if let Some(block) = pending {
        return Err(DocError::parse(
            path,
            block.row,
            "annotation block is not followed by a package or rule",
        ));
    }

    check_grouping(path, &annotations)?;
    Ok(annotations)
}

/// Check the module grouping convention: at most one package annotation,
/// declared before the rule annotations it owns, and no rule annotations
/// without one.
pub fn check_grouping(path: &Path, annotations: &[Annotation]) -> Result<()> {
    let mut seen_package = false;
    for a in annotations {
        match a.scope {
            Scope::Package if seen_package => {
                return Err(DocError::parse(
                    path,
                    a.location.row,
                    "module declares more than one package annotation",
                ));
            }
            Scope::Package => seen_package = true,
            Scope::Rule if !seen_package => {
                return Err(DocError::parse(
                    path,
                    a.location.row,
                    format!(
                        "rule annotation '{}' has no package annotation before it in this module",
                        a.title
                    ),
                ));
            }
            Scope::Rule => {}
        }
    }
    Ok(())
}

fn build_annotation(
    path: &Path,
    block: &Block,
    statement: Statement,
    package: Option<&[String]>,
) -> Result<Annotation> {
    let raw = parse_yaml(path, block)?;

    let (default_scope, target_tail) = match statement {
        Statement::Package => (Scope::Package, None),
        Statement::Rule(name) => (Scope::Rule, Some(name)),
    };

    let scope = match raw.scope.as_deref() {
        None => default_scope,
        Some(s) => Scope::parse(s).ok_or_else(|| {
            DocError::parse(path, block.row, format!("unsupported annotation scope '{s}'"))
        })?,
    };
    if scope != default_scope {
        return Err(DocError::parse(
            path,
            block.row,
            format!("scope '{scope}' cannot annotate a {default_scope} declaration"),
        ));
    }

    let Some(package) = package else {
        return Err(DocError::parse(
            path,
            block.row,
            "rule annotation appears before the package declaration",
        ));
    };

    let mut target_path = Vec::with_capacity(package.len() + 2);
    target_path.push(DATA_ROOT.to_string());
    target_path.extend(package.iter().cloned());
    let package_path = target_path.join(".");
    target_path.extend(target_tail);

    Ok(Annotation {
        scope,
        title: raw.title.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        custom: raw.custom,
        target_path,
        location: SourceLocation {
            file: path.to_path_buf(),
            row: block.row,
            package_path,
        },
    })
}

fn parse_yaml(path: &Path, block: &Block) -> Result<RawAnnotation> {
    let invalid = |e: serde_yaml::Error| {
        DocError::parse(path, block.row, format!("invalid annotation YAML: {e}"))
    };

    let value: serde_yaml::Value = serde_yaml::from_str(&block.yaml).map_err(invalid)?;
    match value {
        serde_yaml::Value::Null => Ok(RawAnnotation::default()),
        serde_yaml::Value::Mapping(_) => serde_yaml::from_value(value).map_err(invalid),
        _ => Err(DocError::parse(
            path,
            block.row,
            "annotation block must be a YAML mapping",
        )),
    }
}

fn is_metadata_marker(line: &str) -> bool {
    line.strip_prefix('#')
        .is_some_and(|rest| rest.trim() == METADATA_MARKER)
}

/// Split `policy.release.example  # comment` into its segments.
fn parse_package_path(decl: &str) -> Vec<String> {
    let decl = decl.split('#').next().unwrap_or_default().trim();
    decl.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Leading identifier of a rule head, skipping a `default` keyword.
fn rule_name(line: &str) -> Option<String> {
    let head = line.strip_prefix("default ").unwrap_or(line).trim_start();
    let name: String = head
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let is_keyword = matches!(name.as_str(), "import" | "package");
    let starts_ok = name.chars().next().is_some_and(|c| !c.is_ascii_digit());
    (starts_ok && !is_keyword).then_some(name)
}

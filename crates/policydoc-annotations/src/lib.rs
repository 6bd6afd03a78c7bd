//! # policydoc-annotations
//!
//! Turns rule-source trees into one queryable set of annotation records.
//!
//! Rego modules document themselves with `# METADATA` comment blocks holding
//! YAML. This crate finds the modules, extracts those blocks, and aggregates
//! the results.
//!
//! ## Module Overview
//!
//! - [`loader`]: walk source roots and load every rule module
//! - [`parser`]: extract annotation blocks from one module
//! - [`registry`]: the aggregated [`registry::AnnotationSet`] and its
//!   package index
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use policydoc_annotations::loader::load_all;
//! use policydoc_settings::DiscoverySettings;
//!
//! let set = load_all(&[PathBuf::from("policy-repo")], &DiscoverySettings::default())?;
//! println!("{} annotations", set.len());
//! # Ok::<(), policydoc_core::DocError>(())
//! ```

#![deny(unsafe_code)]

pub mod loader;
pub mod parser;
pub mod registry;

pub use loader::{DiscoveredModule, discover, load_all};
pub use parser::parse_module;
pub use registry::{AnnotationSet, ModuleAnnotations};

//! # policydoc-model
//!
//! The document model: for each fixed [`Topic`], the packages whose modules
//! live under the topic's source directory, with their rules, and the rule
//! collections defined there.
//!
//! - [`topic`]: the fixed topic registry
//! - [`types`]: [`Package`], [`Collection`], [`TopicDoc`]
//! - [`builder`]: [`ModelBuilder`], which groups, cross-references, and
//!   sorts annotations into topic models
//!
//! ## Crate Position
//!
//! Depends on policydoc-core and policydoc-annotations.
//! Depended on by: policydoc-render, policydoc.

#![deny(unsafe_code)]

pub mod builder;
pub mod topic;
pub mod types;

pub use builder::ModelBuilder;
pub use topic::{TOPICS, Topic};
pub use types::{Collection, CollectionRule, Package, TopicDoc};

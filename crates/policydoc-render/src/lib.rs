//! # policydoc-render
//!
//! Turns topic models into an Antora documentation module.
//!
//! - [`renderer`]: the [`PageRenderer`] contract
//! - [`asciidoc`]: [`AsciidocRenderer`], the built-in implementation
//! - [`helpers`]: anchors, severities, and other pure page helpers
//! - [`writer`]: [`SiteWriter`] and the output file layout
//!
//! ## Crate Position
//!
//! Depends on policydoc-core and policydoc-model.
//! Depended on by: policydoc.

#![deny(unsafe_code)]

pub mod asciidoc;
pub mod helpers;
pub mod renderer;
pub mod writer;

pub use asciidoc::AsciidocRenderer;
pub use helpers::{Severity, anchor, is_built_in, package_name, rule_data, severity};
pub use renderer::PageRenderer;
pub use writer::SiteWriter;

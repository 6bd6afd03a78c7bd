//! # policydoc
//!
//! Generates an Antora documentation module from the `# METADATA`
//! annotations of Rego policy sources.
//!
//! [`generate`] runs the whole pipeline: discover rule modules, extract
//! their annotations, build one model per topic, and write the AsciiDoc
//! pages. The `policydoc` binary wraps it with a command line.
//!
//! ## Crate Position
//!
//! Top of the workspace. Depends on every other policydoc crate.

#![deny(unsafe_code)]

pub mod pipeline;

pub use pipeline::{GenerateReport, GenerateRequest, dump_annotations, generate, generate_with};

//! # policydoc-core
//!
//! Foundation types shared by every stage of the documentation pipeline.
//!
//! - [`annotation`]: the normalized [`Annotation`] record produced by any
//!   rule-language extractor
//! - [`errors`]: [`DocError`] for fatal failures and [`LookupWarning`] for
//!   diagnostics that do not stop a run
//! - [`logging`]: `tracing` subscriber setup and log capture for tests
//!
//! ## Crate Position
//!
//! Standalone. Depended on by every other policydoc crate.

#![deny(unsafe_code)]

pub mod annotation;
pub mod constants;
pub mod errors;
pub mod logging;

pub use annotation::{Annotation, Scope, SourceLocation};
pub use errors::{DocError, LookupWarning, Result};

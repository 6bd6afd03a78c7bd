//! Page renderer contract.

use policydoc_core::Result;
use policydoc_model::{Package, TopicDoc};

/// Produces the text of each generated page.
///
/// A renderer is built once per run and only borrowed while pages are
/// generated. Errors are [`policydoc_core::DocError::Contract`] violations
/// found in the annotations; the site writer reports them against the page
/// being written.
pub trait PageRenderer {
    /// Navigation partial: one entry per package and per collection.
    fn render_nav(&self, doc: &TopicDoc) -> Result<String>;

    /// Topic overview page listing every package and collection.
    fn render_overview(&self, doc: &TopicDoc) -> Result<String>;

    /// Page for one package and its rules.
    fn render_package(&self, doc: &TopicDoc, package: &Package) -> Result<String>;
}

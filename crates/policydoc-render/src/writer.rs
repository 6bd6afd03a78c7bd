//! Output layout and page writing.
//!
//! For each topic with qualifier `q` the writer produces:
//!
//! ```text
//! <out>/partials/<q>_policy_nav.adoc
//! <out>/pages/<q>_policy.adoc
//! <out>/pages/packages/<q>_<package>.adoc
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use policydoc_core::{DocError, Result};
use policydoc_model::TopicDoc;

use crate::helpers::package_name;
use crate::renderer::PageRenderer;

/// Directory holding navigation partials.
pub const PARTIALS_DIR: &str = "partials";
/// Directory holding pages.
pub const PAGES_DIR: &str = "pages";
/// Directory under [`PAGES_DIR`] holding package pages.
pub const PACKAGES_DIR: &str = "packages";

/// File name of a topic's navigation partial.
pub fn nav_partial(qualifier: &str) -> String {
    format!("{qualifier}_policy_nav.adoc")
}

/// File name of a topic's overview page.
pub fn overview_page(qualifier: &str) -> String {
    format!("{qualifier}_policy.adoc")
}

/// File name of a package page.
pub fn package_page(qualifier: &str, package: &str) -> String {
    format!("{qualifier}_{package}.adoc")
}

/// Writes rendered pages under an output directory.
#[derive(Debug, Clone)]
pub struct SiteWriter {
    out_dir: PathBuf,
}

impl SiteWriter {
    /// Writer rooted at `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Output root.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Render and write every page of one topic.
    ///
    /// Returns the written paths in write order. The first failure stops the
    /// topic; pages already written stay on disk.
    pub fn write_topic(&self, doc: &TopicDoc, renderer: &dyn PageRenderer) -> Result<Vec<PathBuf>> {
        let partials = self.out_dir.join(PARTIALS_DIR);
        let pages = self.out_dir.join(PAGES_DIR);
        let packages = pages.join(PACKAGES_DIR);
        for dir in [&partials, &pages, &packages] {
            create_dir(dir)?;
        }

        let q = doc.topic.qualifier;
        let mut written = Vec::new();

        let nav = partials.join(nav_partial(q));
        write_page(&nav, renderer.render_nav(doc))?;
        written.push(nav);

        let overview = pages.join(overview_page(q));
        write_page(&overview, renderer.render_overview(doc))?;
        written.push(overview);

        for package in doc.packages() {
            let name = package_name(package).map_err(|e| render_error(&packages, &e))?;
            let path = packages.join(package_page(q, name));
            write_page(&path, renderer.render_package(doc, package))?;
            written.push(path);
        }

        debug!(topic = q, files = written.len(), "topic written");
        Ok(written)
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| DocError::Render {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_page(path: &Path, rendered: Result<String>) -> Result<()> {
    let content = rendered.map_err(|e| render_error(path, &e))?;
    fs::write(path, content).map_err(|e| DocError::Render {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn render_error(path: &Path, err: &DocError) -> DocError {
    DocError::Render {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! End-to-end generation run.
//!
//! Discovery, extraction, model building and writing run strictly in that
//! order. The first fatal error aborts the run; pages written before it stay
//! on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use policydoc_annotations::{AnnotationSet, load_all};
use policydoc_core::{Annotation, DocError, LookupWarning, Result};
use policydoc_model::ModelBuilder;
use policydoc_render::{AsciidocRenderer, PageRenderer, SiteWriter};
use policydoc_settings::DocSettings;

/// What one run should read and write.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Rule source roots, scanned in order.
    pub roots: Vec<PathBuf>,
    /// Antora module directory pages are written under.
    pub out_dir: PathBuf,
    /// Where to dump the aggregated annotations as JSON, if anywhere.
    pub annotations_json: Option<PathBuf>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    /// Every file written, in write order.
    pub files_written: Vec<PathBuf>,
    /// Collection lookups that could not be resolved.
    pub warnings: Vec<LookupWarning>,
    /// Number of annotations extracted.
    pub annotation_count: usize,
}

/// Run the pipeline with the built-in AsciiDoc renderer.
pub fn generate(settings: &DocSettings, request: &GenerateRequest) -> Result<GenerateReport> {
    let renderer = AsciidocRenderer::new(settings.render.source_url.clone());
    generate_with(settings, request, &renderer)
}

/// Run the pipeline with a caller-supplied renderer.
pub fn generate_with(
    settings: &DocSettings,
    request: &GenerateRequest,
    renderer: &dyn PageRenderer,
) -> Result<GenerateReport> {
    let set = load_all(&request.roots, &settings.discovery)?;
    debug!(
        modules = set.modules().len(),
        annotations = set.len(),
        "annotations loaded"
    );

    if let Some(path) = &request.annotations_json {
        dump_annotations(&set, path)?;
    }

    let builder = ModelBuilder::new(&set);
    let writer = SiteWriter::new(&request.out_dir);
    let mut files_written = Vec::new();

    for doc in builder.build_all() {
        files_written.extend(writer.write_topic(&doc, renderer)?);
    }

    let report = GenerateReport {
        files_written,
        warnings: builder.warnings().to_vec(),
        annotation_count: set.len(),
    };
    info!(
        out_dir = %request.out_dir.display(),
        files = report.files_written.len(),
        annotations = report.annotation_count,
        warnings = report.warnings.len(),
        "documentation generated"
    );
    Ok(report)
}

/// Write every annotation of the set as a pretty-printed JSON array.
pub fn dump_annotations(set: &AnnotationSet, path: &Path) -> Result<()> {
    let annotations: Vec<&Annotation> = set.iter().collect();
    let render_error = |message: String| DocError::Render {
        path: path.to_path_buf(),
        message,
    };

    let mut json = serde_json::to_string_pretty(&annotations).map_err(|e| render_error(e.to_string()))?;
    json.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| render_error(e.to_string()))?;
    }
    fs::write(path, json).map_err(|e| render_error(e.to_string()))?;
    debug!(path = %path.display(), annotations = annotations.len(), "annotations dumped");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! # policydoc
//!
//! Command line entry point: loads settings, installs logging, and runs one
//! generation.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::warn;

use policydoc::{GenerateRequest, generate};
use policydoc_core::logging::init_subscriber;
use policydoc_settings::{load_settings, load_settings_from_path};

/// Generate AsciiDoc policy documentation from Rego annotations.
#[derive(Parser, Debug)]
#[command(name = "policydoc", version, about)]
struct Cli {
    /// Antora module directory to write the generated pages to.
    #[arg(long, value_name = "DIR")]
    adoc: PathBuf,

    /// Directory of Rego sources to scan. Repeat for several roots.
    #[arg(long, value_name = "DIR", required = true)]
    rego: Vec<PathBuf>,

    /// Settings file (defaults to `./.policydoc.json` when present).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write the extracted annotations as JSON to this file.
    #[arg(long, value_name = "FILE")]
    annotations_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => {
            if !path.is_file() {
                bail!("settings file not found: {}", path.display());
            }
            load_settings_from_path(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?
        }
        None => load_settings().context("failed to load settings")?,
    };

    let settings = loaded.settings;
    init_subscriber(&settings.logging.level);
    for ignored in &loaded.ignored {
        warn!(
            key = ignored.key,
            value = %ignored.value,
            reason = %ignored.reason,
            "environment override ignored"
        );
    }

    std::fs::create_dir_all(&cli.adoc)
        .with_context(|| format!("failed to create output directory {}", cli.adoc.display()))?;

    let request = GenerateRequest {
        roots: cli.rego,
        out_dir: cli.adoc,
        annotations_json: cli.annotations_json,
    };
    // Lookup warnings are logged as they are found.
    let _ = generate(&settings, &request).context("documentation generation failed")?;

    Ok(())
}

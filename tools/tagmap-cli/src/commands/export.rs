//! Export a bundle to a PDF document.

use std::path::PathBuf;
use std::sync::Arc;

use tagmap_common::clock::SystemClock;
use tagmap_common::config::AppConfig;
use tagmap_render_engine::export::{DocumentExporter, ExportOptions};

pub async fn run(
    config: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    project_name: Option<String>,
    measurement_id: Option<String>,
    project_id: Option<String>,
) -> anyhow::Result<()> {
    println!("Exporting bundle at: {}", path.display());

    let loaded = super::load_bundle(&path)?;
    let bundle = loaded.bundle;

    let output_path = output.unwrap_or_else(|| path.with_extension("pdf"));
    let options = ExportOptions {
        project_name: project_name.or_else(|| Some(bundle.project.name.clone())),
        measurement_id: measurement_id.or_else(|| bundle.project.measurement_id.clone()),
        project_id,
    };

    let exporter = DocumentExporter::from_config(config, Arc::new(SystemClock::new()))?;
    let report = exporter
        .generate_document(&output_path, bundle.frames, bundle.events, options)
        .await?;

    println!("Export complete:");
    println!("  File: {}", report.path.display());
    println!("  Pages: {}", report.pages);
    println!("  Size: {} bytes", report.bytes);
    if !report.missing_previews.is_empty() {
        println!(
            "  Previews unavailable: {}",
            report.missing_previews.join(", ")
        );
    }
    if report.truncated_blocks > 0 {
        println!("  Truncated event blocks: {}", report.truncated_blocks);
    }

    Ok(())
}

//! Print the overlay scene for one frame.

use std::path::PathBuf;

use tagmap_capture_engine::{regions_for_frame, OverlayRenderer};
use tagmap_project_model::display::DisplayFit;

pub fn run(path: PathBuf, frame_id: String, viewport: Option<(f64, f64)>) -> anyhow::Result<()> {
    let loaded = super::load_bundle(&path)?;
    let frame = loaded
        .bundle
        .frame(&frame_id)
        .ok_or_else(|| anyhow::anyhow!("Frame not found: {frame_id}"))?;

    let fit = DisplayFit::compute(frame.display_size(), super::envelope(viewport));
    let regions = regions_for_frame(&loaded.bundle.events, &frame.id, None);

    let mut renderer = OverlayRenderer::new();
    renderer.image_loaded();
    let scene = renderer.render(&fit, &regions, None);

    println!("{}", serde_json::to_string_pretty(&scene)?);
    Ok(())
}

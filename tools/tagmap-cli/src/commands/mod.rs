pub mod capture;
pub mod export;
pub mod info;
pub mod init;
pub mod overlay;
pub mod validate;

use std::path::Path;

use tagmap_project_model::display::ViewportEnvelope;
use tagmap_project_model::LoadedBundle;

pub(crate) fn load_bundle(path: &Path) -> anyhow::Result<LoadedBundle> {
    LoadedBundle::load(path).map_err(|e| anyhow::anyhow!("Failed to load bundle: {e}"))
}

pub(crate) fn envelope(viewport: Option<(f64, f64)>) -> ViewportEnvelope {
    viewport
        .map(|(width, height)| ViewportEnvelope::from_window(width, height))
        .unwrap_or_default()
}

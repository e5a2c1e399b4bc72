//! Initialize a new event bundle.

use std::path::PathBuf;

use tagmap_project_model::LoadedBundle;

pub fn run(path: PathBuf, name: String, id: Option<String>) -> anyhow::Result<()> {
    let id = id.unwrap_or_else(|| slug(&name));
    println!("Creating bundle '{}' at {}", name, path.display());

    let loaded = LoadedBundle::create(&path, &id, &name)
        .map_err(|e| anyhow::anyhow!("Failed to create bundle: {e}"))?;

    println!("Bundle created successfully:");
    println!("  File: {}", loaded.path.display());
    println!("  Project ID: {}", loaded.bundle.project.id);
    println!();
    println!("Add frames to the \"frames\" array, then run `tagmap capture`.");

    Ok(())
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "project".to_string()
    } else {
        trimmed.to_string()
    }
}

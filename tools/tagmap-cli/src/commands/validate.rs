//! Validate an event bundle.

use std::path::PathBuf;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating bundle at: {}", path.display());

    let loaded = super::load_bundle(&path)?;
    let bundle = &loaded.bundle;

    println!("  Name: {}", bundle.project.name);
    println!("  Version: {}", bundle.version);
    println!("  Frames: {}", bundle.frames.len());
    println!("  Events: {}", bundle.events.len());

    let issues = bundle.validate();
    if issues.is_empty() {
        println!("\nBundle is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Export may be incomplete.",
            issues.len()
        );
    }

    Ok(())
}

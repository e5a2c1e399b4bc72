//! Show bundle information.

use std::path::PathBuf;

use tagmap_project_model::event::events_for_frame;
use tagmap_project_model::EventStatus;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let loaded = super::load_bundle(&path)?;
    let bundle = &loaded.bundle;
    let p = &bundle.project;

    println!("Project: {}", p.name);
    println!("  ID: {}", p.id);
    if let Some(ref id) = p.measurement_id {
        println!("  Measurement ID: {id}");
    }
    if let Some(ref key) = p.file_association {
        println!("  Design file: {key}");
    }
    if let Some(ref modified) = p.modified_at {
        println!("  Modified: {modified}");
    }
    println!();

    println!("Frames ({}):", bundle.frames.len());
    for frame in &bundle.frames {
        let size = frame.display_size();
        println!(
            "  {} {} ({}x{}, {} event(s))",
            frame.id,
            frame.name,
            size.width,
            size.height,
            events_for_frame(&bundle.events, &frame.id).count()
        );
    }
    println!();

    let implemented = bundle
        .events
        .iter()
        .filter(|e| e.status() == Some(EventStatus::Implemented))
        .count();
    let pending = bundle
        .events
        .iter()
        .filter(|e| e.status() == Some(EventStatus::Pending))
        .count();
    println!("Events: {}", bundle.events.len());
    println!("  Implemented: {implemented}");
    println!("  Pending: {pending}");
    println!("  Unknown: {}", bundle.events.len() - implemented - pending);

    Ok(())
}

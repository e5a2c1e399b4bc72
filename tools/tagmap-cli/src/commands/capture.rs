//! Capture a region on a frame and store it as a new event.

use std::path::PathBuf;

use tagmap_capture_engine::{CaptureConfig, CaptureOutcome, CaptureSession};
use tagmap_common::config::AppConfig;
use tagmap_project_model::region::PixelPoint;
use tagmap_project_model::source::EventStore;
use tagmap_project_model::NewEvent;

pub struct CaptureArgs {
    pub path: PathBuf,
    pub frame: String,
    pub from: PixelPoint,
    pub to: PixelPoint,
    pub viewport: Option<(f64, f64)>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub action: Option<String>,
    pub label: Option<String>,
    pub location: Option<String>,
}

pub async fn run(config: &AppConfig, args: CaptureArgs) -> anyhow::Result<()> {
    let mut loaded = super::load_bundle(&args.path)?;
    let frame = loaded
        .bundle
        .frame(&args.frame)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Frame not found: {}", args.frame))?;

    let mut session = CaptureSession::for_viewport(
        &frame,
        super::envelope(args.viewport),
        CaptureConfig::from(&config.capture),
    )?;
    let fit = *session.fit();
    println!(
        "Frame {} shown at {:.0}x{:.0} ({:.0}%)",
        frame.name,
        fit.display_width,
        fit.display_height,
        fit.display_scale() * 100.0
    );

    if !session.pointer_down(args.from) {
        anyhow::bail!(
            "Start point {},{} is outside the displayed frame",
            args.from.x,
            args.from.y
        );
    }
    session.pointer_move(args.to);

    let captured = match session.pointer_up(args.to) {
        CaptureOutcome::Committed(captured) => captured,
        CaptureOutcome::Cancelled | CaptureOutcome::Ignored => {
            println!(
                "Region smaller than {} px, nothing captured.",
                config.capture.min_size_px
            );
            return Ok(());
        }
    };

    let region = captured.region.clone();
    let event = NewEvent {
        name: args.name.unwrap_or(captured.suggested_name),
        category: args.category,
        action: args.action,
        label: args.label,
        location: args.location,
        ..NewEvent::new(frame.id.clone(), String::new())
    }
    .with_region(captured.region);

    let created = loaded
        .create_event(event)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create event: {e}"))?;
    loaded
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save bundle: {e}"))?;

    println!("Created event {} ({})", created.id, created.name);
    println!(
        "  Region: x={:.2}% y={:.2}% w={:.2}% h={:.2}%",
        region.x_pct * 100.0,
        region.y_pct * 100.0,
        region.w_pct * 100.0,
        region.h_pct * 100.0
    );
    if region.overflows_frame() {
        println!("  Note: region extends past the frame edge");
    }

    Ok(())
}

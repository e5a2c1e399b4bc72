//! Tagmap CLI: capture hotspots, inspect event bundles, and export documents.
//!
//! Usage:
//!   tagmap init <BUNDLE> --name <NAME>        Create an empty bundle
//!   tagmap info <BUNDLE>                      Show bundle contents
//!   tagmap validate <BUNDLE>                  Check frames and events
//!   tagmap capture <BUNDLE> --frame <ID> ...  Drag a region and create an event
//!   tagmap overlay <BUNDLE> --frame <ID>      Print the overlay scene as JSON
//!   tagmap export <BUNDLE> [-o OUT]           Generate the PDF document

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tagmap_common::config::AppConfig;
use tagmap_project_model::region::PixelPoint;

mod commands;

#[derive(Parser)]
#[command(
    name = "tagmap",
    about = "Place analytics hotspots on design frames and export tagging documents",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new, empty event bundle
    Init {
        /// Path of the bundle file to create
        path: PathBuf,

        /// Project name
        #[arg(short, long)]
        name: String,

        /// Backend project ID (defaults to a slug of the name)
        #[arg(long)]
        id: Option<String>,
    },

    /// Show bundle information
    Info {
        /// Path to the bundle file
        path: PathBuf,
    },

    /// Validate a bundle
    Validate {
        /// Path to the bundle file
        path: PathBuf,
    },

    /// Drag a region over a displayed frame and store it as a new event
    Capture {
        /// Path to the bundle file
        path: PathBuf,

        /// Frame to capture on
        #[arg(long)]
        frame: String,

        /// Pointer-down position in display pixels, as x,y
        #[arg(long, value_parser = parse_point)]
        from: PixelPoint,

        /// Pointer-up position in display pixels, as x,y
        #[arg(long, value_parser = parse_point)]
        to: PixelPoint,

        /// Window size the frame is displayed in, as WxH
        #[arg(long, value_parser = parse_size)]
        viewport: Option<(f64, f64)>,

        /// Event name (defaults to "<frame name>_region")
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        action: Option<String>,

        #[arg(long)]
        label: Option<String>,

        /// Where on the page the interaction happens
        #[arg(long)]
        location: Option<String>,
    },

    /// Print the overlay scene for a frame as JSON
    Overlay {
        /// Path to the bundle file
        path: PathBuf,

        /// Frame to render
        #[arg(long)]
        frame: String,

        /// Window size the frame is displayed in, as WxH
        #[arg(long, value_parser = parse_size)]
        viewport: Option<(f64, f64)>,
    },

    /// Export the bundle to a PDF document
    Export {
        /// Path to the bundle file
        path: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Name printed in the page header
        #[arg(long)]
        project_name: Option<String>,

        /// GA4 measurement ID for the cover snippet
        #[arg(long)]
        measurement_id: Option<String>,

        /// Backend project ID, enables the direct frame export fallback
        #[arg(long)]
        project_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    tagmap_common::logging::init_logging(&logging);
    tracing::debug!(api = %config.api.base_url, "Configuration loaded");

    match cli.command {
        Commands::Init { path, name, id } => commands::init::run(path, name, id),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Capture {
            path,
            frame,
            from,
            to,
            viewport,
            name,
            category,
            action,
            label,
            location,
        } => {
            commands::capture::run(
                &config,
                commands::capture::CaptureArgs {
                    path,
                    frame,
                    from,
                    to,
                    viewport,
                    name,
                    category,
                    action,
                    label,
                    location,
                },
            )
            .await
        }
        Commands::Overlay {
            path,
            frame,
            viewport,
        } => commands::overlay::run(path, frame, viewport),
        Commands::Export {
            path,
            output,
            project_name,
            measurement_id,
            project_id,
        } => {
            commands::export::run(
                &config,
                path,
                output,
                project_name,
                measurement_id,
                project_id,
            )
            .await
        }
    }
}

fn parse_point(value: &str) -> Result<PixelPoint, String> {
    let (x, y) = split_pair(value, ',')?;
    Ok(PixelPoint::new(x, y))
}

fn parse_size(value: &str) -> Result<(f64, f64), String> {
    let (w, h) = split_pair(&value.to_ascii_lowercase(), 'x')?;
    if w <= 0.0 || h <= 0.0 {
        return Err(format!("size must be positive, got {value}"));
    }
    Ok((w, h))
}

fn split_pair(value: &str, separator: char) -> Result<(f64, f64), String> {
    let (a, b) = value
        .split_once(separator)
        .ok_or_else(|| format!("expected two numbers separated by '{separator}', got {value}"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{s}': {e}"))
    };
    Ok((parse(a)?, parse(b)?))
}

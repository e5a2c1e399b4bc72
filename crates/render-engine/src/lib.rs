//! Tagmap Render Engine
//!
//! Turns frames, hotspot regions, and event metadata into a paginated,
//! print-ready PDF.
//!
//! # Pipeline Architecture
//!
//! ```text
//! frames ──┐
//!          ├── ResourceLoader (frame previews, header logo)
//! events ──┘         │
//!                    ├── Paginator (block placement, page breaks)
//!                    │         │
//!                    │         ├── Compositor (cover, sections, overlays)
//!                    │         │         │
//!                    │         │         ├── Header/footer pass
//!                    ▼         ▼         ▼
//!                         DrawingBackend (lopdf)
//!                                │
//!                                ▼
//!                            output.pdf
//! ```

pub mod backend;
pub mod compositor;
pub mod export;
pub mod paginator;
pub mod pdf;
pub mod snippet;

pub use backend::{DrawingBackend, RecordingBackend};
pub use compositor::{CompositionReport, CompositorSettings, DocumentCompositor};
pub use export::*;
pub use paginator::{PageGeometry, Paginator, Placement};
pub use pdf::PdfBackend;

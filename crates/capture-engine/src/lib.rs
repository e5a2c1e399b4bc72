//! Tagmap Capture Engine
//!
//! Turns pointer drags over a displayed frame into normalized hotspot
//! regions, and projects stored regions back onto the display as an
//! overlay scene.
//!
//! # Architecture
//!
//! ```text
//! pointer events ──▶ CaptureSession ──▶ NormalizedRegion ──▶ event store
//!                         │
//!                         └── live rect ──┐
//!                                         ▼
//! stored events ──▶ TaggedRegion ──▶ OverlayRenderer ──▶ OverlayScene
//! ```

pub mod overlay;
pub mod session;

pub use overlay::*;
pub use session::*;

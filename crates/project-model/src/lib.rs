//! Tagmap Project Model
//!
//! Defines the core data contracts for Tagmap:
//! - **Regions:** hotspot rectangles stored as fractions of the frame size
//! - **Frames:** reference design images with intrinsic dimensions
//! - **Events:** tracked interactions annotated onto frames
//! - **Bundles:** a local file standing in for the remote collaborators
//!
//! Regions are normalized to `[0.0, 1.0]` relative to the frame's intrinsic
//! size so they re-project identically at any display or page scale.

pub mod bundle;
pub mod display;
pub mod event;
pub mod frame;
pub mod region;
pub mod source;

pub use bundle::*;
pub use display::*;
pub use event::*;
pub use frame::*;
pub use region::*;
pub use source::*;

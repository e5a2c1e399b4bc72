//! Tagmap Common Utilities
//!
//! Shared infrastructure for all Tagmap crates:
//! - Error types and result aliases
//! - Injectable clocks for credential expiry
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;

//! Tagmap Resource Loader
//!
//! Fetches frame images for documents. Each URL goes through an ordered
//! chain of strategies and the first one that produces an embeddable image
//! wins:
//!
//! 1. authenticated fetch for the system's own backend (bearer token from a
//!    process-wide [`TokenCache`], one retry after a 401)
//! 2. plain fetch decoded and re-encoded as PNG
//! 3. direct fetch, rasterizing SVG payloads
//!
//! When every strategy fails the caller gets `None` and renders a
//! placeholder.

pub mod endpoints;
pub mod loader;
pub mod raster;
pub mod strategy;
pub mod token;

pub use endpoints::frame_image_candidates;
pub use loader::{FetchError, Fetched, HttpContext, ImageSource, ResourceLoader};
pub use raster::{EmbeddableImage, ImageFormat, RasterError};
pub use strategy::{AuthenticatedFetch, CrossOriginDecode, DirectFetch, ImageStrategy};
pub use token::{RefreshTokenProvider, TokenCache, TokenProvider};

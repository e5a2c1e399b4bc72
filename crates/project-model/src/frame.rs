//! Design frames: the reference images hotspots are drawn on.

use serde::{Deserialize, Serialize};

use crate::region::FrameSize;

/// Frames reporting a side at or below this are treated as unsized.
const MIN_REPORTED_SIDE: f64 = 100.0;

/// Canvas assumed for unsized frames (a typical phone screen).
pub const FALLBACK_FRAME_SIZE: FrameSize = FrameSize {
    width: 375.0,
    height: 812.0,
};

/// A reference design image with known intrinsic dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Stable identifier from the design source.
    pub id: String,

    /// Human-readable frame name.
    pub name: String,

    /// Where the rendered frame image can be fetched.
    #[serde(default)]
    pub image_url: Option<String>,

    /// Intrinsic width in pixels.
    #[serde(default)]
    pub intrinsic_width: f64,

    /// Intrinsic height in pixels.
    #[serde(default)]
    pub intrinsic_height: f64,
}

impl Frame {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        intrinsic_width: f64,
        intrinsic_height: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image_url: None,
            intrinsic_width,
            intrinsic_height,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Intrinsic size exactly as reported.
    pub fn intrinsic_size(&self) -> FrameSize {
        FrameSize::new(self.intrinsic_width, self.intrinsic_height)
    }

    /// Size used for interactive display and capture.
    ///
    /// Each side that is missing or not above 100 px falls back to the
    /// 375x812 phone canvas.
    pub fn display_size(&self) -> FrameSize {
        let width = if self.intrinsic_width > MIN_REPORTED_SIDE {
            self.intrinsic_width
        } else {
            FALLBACK_FRAME_SIZE.width
        };
        let height = if self.intrinsic_height > MIN_REPORTED_SIDE {
            self.intrinsic_height
        } else {
            FALLBACK_FRAME_SIZE.height
        };
        FrameSize::new(width, height)
    }

    /// Default event name offered after a region is drawn on this frame.
    pub fn suggested_region_name(&self) -> String {
        format!("{}_region", self.name)
    }
}

//! Fitting a frame into an on-screen viewport.
//!
//! The displayed size preserves the frame's aspect ratio and never exceeds
//! its intrinsic size, so small frames are shown at 100% rather than
//! upscaled.

use serde::{Deserialize, Serialize};

use crate::region::{FrameSize, PixelPoint};

/// The largest area a frame preview may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportEnvelope {
    pub max_width: f64,
    pub max_height: f64,
}

impl ViewportEnvelope {
    /// Widest a preview is ever shown, regardless of window size.
    pub const MAX_PREVIEW_WIDTH: f64 = 1200.0;

    pub fn new(max_width: f64, max_height: f64) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// Envelope for a window of the given size: 92% of its width (capped at
    /// 1200 px) by 65% of its height.
    pub fn from_window(width: f64, height: f64) -> Self {
        Self {
            max_width: (width * 0.92).min(Self::MAX_PREVIEW_WIDTH),
            max_height: height * 0.65,
        }
    }
}

impl Default for ViewportEnvelope {
    fn default() -> Self {
        Self::from_window(1200.0, 800.0)
    }
}

/// A frame's displayed dimensions for one viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayFit {
    /// Intrinsic frame size the fit was computed from.
    pub intrinsic: FrameSize,
    /// Displayed width in whole pixels.
    pub display_width: f64,
    /// Displayed height in whole pixels.
    pub display_height: f64,
}

impl DisplayFit {
    /// Fit `intrinsic` into `envelope`.
    pub fn compute(intrinsic: FrameSize, envelope: ViewportEnvelope) -> Self {
        let w_scale = envelope.max_width / intrinsic.width;
        let h_scale = envelope.max_height / intrinsic.height;
        let scale = w_scale.min(h_scale).min(1.0);
        Self {
            intrinsic,
            display_width: (intrinsic.width * scale).round().max(1.0),
            display_height: (intrinsic.height * scale).round().max(1.0),
        }
    }

    /// A fit that shows the frame at exactly `scale`.
    pub fn at_scale(intrinsic: FrameSize, scale: f64) -> Self {
        Self {
            intrinsic,
            display_width: intrinsic.width * scale,
            display_height: intrinsic.height * scale,
        }
    }

    /// Ratio of displayed width to intrinsic width.
    pub fn display_scale(&self) -> f64 {
        self.display_width / self.intrinsic.width
    }

    /// Whether a display-space point lies on the displayed frame.
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x <= self.display_width
            && point.y <= self.display_height
    }

    /// Convert a display-space point into frame-local pixels.
    pub fn to_frame(&self, point: PixelPoint) -> PixelPoint {
        point.unscaled(self.display_scale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_frame_is_never_upscaled() {
        let fit = DisplayFit::compute(
            FrameSize::new(375.0, 400.0),
            ViewportEnvelope::new(1200.0, 800.0),
        );
        assert_eq!(fit.display_width, 375.0);
        assert_eq!(fit.display_height, 400.0);
        assert!((fit.display_scale() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tall_frame_fits_height() {
        let fit = DisplayFit::compute(
            FrameSize::new(375.0, 3000.0),
            ViewportEnvelope::new(1000.0, 600.0),
        );
        assert_eq!(fit.display_height, 600.0);
        assert_eq!(fit.display_width, 75.0);
        assert!((fit.display_scale() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_window_envelope_caps_width() {
        let env = ViewportEnvelope::from_window(2560.0, 1440.0);
        assert_eq!(env.max_width, 1200.0);
        assert!((env.max_height - 936.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_to_frame_mapping() {
        let fit = DisplayFit::at_scale(FrameSize::new(1000.0, 2000.0), 0.5);
        let p = fit.to_frame(PixelPoint::new(50.0, 100.0));
        assert_eq!(p, PixelPoint::new(100.0, 200.0));
        assert!(fit.contains(PixelPoint::new(500.0, 1000.0)));
        assert!(!fit.contains(PixelPoint::new(500.1, 10.0)));
    }

    #[test]
    fn test_minimum_one_pixel() {
        let fit = DisplayFit::compute(
            FrameSize::new(10_000.0, 10.0),
            ViewportEnvelope::new(100.0, 100.0),
        );
        assert_eq!(fit.display_height, 1.0);
    }
}

//! Resolution-independent hotspot regions.
//!
//! A [`NormalizedRegion`] stores a rectangle as fractions of its frame's
//! intrinsic width and height, so the same record re-projects onto a live
//! preview, a zoomed canvas, or a document page without drift. Every renderer
//! goes through [`to_pixels`]; every capture goes through [`to_percent`].

use serde::{Deserialize, Serialize};

/// Errors raised at the region model boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Invalid intrinsic frame size {width}x{height}")]
    InvalidFrameSize { width: f64, height: f64 },

    #[error("Region has zero area ({w}x{h})")]
    ZeroArea { w: f64, h: f64 },

    #[error("Region component {name} is not a finite number")]
    NonFinite { name: &'static str },
}

/// Intrinsic pixel dimensions of a frame image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

impl FrameSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions strictly positive and finite.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    fn ensure_valid(&self) -> Result<(), GeometryError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(GeometryError::InvalidFrameSize {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// A point in some pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Divide both coordinates by `scale`.
    pub fn unscaled(&self, scale: f64) -> Self {
        Self {
            x: self.x / scale,
            y: self.y / scale,
        }
    }
}

/// An axis-aligned rectangle in some pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The rectangle spanned by two opposite corners, in any order.
    pub fn from_corners(a: PixelPoint, b: PixelPoint) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            w: (a.x - b.x).abs(),
            h: (a.y - b.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Multiply every component by `k`.
    pub fn scaled(&self, k: f64) -> Self {
        Self {
            x: self.x * k,
            y: self.y * k,
            w: self.w * k,
            h: self.h * k,
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Clamp the low (left/top) edges into `[0, size]`, keeping the far edges.
    ///
    /// A drag that started slightly outside the frame keeps its extent on the
    /// frame instead of being rejected.
    pub fn clamp_origin(&self, size: FrameSize) -> Self {
        let left = self.x.clamp(0.0, size.width);
        let top = self.y.clamp(0.0, size.height);
        Self {
            x: left,
            y: top,
            w: (self.right() - left).max(0.0),
            h: (self.bottom() - top).max(0.0),
        }
    }

    /// Clip the far (right/bottom) edges to the frame.
    pub fn clip_to(&self, size: FrameSize) -> Self {
        let right = self.right().min(size.width);
        let bottom = self.bottom().min(size.height);
        Self {
            w: (right - self.x).max(0.0),
            h: (bottom - self.y).max(0.0),
            ..*self
        }
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &PixelRect, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.w - other.w).abs() <= tolerance
            && (self.h - other.h).abs() <= tolerance
    }
}

/// A rectangle stored as fractions of its frame's intrinsic size.
///
/// `x_pct + w_pct <= 1` is not enforced (selections past the far edge are
/// tolerated), but a persisted region always has `w_pct > 0 && h_pct > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRegion {
    pub frame_id: String,
    pub x_pct: f64,
    pub y_pct: f64,
    pub w_pct: f64,
    pub h_pct: f64,
}

impl NormalizedRegion {
    /// Build a region, rejecting non-finite or zero-area input.
    pub fn new(
        frame_id: impl Into<String>,
        x_pct: f64,
        y_pct: f64,
        w_pct: f64,
        h_pct: f64,
    ) -> Result<Self, GeometryError> {
        let region = Self {
            frame_id: frame_id.into(),
            x_pct,
            y_pct,
            w_pct,
            h_pct,
        };
        region.validate()?;
        Ok(region)
    }

    /// Check the persistence invariant.
    pub fn validate(&self) -> Result<(), GeometryError> {
        for (name, value) in [
            ("xPct", self.x_pct),
            ("yPct", self.y_pct),
            ("wPct", self.w_pct),
            ("hPct", self.h_pct),
        ] {
            if !value.is_finite() {
                return Err(GeometryError::NonFinite { name });
            }
        }
        if self.w_pct <= 0.0 || self.h_pct <= 0.0 {
            return Err(GeometryError::ZeroArea {
                w: self.w_pct,
                h: self.h_pct,
            });
        }
        Ok(())
    }

    /// Whether the region runs past the frame's far edges.
    pub fn overflows_frame(&self) -> bool {
        self.x_pct + self.w_pct > 1.0 || self.y_pct + self.h_pct > 1.0
    }
}

/// Normalize a frame-local pixel rectangle.
///
/// Negative origins are clamped onto the frame first.
pub fn to_percent(
    rect: PixelRect,
    size: FrameSize,
    frame_id: impl Into<String>,
) -> Result<NormalizedRegion, GeometryError> {
    size.ensure_valid()?;
    let rect = rect.clamp_origin(size);
    NormalizedRegion::new(
        frame_id,
        rect.x / size.width,
        rect.y / size.height,
        rect.w / size.width,
        rect.h / size.height,
    )
}

/// Project a region into a pixel space displayed at `display_scale`.
pub fn to_pixels(region: &NormalizedRegion, size: FrameSize, display_scale: f64) -> PixelRect {
    PixelRect {
        x: region.x_pct * size.width * display_scale,
        y: region.y_pct * size.height * display_scale,
        w: region.w_pct * size.width * display_scale,
        h: region.h_pct * size.height * display_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_projection_scenario() {
        let size = FrameSize::new(1000.0, 2000.0);
        let region = NormalizedRegion::new("f1", 0.1, 0.2, 0.3, 0.1).unwrap();
        let rect = to_pixels(&region, size, 0.5);
        assert!(rect.approx_eq(&PixelRect::new(50.0, 200.0, 150.0, 100.0), 1e-9));
    }

    #[test]
    fn test_to_percent_rejects_invalid_frame_size() {
        let rect = PixelRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(matches!(
            to_percent(rect, FrameSize::new(0.0, 100.0), "f"),
            Err(GeometryError::InvalidFrameSize { .. })
        ));
        assert!(to_percent(rect, FrameSize::new(100.0, -1.0), "f").is_err());
    }

    #[test]
    fn test_to_percent_rejects_zero_area() {
        let rect = PixelRect::new(10.0, 10.0, 0.0, 25.0);
        assert!(matches!(
            to_percent(rect, FrameSize::new(100.0, 100.0), "f"),
            Err(GeometryError::ZeroArea { .. })
        ));
    }

    #[test]
    fn test_negative_origin_is_clamped_not_rejected() {
        let size = FrameSize::new(200.0, 100.0);
        let rect = PixelRect::new(-20.0, -5.0, 60.0, 30.0);
        let region = to_percent(rect, size, "f").unwrap();
        assert_eq!(region.x_pct, 0.0);
        assert_eq!(region.y_pct, 0.0);
        // far edges are kept: right = 40, bottom = 25
        assert!((region.w_pct - 0.2).abs() < 1e-12);
        assert!((region.h_pct - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_high_side_overflow_is_permitted() {
        let size = FrameSize::new(100.0, 100.0);
        let region = to_percent(PixelRect::new(80.0, 80.0, 40.0, 40.0), size, "f").unwrap();
        assert!(region.overflows_frame());

        let clipped = PixelRect::new(80.0, 80.0, 40.0, 40.0).clip_to(size);
        assert_eq!(clipped, PixelRect::new(80.0, 80.0, 20.0, 20.0));
    }

    #[test]
    fn test_from_corners_is_order_independent() {
        let a = PixelPoint::new(30.0, 5.0);
        let b = PixelPoint::new(10.0, 45.0);
        assert_eq!(PixelRect::from_corners(a, b), PixelRect::from_corners(b, a));
        assert_eq!(
            PixelRect::from_corners(a, b),
            PixelRect::new(10.0, 5.0, 20.0, 40.0)
        );
    }

    #[test]
    fn test_region_serializes_camel_case() {
        let region = NormalizedRegion::new("frame-9", 0.1, 0.2, 0.3, 0.4).unwrap();
        let json = serde_json::to_value(&region).unwrap();
        assert_eq!(json["frameId"], "frame-9");
        assert_eq!(json["wPct"], 0.3);
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(
            NormalizedRegion::new("f", f64::NAN, 0.0, 0.1, 0.1),
            Err(GeometryError::NonFinite { name: "xPct" })
        ));
    }

    fn frame_size() -> impl Strategy<Value = FrameSize> {
        (1.0f64..8000.0, 1.0f64..8000.0).prop_map(|(w, h)| FrameSize::new(w, h))
    }

    proptest! {
        #[test]
        fn prop_round_trip_at_unit_scale(
            size in frame_size(),
            fx in 0.0f64..1.0,
            fy in 0.0f64..1.0,
            fw in 0.001f64..1.0,
            fh in 0.001f64..1.0,
        ) {
            let rect = PixelRect::new(fx * size.width, fy * size.height, fw * size.width, fh * size.height);
            let region = to_percent(rect, size, "f").unwrap();
            let back = to_pixels(&region, size, 1.0);
            prop_assert!(back.approx_eq(&rect, 1e-6 * size.width.max(size.height)));
        }

        #[test]
        fn prop_scale_invariance(
            size in frame_size(),
            x in 0.0f64..1.0,
            y in 0.0f64..1.0,
            w in 0.001f64..1.0,
            h in 0.001f64..1.0,
            k1 in 0.05f64..8.0,
            k2 in 0.05f64..8.0,
        ) {
            let region = NormalizedRegion::new("f", x, y, w, h).unwrap();
            let at_k1 = to_pixels(&region, size, k1).scaled(k2 / k1);
            let at_k2 = to_pixels(&region, size, k2);
            let tolerance = 1e-9 * size.width.max(size.height) * k2.max(1.0) * 10.0;
            prop_assert!(at_k1.approx_eq(&at_k2, tolerance));
        }
    }
}

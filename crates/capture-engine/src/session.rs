//! Pointer-driven region capture over a displayed frame.
//!
//! ```text
//! Idle ──pointer_down (inside)──▶ Dragging ──pointer_move──▶ Dragging
//!                                    │
//!                                    └──pointer_up──▶ Committed | Cancelled ──▶ Idle
//! ```
//!
//! Points arrive in display pixels and are stored in frame-local pixels, so
//! the committed region is independent of the zoom the user dragged at.

use tagmap_common::config::CaptureDefaults;
use tagmap_common::error::{TagmapError, TagmapResult};
use tagmap_project_model::display::{DisplayFit, ViewportEnvelope};
use tagmap_project_model::frame::Frame;
use tagmap_project_model::region::{to_percent, NormalizedRegion, PixelPoint, PixelRect};

/// Capture tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureConfig {
    /// Minimum width and height of a drag, in display pixels.
    pub min_size_px: f64,

    /// Clip drags that run past the right/bottom frame edge. When off, the
    /// overflow is stored as drawn.
    pub clamp_high_edge: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_size_px: 10.0,
            clamp_high_edge: false,
        }
    }
}

impl From<&CaptureDefaults> for CaptureConfig {
    fn from(defaults: &CaptureDefaults) -> Self {
        Self {
            min_size_px: defaults.min_size_px,
            clamp_high_edge: defaults.clamp_high_edge,
        }
    }
}

/// Observable state of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Waiting for a pointer-down on the frame.
    Idle,
    /// A drag is in flight.
    Dragging,
}

/// A region produced by a completed drag.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRegion {
    /// The normalized region, ready for the event store.
    pub region: NormalizedRegion,
    /// Name offered to the user for the new event.
    pub suggested_name: String,
    /// Frame-local rectangle the region was computed from.
    pub frame_rect: PixelRect,
}

/// Result of a pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// The drag produced a region.
    Committed(CapturedRegion),
    /// The drag was too small (or collapsed after clamping) and was dropped.
    Cancelled,
    /// No drag was in flight.
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    anchor: PixelPoint,
    current: PixelPoint,
}

impl Drag {
    fn rect(&self) -> PixelRect {
        PixelRect::from_corners(self.anchor, self.current)
    }
}

/// A capture session bound to one displayed frame.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    frame_id: String,
    frame_name: String,
    fit: DisplayFit,
    config: CaptureConfig,
    drag: Option<Drag>,
}

impl CaptureSession {
    /// Start capturing on `frame` shown with `fit`.
    pub fn begin(frame: &Frame, fit: DisplayFit, config: CaptureConfig) -> TagmapResult<Self> {
        if !fit.intrinsic.is_valid() || fit.display_width <= 0.0 || fit.display_height <= 0.0 {
            return Err(TagmapError::capture(format!(
                "Frame {} cannot be captured at {}x{}",
                frame.id, fit.display_width, fit.display_height
            )));
        }

        tracing::debug!(
            frame_id = %frame.id,
            display_width = fit.display_width,
            display_height = fit.display_height,
            scale = fit.display_scale(),
            "Capture session ready"
        );

        Ok(Self {
            frame_id: frame.id.clone(),
            frame_name: frame.name.clone(),
            fit,
            config,
            drag: None,
        })
    }

    /// Start capturing on `frame` fitted into `envelope`.
    pub fn for_viewport(
        frame: &Frame,
        envelope: ViewportEnvelope,
        config: CaptureConfig,
    ) -> TagmapResult<Self> {
        let fit = DisplayFit::compute(frame.display_size(), envelope);
        Self::begin(frame, fit, config)
    }

    pub fn state(&self) -> CaptureState {
        if self.drag.is_some() {
            CaptureState::Dragging
        } else {
            CaptureState::Idle
        }
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn fit(&self) -> &DisplayFit {
        &self.fit
    }

    /// Press at a display-space point. Returns whether a drag started.
    pub fn pointer_down(&mut self, point: PixelPoint) -> bool {
        if self.drag.is_some() || !self.fit.contains(point) {
            return false;
        }
        let anchor = self.fit.to_frame(point);
        self.drag = Some(Drag {
            anchor,
            current: anchor,
        });
        true
    }

    /// Move to a display-space point. Returns the live frame-local rectangle.
    pub fn pointer_move(&mut self, point: PixelPoint) -> Option<PixelRect> {
        let current = self.fit.to_frame(point);
        let drag = self.drag.as_mut()?;
        drag.current = current;
        Some(drag.rect())
    }

    /// The live frame-local rectangle, if dragging.
    pub fn live_rect(&self) -> Option<PixelRect> {
        self.drag.map(|drag| drag.rect())
    }

    /// The live rectangle in display pixels, for overlay feedback.
    pub fn live_display_rect(&self) -> Option<PixelRect> {
        self.live_rect()
            .map(|rect| rect.scaled(self.fit.display_scale()))
    }

    /// Abort an in-flight drag.
    pub fn cancel(&mut self) {
        self.drag = None;
    }

    /// Release at a display-space point, finishing the drag.
    pub fn pointer_up(&mut self, point: PixelPoint) -> CaptureOutcome {
        let Some(mut drag) = self.drag.take() else {
            return CaptureOutcome::Ignored;
        };
        drag.current = self.fit.to_frame(point);

        let rect = drag.rect();
        let scale = self.fit.display_scale();
        if rect.w * scale < self.config.min_size_px || rect.h * scale < self.config.min_size_px {
            tracing::debug!(
                frame_id = %self.frame_id,
                width = rect.w * scale,
                height = rect.h * scale,
                "Drag below minimum size, discarded"
            );
            return CaptureOutcome::Cancelled;
        }

        let size = self.fit.intrinsic;
        let rect = if self.config.clamp_high_edge {
            rect.clip_to(size)
        } else {
            rect
        };

        match to_percent(rect, size, self.frame_id.clone()) {
            Ok(region) => {
                tracing::debug!(
                    frame_id = %self.frame_id,
                    x = region.x_pct,
                    y = region.y_pct,
                    w = region.w_pct,
                    h = region.h_pct,
                    "Region captured"
                );
                CaptureOutcome::Committed(CapturedRegion {
                    region,
                    suggested_name: format!("{}_region", self.frame_name),
                    frame_rect: rect,
                })
            }
            Err(e) => {
                tracing::debug!(frame_id = %self.frame_id, error = %e, "Drag collapsed after clamping");
                CaptureOutcome::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagmap_project_model::region::{to_pixels, FrameSize};

    fn frame() -> Frame {
        Frame::new("1:2", "Checkout", 1000.0, 2000.0)
    }

    fn session_at(scale: f64) -> CaptureSession {
        let fit = DisplayFit::at_scale(FrameSize::new(1000.0, 2000.0), scale);
        CaptureSession::begin(&frame(), fit, CaptureConfig::default()).unwrap()
    }

    fn committed(outcome: CaptureOutcome) -> CapturedRegion {
        match outcome {
            CaptureOutcome::Committed(captured) => captured,
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn test_small_drag_is_cancelled() {
        let mut session = session_at(1.0);
        assert!(session.pointer_down(PixelPoint::new(100.0, 100.0)));
        assert_eq!(session.state(), CaptureState::Dragging);
        session.pointer_move(PixelPoint::new(105.0, 103.0));
        let outcome = session.pointer_up(PixelPoint::new(105.0, 103.0));
        assert_eq!(outcome, CaptureOutcome::Cancelled);
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[test]
    fn test_threshold_is_measured_in_display_pixels() {
        // 30 frame px at scale 0.25 is only 7.5 display px.
        let mut session = session_at(0.25);
        session.pointer_down(PixelPoint::new(10.0, 10.0));
        let outcome = session.pointer_up(PixelPoint::new(17.5, 40.0));
        assert_eq!(outcome, CaptureOutcome::Cancelled);

        session.pointer_down(PixelPoint::new(10.0, 10.0));
        let captured = committed(session.pointer_up(PixelPoint::new(20.0, 40.0)));
        assert!((captured.frame_rect.w - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_commit_normalizes_against_intrinsic_size() {
        let mut session = session_at(0.5);
        session.pointer_down(PixelPoint::new(50.0, 200.0));
        let live = session.pointer_move(PixelPoint::new(120.0, 230.0)).unwrap();
        assert!((live.w - 140.0).abs() < 1e-9);
        let on_screen = session.live_display_rect().unwrap();
        assert!(on_screen.approx_eq(&PixelRect::new(50.0, 200.0, 70.0, 30.0), 1e-9));

        let captured = committed(session.pointer_up(PixelPoint::new(200.0, 250.0)));
        let region = &captured.region;
        assert!((region.x_pct - 0.1).abs() < 1e-12);
        assert!((region.y_pct - 0.2).abs() < 1e-12);
        assert!((region.w_pct - 0.3).abs() < 1e-12);
        assert!((region.h_pct - 0.05).abs() < 1e-12);
        assert_eq!(region.frame_id, "1:2");
        assert_eq!(captured.suggested_name, "Checkout_region");
        assert_eq!(session.state(), CaptureState::Idle);

        // Same region drawn at another zoom lands on the same display pixels.
        let shown = to_pixels(region, FrameSize::new(1000.0, 2000.0), 0.5);
        assert!(shown.approx_eq(&PixelRect::new(50.0, 200.0, 150.0, 50.0), 1e-9));
    }

    #[test]
    fn test_reverse_drag_uses_min_max() {
        let mut session = session_at(1.0);
        session.pointer_down(PixelPoint::new(300.0, 300.0));
        let captured = committed(session.pointer_up(PixelPoint::new(100.0, 200.0)));
        assert_eq!(captured.frame_rect, PixelRect::new(100.0, 200.0, 200.0, 100.0));
    }

    #[test]
    fn test_negative_drag_is_clamped_not_rejected() {
        let mut session = session_at(1.0);
        session.pointer_down(PixelPoint::new(40.0, 60.0));
        let captured = committed(session.pointer_up(PixelPoint::new(-30.0, -10.0)));
        assert_eq!(captured.region.x_pct, 0.0);
        assert_eq!(captured.region.y_pct, 0.0);
        assert!((captured.region.w_pct - 0.04).abs() < 1e-12);
        assert!((captured.region.h_pct - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_high_edge_overflow_is_configurable() {
        let fit = DisplayFit::at_scale(FrameSize::new(1000.0, 2000.0), 1.0);
        let mut permissive = CaptureSession::begin(&frame(), fit, CaptureConfig::default()).unwrap();
        permissive.pointer_down(PixelPoint::new(900.0, 100.0));
        let open = committed(permissive.pointer_up(PixelPoint::new(1100.0, 200.0)));
        assert!(open.region.overflows_frame());

        let mut clamped = CaptureSession::begin(
            &frame(),
            fit,
            CaptureConfig {
                clamp_high_edge: true,
                ..CaptureConfig::default()
            },
        )
        .unwrap();
        clamped.pointer_down(PixelPoint::new(900.0, 100.0));
        let clipped = committed(clamped.pointer_up(PixelPoint::new(1100.0, 200.0)));
        assert!(!clipped.region.overflows_frame());
        assert!((clipped.region.w_pct - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_pointer_down_outside_frame_is_ignored() {
        let mut session = session_at(0.5);
        assert!(!session.pointer_down(PixelPoint::new(600.0, 10.0)));
        assert_eq!(session.state(), CaptureState::Idle);
        assert_eq!(
            session.pointer_up(PixelPoint::new(10.0, 10.0)),
            CaptureOutcome::Ignored
        );
        assert!(session.pointer_move(PixelPoint::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_cancel_discards_drag() {
        let mut session = session_at(1.0);
        session.pointer_down(PixelPoint::new(10.0, 10.0));
        session.pointer_move(PixelPoint::new(200.0, 200.0));
        session.cancel();
        assert!(session.live_rect().is_none());
        assert_eq!(
            session.pointer_up(PixelPoint::new(200.0, 200.0)),
            CaptureOutcome::Ignored
        );
    }

    #[test]
    fn test_invalid_fit_is_rejected() {
        let fit = DisplayFit::at_scale(FrameSize::new(0.0, 100.0), 1.0);
        assert!(CaptureSession::begin(&frame(), fit, CaptureConfig::default()).is_err());
    }

    #[test]
    fn test_viewport_session_uses_fallback_size() {
        let unsized_frame = Frame::new("9", "Splash", 0.0, 0.0);
        let session = CaptureSession::for_viewport(
            &unsized_frame,
            ViewportEnvelope::new(1200.0, 800.0),
            CaptureConfig::default(),
        )
        .unwrap();
        assert_eq!(session.fit().intrinsic, FrameSize::new(375.0, 812.0));
        assert_eq!(session.fit().display_height, 800.0);
        assert_eq!(session.fit().display_width, 369.0);
    }
}

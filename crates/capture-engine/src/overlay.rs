//! Live hotspot overlay for a displayed frame.
//!
//! Rendering is a pure function of the display fit and the tagged regions;
//! the renderer only remembers whether the frame image has finished loading.

use serde::Serialize;
use tracing::trace;

use tagmap_project_model::display::DisplayFit;
use tagmap_project_model::event::{AnnotatedEvent, EventStatus};
use tagmap_project_model::region::{to_pixels, NormalizedRegion, PixelRect};

/// Height of a label chip in display pixels.
const CHIP_HEIGHT: f64 = 16.0;
/// Gap kept between a chip and the top edge of its rectangle.
const CHIP_OFFSET: f64 = 20.0;
/// Approximate glyph advance for chip text.
const CHIP_CHAR_WIDTH: f64 = 6.0;
const CHIP_PADDING: f64 = 16.0;

const FILL_ALPHA: f32 = 0.2;

/// How a region is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionState {
    /// The region the user just drew or picked.
    Selected,
    Implemented,
    Pending,
    /// The live rectangle of a drag in flight.
    InProgressDrag,
}

impl RegionState {
    pub fn from_status(status: Option<EventStatus>) -> Self {
        match status {
            Some(EventStatus::Implemented) => Self::Implemented,
            _ => Self::Pending,
        }
    }

    fn border(&self) -> Rgba {
        match self {
            Self::Selected | Self::Implemented => Rgba::GREEN_500,
            Self::Pending => Rgba::ORANGE_400,
            Self::InProgressDrag => Rgba::BLUE_500,
        }
    }

    fn chip_background(&self) -> Option<Rgba> {
        match self {
            Self::Implemented => Some(Rgba::GREEN_600),
            Self::Pending => Some(Rgba::ORANGE_500),
            _ => None,
        }
    }

    fn border_width(&self) -> f64 {
        match self {
            Self::Selected => 3.0,
            _ => 2.0,
        }
    }
}

/// An sRGB colour with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const GREEN_500: Rgba = Rgba::rgb(34, 197, 94);
    pub const GREEN_600: Rgba = Rgba::rgb(22, 163, 74);
    pub const ORANGE_400: Rgba = Rgba::rgb(251, 146, 60);
    pub const ORANGE_500: Rgba = Rgba::rgb(249, 115, 22);
    pub const BLUE_500: Rgba = Rgba::rgb(59, 130, 246);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// A stored region plus how to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRegion {
    pub region: NormalizedRegion,
    pub state: RegionState,
    /// Text for the label chip of persisted regions.
    pub label: Option<String>,
}

impl TaggedRegion {
    pub fn new(region: NormalizedRegion, state: RegionState) -> Self {
        Self {
            region,
            state,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Tag an event's region on `frame_id`. Events without a region there
    /// yield `None`.
    pub fn from_event(event: &AnnotatedEvent, frame_id: &str) -> Option<Self> {
        let region = event.region_on(frame_id)?;
        Some(
            Self::new(region.clone(), RegionState::from_status(event.status()))
                .with_label(event.name.clone()),
        )
    }
}

/// Tagged regions for every event drawn on `frame_id`, followed by the
/// current selection.
pub fn regions_for_frame(
    events: &[AnnotatedEvent],
    frame_id: &str,
    selected: Option<&NormalizedRegion>,
) -> Vec<TaggedRegion> {
    let mut regions: Vec<TaggedRegion> = events
        .iter()
        .filter_map(|event| TaggedRegion::from_event(event, frame_id))
        .collect();
    if let Some(region) = selected.filter(|r| r.frame_id == frame_id) {
        regions.push(TaggedRegion::new(region.clone(), RegionState::Selected));
    }
    regions
}

/// Text chip drawn just above a persisted region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelChip {
    pub text: String,
    pub rect: PixelRect,
    pub background: Rgba,
    pub foreground: Rgba,
}

/// One drawn rectangle in display pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayItem {
    pub rect: PixelRect,
    pub state: RegionState,
    pub border: Rgba,
    pub fill: Rgba,
    pub border_width: f64,
    pub label: Option<LabelChip>,
}

/// Everything needed to paint the overlay for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayScene {
    pub width: f64,
    pub height: f64,
    /// Show a loading placeholder instead of the frame image.
    pub skeleton: bool,
    pub items: Vec<OverlayItem>,
}

/// Projects tagged regions onto a displayed frame.
#[derive(Debug, Default)]
pub struct OverlayRenderer {
    image_ready: bool,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image_loaded(&mut self) {
        self.image_ready = true;
    }

    /// A failed image stops the skeleton; the frame is shown without it.
    pub fn image_failed(&mut self) {
        self.image_ready = true;
    }

    /// Forget the image state when switching frames.
    pub fn reset(&mut self) {
        self.image_ready = false;
    }

    pub fn is_image_ready(&self) -> bool {
        self.image_ready
    }

    /// Build the scene. `drag` is the live capture rectangle in display
    /// pixels and is drawn on top of everything else.
    pub fn render(
        &self,
        fit: &DisplayFit,
        regions: &[TaggedRegion],
        drag: Option<PixelRect>,
    ) -> OverlayScene {
        let scale = fit.display_scale();
        let mut items: Vec<OverlayItem> = regions
            .iter()
            .map(|tagged| {
                let rect = to_pixels(&tagged.region, fit.intrinsic, scale);
                let label = tagged
                    .label
                    .as_deref()
                    .zip(tagged.state.chip_background())
                    .map(|(text, background)| label_chip(text, &rect, background, fit));
                item(rect, tagged.state, label)
            })
            .collect();

        if let Some(rect) = drag {
            items.push(item(rect, RegionState::InProgressDrag, None));
        }

        trace!(
            items = items.len(),
            skeleton = !self.image_ready,
            "Rendered overlay scene"
        );

        OverlayScene {
            width: fit.display_width,
            height: fit.display_height,
            skeleton: !self.image_ready,
            items,
        }
    }
}

fn item(rect: PixelRect, state: RegionState, label: Option<LabelChip>) -> OverlayItem {
    let border = state.border();
    OverlayItem {
        rect,
        state,
        border,
        fill: border.with_alpha(FILL_ALPHA),
        border_width: state.border_width(),
        label,
    }
}

fn label_chip(text: &str, rect: &PixelRect, background: Rgba, fit: &DisplayFit) -> LabelChip {
    let width = text.chars().count() as f64 * CHIP_CHAR_WIDTH + CHIP_PADDING;
    let max_x = (fit.display_width - width).max(0.0);
    let max_y = (fit.display_height - CHIP_HEIGHT).max(0.0);
    LabelChip {
        text: text.to_string(),
        rect: PixelRect::new(
            rect.x.clamp(0.0, max_x),
            (rect.y - CHIP_OFFSET).clamp(0.0, max_y),
            width,
            CHIP_HEIGHT,
        ),
        background,
        foreground: Rgba::WHITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagmap_project_model::event::NewEvent;
    use tagmap_project_model::region::FrameSize;

    fn fit() -> DisplayFit {
        DisplayFit::at_scale(FrameSize::new(1000.0, 2000.0), 0.5)
    }

    fn region(x: f64, y: f64) -> NormalizedRegion {
        NormalizedRegion::new("f1", x, y, 0.3, 0.1).unwrap()
    }

    #[test]
    fn test_projects_regions_at_display_scale() {
        let renderer = OverlayRenderer::new();
        let scene = renderer.render(
            &fit(),
            &[TaggedRegion::new(region(0.1, 0.2), RegionState::Selected)],
            None,
        );
        assert_eq!(scene.width, 500.0);
        assert_eq!(scene.items.len(), 1);
        let item = &scene.items[0];
        assert!(item.rect.approx_eq(&PixelRect::new(50.0, 200.0, 150.0, 100.0), 1e-9));
        assert_eq!(item.border, Rgba::GREEN_500);
        assert_eq!(item.fill.a, 0.2);
        assert!(item.label.is_none());
    }

    #[test]
    fn test_skeleton_until_image_settles() {
        let mut renderer = OverlayRenderer::new();
        assert!(renderer.render(&fit(), &[], None).skeleton);

        renderer.image_loaded();
        assert!(!renderer.render(&fit(), &[], None).skeleton);

        renderer.reset();
        assert!(renderer.render(&fit(), &[], None).skeleton);

        renderer.image_failed();
        assert!(!renderer.render(&fit(), &[], None).skeleton);
    }

    #[test]
    fn test_label_chip_above_region() {
        let tagged = TaggedRegion::new(region(0.1, 0.2), RegionState::Pending).with_label("buy");
        let scene = OverlayRenderer::new().render(&fit(), &[tagged], None);
        let chip = scene.items[0].label.as_ref().unwrap();
        assert_eq!(chip.rect, PixelRect::new(50.0, 180.0, 34.0, 16.0));
        assert_eq!(chip.background, Rgba::ORANGE_500);
        assert_eq!(scene.items[0].border, Rgba::ORANGE_400);
    }

    #[test]
    fn test_label_chip_clamped_inside_view() {
        let top_right = NormalizedRegion::new("f1", 0.95, 0.0, 0.05, 0.1).unwrap();
        let tagged = TaggedRegion::new(top_right, RegionState::Implemented)
            .with_label("a_very_long_event_name");
        let scene = OverlayRenderer::new().render(&fit(), &[tagged], None);
        let chip = scene.items[0].label.as_ref().unwrap();
        assert_eq!(chip.rect.y, 0.0);
        assert!(chip.rect.right() <= scene.width);
        assert_eq!(chip.background, Rgba::GREEN_600);
    }

    #[test]
    fn test_drag_drawn_last() {
        let drag = PixelRect::new(10.0, 10.0, 40.0, 40.0);
        let scene = OverlayRenderer::new().render(
            &fit(),
            &[TaggedRegion::new(region(0.1, 0.2), RegionState::Implemented)],
            Some(drag),
        );
        let last = scene.items.last().unwrap();
        assert_eq!(last.state, RegionState::InProgressDrag);
        assert_eq!(last.rect, drag);
        assert_eq!(last.border, Rgba::BLUE_500);
    }

    #[test]
    fn test_regions_for_frame_tags_status() {
        let mut done = NewEvent::new("f1", "signup")
            .with_region(region(0.1, 0.1))
            .into_event("e1")
            .unwrap();
        done.implemented = Some(true);
        let unknown = NewEvent::new("f1", "cta")
            .with_region(region(0.5, 0.5))
            .into_event("e2")
            .unwrap();
        let elsewhere = NewEvent::new("f2", "other").into_event("e3").unwrap();
        let selected = region(0.2, 0.6);

        let regions = regions_for_frame(&[done, unknown, elsewhere], "f1", Some(&selected));
        let states: Vec<RegionState> = regions.iter().map(|r| r.state).collect();
        assert_eq!(
            states,
            vec![
                RegionState::Implemented,
                RegionState::Pending,
                RegionState::Selected
            ]
        );
        assert_eq!(regions[0].label.as_deref(), Some("signup"));
    }
}

//! Document composition.
//!
//! Lays out a cover page, then one section per frame (title, preview with
//! hotspot outlines, event detail blocks), and finally stamps the running
//! header and footer on every page once the page count is known.

use std::collections::HashMap;

use tagmap_common::config::{ApiConfig, AppConfig};
use tagmap_common::error::TagmapResult;
use tagmap_project_model::event::{events_for_frame, AnnotatedEvent};
use tagmap_project_model::frame::Frame;
use tagmap_project_model::region::{to_pixels, FrameSize, PixelRect};
use tagmap_resource_loader::endpoints::frame_image_candidates;
use tagmap_resource_loader::loader::ImageSource;
use tagmap_resource_loader::raster::EmbeddableImage;
use tracing::{debug, info, warn};

use crate::backend::{DrawingBackend, Font, RectStyle, Rgb, TextStyle};
use crate::export::ExportJob;
use crate::paginator::{event_block, fit_preview, PageGeometry, Paginator};
use crate::snippet::{base_snippet, event_snippet, wrap_code};

const SLATE_50: Rgb = Rgb(248, 250, 252);
const SLATE_600: Rgb = Rgb(71, 85, 105);
const TITLE_INK: Rgb = Rgb(33, 37, 41);
const BORDER: Rgb = Rgb::gray(220);
const MUTED: Rgb = Rgb::gray(100);
const PLACEHOLDER_INK: Rgb = Rgb::gray(120);

const IMPLEMENTED_STROKE: Rgb = Rgb(46, 204, 113);
const PENDING_STROKE: Rgb = Rgb(255, 159, 67);
const IMPLEMENTED_CHIP: Rgb = Rgb(39, 174, 96);
const PENDING_CHIP: Rgb = Rgb(243, 156, 18);

/// Horizontal padding of the running header and footer.
const BAND_PAD_X: f64 = 40.0;
const LOGO_SIZE: f64 = 20.0;
const STATUS_CHIP_WIDTH: f64 = 110.0;
const STATUS_CHIP_HEIGHT: f64 = 22.0;
/// Distance from the preview bottom to the first event title baseline.
const EVENTS_OFFSET: f64 = 28.0;
const SECTION_TITLE_HEIGHT: f64 = 16.0;
const COVER_CODE_HEIGHT: f64 = 140.0;

const PREVIEW_UNAVAILABLE: &str = "Preview not available";
const NO_EVENTS: &str = "No associated events.";

/// Layout and lookup settings for composition.
#[derive(Debug, Clone)]
pub struct CompositorSettings {
    pub api: ApiConfig,
    /// Header logo candidates, first loadable wins.
    pub logo_urls: Vec<String>,
    pub preview_max_height: f64,
    pub default_project_name: String,
    pub geometry: PageGeometry,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl CompositorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            api: config.api.clone(),
            logo_urls: config.export.logo_urls.clone(),
            preview_max_height: config.export.preview_max_height,
            default_project_name: config.export.default_project_name.clone(),
            geometry: PageGeometry::A4,
        }
    }
}

/// What a composition produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositionReport {
    pub pages: usize,
    pub frames: usize,
    pub events: usize,
    /// Frames whose preview fell back to a placeholder.
    pub missing_previews: Vec<String>,
    /// Event blocks whose code sample was cut to fit a page.
    pub truncated_blocks: usize,
}

/// Renders an [`ExportJob`] through a [`DrawingBackend`].
pub struct DocumentCompositor<'a> {
    images: &'a dyn ImageSource,
    settings: &'a CompositorSettings,
}

impl<'a> DocumentCompositor<'a> {
    pub fn new(images: &'a dyn ImageSource, settings: &'a CompositorSettings) -> Self {
        Self { images, settings }
    }

    /// Lay out the whole document. Frames are processed in order, each
    /// image awaited before the next frame starts.
    pub async fn compose<B: DrawingBackend>(
        &self,
        job: &mut ExportJob,
        backend: &mut B,
    ) -> TagmapResult<CompositionReport> {
        let geometry = self.settings.geometry;
        let project_name = job
            .options
            .project_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_project_name.clone());

        let logo = self.images.load_first(&self.settings.logo_urls).await;
        let mut report = CompositionReport {
            frames: job.frames.len(),
            events: job.events.len(),
            ..CompositionReport::default()
        };

        backend.new_page();
        self.draw_cover(backend, job.options.measurement_id.as_deref());

        let mut paginator = Paginator::new(geometry);
        for frame in &job.frames {
            let image = self
                .frame_image(&mut job.images, job.options.project_id.as_deref(), frame)
                .await;
            self.draw_frame_section(
                backend,
                &mut paginator,
                frame,
                &job.events,
                image.as_ref(),
                &mut report,
            )?;
        }

        let total = backend.page_count();
        for page in 0..total {
            backend.set_page(page)?;
            self.draw_header_footer(backend, page, total, &project_name, logo.as_ref(), &job.generated_at)?;
        }

        report.pages = total;
        info!(
            pages = report.pages,
            frames = report.frames,
            events = report.events,
            missing_previews = report.missing_previews.len(),
            "Composed document"
        );
        Ok(report)
    }

    async fn frame_image(
        &self,
        cache: &mut HashMap<String, Option<EmbeddableImage>>,
        project_id: Option<&str>,
        frame: &Frame,
    ) -> Option<EmbeddableImage> {
        if let Some(cached) = cache.get(&frame.id) {
            return cached.clone();
        }
        let candidates = frame_image_candidates(
            &self.settings.api,
            frame.image_url.as_deref(),
            project_id,
            &frame.id,
        );
        debug!(frame = %frame.id, candidates = candidates.len(), "Loading frame preview");
        let image = self.images.load_first(&candidates).await;
        cache.insert(frame.id.clone(), image.clone());
        image
    }

    fn draw_cover<B: DrawingBackend>(&self, backend: &mut B, measurement_id: Option<&str>) {
        let geometry = &self.settings.geometry;
        let x = geometry.margin_x;
        let top = geometry.content_top();

        backend.draw_text(
            "dataLayer code",
            x,
            top,
            TextStyle::new(Font::HelveticaBold, 18.0, Rgb::BLACK),
        );
        let body = TextStyle::new(Font::Helvetica, 12.0, Rgb::BLACK);
        backend.draw_text(
            "The dataLayer code is ready to be implemented on your website.",
            x,
            top + 18.0,
            body,
        );
        backend.draw_text(
            "Paste it into the <head> and use gtag() to send events from your app.",
            x,
            top + 34.0,
            body,
        );

        let code_top = top + 50.0;
        let code_width = geometry.content_width();
        backend.draw_rect(
            PixelRect::new(x - 6.0, code_top - 14.0, code_width + 12.0, COVER_CODE_HEIGHT + 28.0),
            RectStyle::stroked(BORDER, 1.0),
        );

        let code_style = TextStyle::new(Font::Courier, 10.0, Rgb::BLACK);
        let line_height = code_style.size * 1.15;
        let max_lines = (COVER_CODE_HEIGHT / line_height).floor() as usize + 1;
        let lines = wrap_code(&base_snippet(measurement_id), code_style.chars_in(code_width - 16.0));
        for (i, line) in lines.iter().take(max_lines).enumerate() {
            backend.draw_text(line, x, code_top + i as f64 * line_height, code_style);
        }

        backend.draw_text(
            "Tip: replace GA_MEASUREMENT_ID with your ID (e.g. G-XXXXXX).",
            x,
            code_top + COVER_CODE_HEIGHT + 24.0,
            TextStyle::new(Font::Helvetica, 11.0, Rgb::BLACK),
        );
    }

    fn draw_frame_section<B: DrawingBackend>(
        &self,
        backend: &mut B,
        paginator: &mut Paginator,
        frame: &Frame,
        events: &[AnnotatedEvent],
        image: Option<&EmbeddableImage>,
        report: &mut CompositionReport,
    ) -> TagmapResult<()> {
        let geometry = self.settings.geometry;
        let x = geometry.margin_x;
        let max_w = geometry.content_width();
        // The preview shares its first page with the section title.
        let max_h = self
            .settings
            .preview_max_height
            .min(geometry.content_height() - SECTION_TITLE_HEIGHT);

        paginator.start_section();
        let title = paginator.place(SECTION_TITLE_HEIGHT);
        ensure_page(backend, title.page);
        backend.draw_text(
            &format!("Screen: {}", frame.name),
            x,
            title.y,
            TextStyle::new(Font::HelveticaBold, 14.0, Rgb::BLACK),
        );

        let drawn = match image {
            Some(image) => {
                let (draw_w, draw_h) =
                    fit_preview(image.width as f64, image.height as f64, max_w, max_h);
                let slot = paginator.place(draw_h);
                ensure_page(backend, slot.page);
                let rect = PixelRect::new(x + (max_w - draw_w) / 2.0, slot.y, draw_w, slot.height);
                match backend.draw_image(image, rect) {
                    Ok(()) => {
                        self.draw_overlays(backend, frame, events, image, rect);
                        true
                    }
                    Err(e) => {
                        warn!(frame = %frame.id, error = %e, "Frame image could not be embedded");
                        self.draw_placeholder(backend, PixelRect::new(x, slot.y, max_w, slot.height));
                        false
                    }
                }
            }
            None => {
                warn!(frame = %frame.id, name = %frame.name, "Frame preview unavailable");
                let slot = paginator.place(max_h);
                ensure_page(backend, slot.page);
                self.draw_placeholder(backend, PixelRect::new(x, slot.y, max_w, slot.height));
                false
            }
        };
        if !drawn {
            report.missing_previews.push(frame.id.clone());
        }

        paginator.skip(EVENTS_OFFSET - event_block::TITLE_ASCENT);
        let frame_events: Vec<&AnnotatedEvent> = events_for_frame(events, &frame.id).collect();
        if frame_events.is_empty() {
            let row = paginator.place(event_block::TITLE_ASCENT + 4.0);
            ensure_page(backend, row.page);
            backend.draw_text(
                NO_EVENTS,
                x,
                row.y + event_block::TITLE_ASCENT,
                TextStyle::new(Font::Helvetica, 11.0, PLACEHOLDER_INK),
            );
            return Ok(());
        }

        for (i, event) in frame_events.into_iter().enumerate() {
            if self.draw_event_block(backend, paginator, i + 1, event) {
                report.truncated_blocks += 1;
            }
            paginator.skip(event_block::GAP);
        }
        Ok(())
    }

    /// Outline every event region on the drawn preview.
    fn draw_overlays<B: DrawingBackend>(
        &self,
        backend: &mut B,
        frame: &Frame,
        events: &[AnnotatedEvent],
        image: &EmbeddableImage,
        drawn: PixelRect,
    ) {
        let size = FrameSize::new(image.width as f64, image.height as f64);
        let scale = drawn.w / size.width;
        let label_style = TextStyle::new(Font::Helvetica, 10.0, Rgb::WHITE);

        for event in events_for_frame(events, &frame.id) {
            let Some(region) = event.region_on(&frame.id) else {
                continue;
            };
            let rect = to_pixels(region, size, scale).translate(drawn.x, drawn.y);
            let implemented = event.implemented.unwrap_or(false);
            let (stroke, chip) = if implemented {
                (IMPLEMENTED_STROKE, IMPLEMENTED_CHIP)
            } else {
                (PENDING_STROKE, PENDING_CHIP)
            };
            backend.draw_rect(rect, RectStyle::stroked(stroke, 1.0));

            let label_w = (backend.text_width(&event.name, label_style) + 8.0).min(drawn.w);
            let label_h = 16.0;
            let label_y = (drawn.y + 2.0).max(rect.y - label_h - 2.0);
            backend.draw_rect(
                PixelRect::new(rect.x, label_y, label_w, label_h),
                RectStyle::filled(chip),
            );
            backend.draw_text(&event.name, rect.x + 4.0, label_y + 11.0, label_style);
        }
    }

    fn draw_placeholder<B: DrawingBackend>(&self, backend: &mut B, rect: PixelRect) {
        backend.draw_rect(rect, RectStyle::stroked(BORDER, 1.0));
        backend.draw_text(
            PREVIEW_UNAVAILABLE,
            rect.x + 8.0,
            rect.y + 16.0,
            TextStyle::new(Font::Helvetica, 11.0, PLACEHOLDER_INK),
        );
    }

    /// Draw one numbered event block. Returns whether its code was cut.
    fn draw_event_block<B: DrawingBackend>(
        &self,
        backend: &mut B,
        paginator: &mut Paginator,
        number: usize,
        event: &AnnotatedEvent,
    ) -> bool {
        let geometry = self.settings.geometry;
        let x = geometry.margin_x;
        let has_location = event.location.as_deref().is_some_and(|l| !l.is_empty());

        let code_style = TextStyle::new(Font::Courier, 9.0, Rgb::BLACK);
        let mut lines = wrap_code(
            &event_snippet(event),
            code_style.chars_in(geometry.content_width() - 20.0),
        );
        let max_lines = event_block::max_code_lines(geometry.content_height(), has_location);
        let cut = lines.len() > max_lines;
        if cut {
            lines.truncate(max_lines.saturating_sub(1));
            lines.push("...".to_string());
            debug!(event = %event.id, kept = lines.len(), "Truncated event code sample");
        }

        let slot = paginator.place(event_block::height(lines.len(), has_location));
        ensure_page(backend, slot.page);
        let baseline = slot.y + event_block::TITLE_ASCENT;

        backend.draw_rect(
            PixelRect::new(x - 4.0, slot.y, geometry.content_width() + 8.0, slot.height),
            RectStyle::stroked(BORDER, 1.0),
        );
        backend.draw_text(
            &format!("{number}. {}", event.name),
            x,
            baseline,
            TextStyle::new(Font::HelveticaBold, 11.0, TITLE_INK),
        );

        let meta = TextStyle::new(Font::Helvetica, 11.0, MUTED);
        let dash = |value: &Option<String>| value.clone().filter(|v| !v.is_empty()).unwrap_or_else(|| "-".to_string());
        backend.draw_text(&format!("Category: {}", dash(&event.category)), x, baseline + 16.0, meta);
        backend.draw_text(&format!("Action: {}", dash(&event.action)), x + 200.0, baseline + 16.0, meta);
        backend.draw_text(&format!("Label: {}", dash(&event.label)), x + 360.0, baseline + 16.0, meta);
        if has_location {
            backend.draw_text(&format!("Location: {}", dash(&event.location)), x, baseline + 32.0, meta);
        }

        if let Some(status) = event.status() {
            let chip = if event.implemented == Some(true) {
                IMPLEMENTED_CHIP
            } else {
                PENDING_CHIP
            };
            let chip_x = geometry.width - x - STATUS_CHIP_WIDTH;
            backend.draw_rect(
                PixelRect::new(chip_x, baseline - 12.0, STATUS_CHIP_WIDTH, STATUS_CHIP_HEIGHT),
                RectStyle::filled(chip),
            );
            backend.draw_text(
                status.label(),
                chip_x + 10.0,
                baseline + 3.0,
                TextStyle::new(Font::HelveticaBold, 10.0, Rgb::WHITE),
            );
        }

        let code_top = baseline + event_block::code_offset(has_location);
        for (i, line) in lines.iter().enumerate() {
            backend.draw_text(
                line,
                x,
                code_top + i as f64 * event_block::CODE_LINE_HEIGHT,
                code_style,
            );
        }

        cut
    }

    fn draw_header_footer<B: DrawingBackend>(
        &self,
        backend: &mut B,
        page: usize,
        total: usize,
        project_name: &str,
        logo: Option<&EmbeddableImage>,
        generated_at: &str,
    ) -> TagmapResult<()> {
        let geometry = &self.settings.geometry;

        backend.draw_rect(
            PixelRect::new(0.0, 0.0, geometry.width, geometry.header_band),
            RectStyle::filled(SLATE_50),
        );
        if let Some(logo) = logo {
            let rect = PixelRect::new(BAND_PAD_X, 8.0, LOGO_SIZE, LOGO_SIZE);
            if let Err(e) = backend.draw_image(logo, rect) {
                debug!(error = %e, "Skipping header logo");
            }
        }
        backend.draw_text(
            &format!("Tagmap: {project_name}"),
            BAND_PAD_X + 28.0,
            22.0,
            TextStyle::new(Font::HelveticaBold, 11.0, SLATE_600),
        );

        let footer_top = geometry.height - geometry.footer_band;
        backend.draw_rect(
            PixelRect::new(0.0, footer_top, geometry.width, geometry.footer_band),
            RectStyle::filled(SLATE_50),
        );
        let footer_style = TextStyle::new(Font::Helvetica, 10.0, MUTED);
        let baseline = geometry.height - 10.0;
        backend.draw_text(&format!("Generated: {generated_at}"), BAND_PAD_X, baseline, footer_style);
        let label = format!("Page {} of {}", page + 1, total);
        let label_w = backend.text_width(&label, footer_style);
        backend.draw_text(&label, geometry.width - BAND_PAD_X - label_w, baseline, footer_style);
        Ok(())
    }
}

/// Append pages until `page` exists and make it current.
fn ensure_page<B: DrawingBackend>(backend: &mut B, page: usize) {
    while backend.page_count() <= page {
        backend.new_page();
    }
    if let Err(e) = backend.set_page(page) {
        warn!(page, error = %e, "Failed to select page");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DrawOp, RecordingBackend};
    use crate::export::ExportOptions;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tagmap_project_model::event::NewEvent;
    use tagmap_project_model::region::NormalizedRegion;
    use tagmap_resource_loader::raster::ImageFormat;

    /// Serves fixed images by URL and records what was asked for.
    #[derive(Default)]
    struct StaticImages {
        images: HashMap<String, EmbeddableImage>,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl ImageSource for StaticImages {
        async fn load(&self, url: &str) -> Option<EmbeddableImage> {
            self.requested.lock().unwrap().push(url.to_string());
            self.images.get(url).cloned()
        }
    }

    fn image(width: u32, height: u32) -> EmbeddableImage {
        EmbeddableImage {
            width,
            height,
            format: ImageFormat::Png,
            data: vec![],
        }
    }

    fn settings() -> CompositorSettings {
        let mut settings = CompositorSettings::default();
        settings.api.base_url = "http://api.test".to_string();
        settings.api.proxy_images = false;
        settings
    }

    fn event(frame: &str, name: &str, region: Option<NormalizedRegion>) -> AnnotatedEvent {
        let mut new = NewEvent::new(frame, name);
        new.region = region;
        new.into_event(format!("e-{name}")).unwrap()
    }

    fn job(frames: Vec<Frame>, events: Vec<AnnotatedEvent>) -> ExportJob {
        let mut job = ExportJob::new(
            frames,
            events,
            ExportOptions {
                project_name: Some("Shop".to_string()),
                ..ExportOptions::default()
            },
        );
        job.generated_at = "2026-01-01 10:00".to_string();
        job
    }

    #[tokio::test]
    async fn test_document_layout() {
        let mut images = StaticImages::default();
        images
            .images
            .insert("https://cdn.test/home.png".to_string(), image(1000, 2000));
        let settings = settings();
        let compositor = DocumentCompositor::new(&images, &settings);

        let region = NormalizedRegion::new("home", 0.1, 0.2, 0.3, 0.1).unwrap();
        let mut done = event("home", "signup", Some(region));
        done.implemented = Some(true);
        let mut job = job(
            vec![
                Frame::new("home", "Home", 1000.0, 2000.0).with_image_url("https://cdn.test/home.png"),
                Frame::new("empty", "Empty", 375.0, 812.0),
            ],
            vec![done, event("home", "cta", None)],
        );

        let mut backend = RecordingBackend::new(PageGeometry::A4.width, PageGeometry::A4.height);
        let report = compositor.compose(&mut job, &mut backend).await.unwrap();

        assert_eq!(report.pages, 3);
        assert_eq!(report.missing_previews, vec!["empty".to_string()]);
        assert!(backend.texts_on(0).contains(&"dataLayer code"));
        assert!(backend.texts_on(1).contains(&"Screen: Home"));
        assert!(backend.texts_on(1).contains(&"1. signup"));
        assert!(backend.texts_on(1).contains(&"2. cta"));
        assert!(backend.texts_on(1).contains(&"Implemented"));
        assert!(backend.texts_on(2).contains(&PREVIEW_UNAVAILABLE));
        assert!(backend.texts_on(2).contains(&NO_EVENTS));
        assert!(backend.texts_on(2).contains(&"Page 3 of 3"));
        assert!(backend.texts_on(0).contains(&"Tagmap: Shop"));
        assert!(backend.texts_on(0).contains(&"Generated: 2026-01-01 10:00"));

        // Preview 160x320 centred in the content width; the region lands at
        // 10%/20% of the drawn image.
        let drawn_x = 48.0 + (PageGeometry::A4.content_width() - 160.0) / 2.0;
        let outline = backend.pages()[1].iter().find_map(|op| match op {
            DrawOp::Rect { rect, style } if style.stroke == Some(IMPLEMENTED_STROKE) => Some(*rect),
            _ => None,
        });
        let expected = PixelRect::new(drawn_x + 16.0, 84.0 + 64.0, 48.0, 32.0);
        assert!(outline.unwrap().approx_eq(&expected, 1e-6));
    }

    #[tokio::test]
    async fn test_image_candidates_and_cache() {
        let images = StaticImages::default();
        let settings = settings();
        let compositor = DocumentCompositor::new(&images, &settings);
        let mut job = job(
            vec![Frame::new("1:2", "Cart", 375.0, 812.0).with_image_url("https://cdn.test/cart.png")],
            vec![],
        );
        job.options.project_id = Some("p1".to_string());

        let mut backend = RecordingBackend::new(PageGeometry::A4.width, PageGeometry::A4.height);
        compositor.compose(&mut job, &mut backend).await.unwrap();

        let requested = images.requested.lock().unwrap().clone();
        assert_eq!(
            requested,
            vec![
                "https://cdn.test/cart.png".to_string(),
                "http://api.test/integrations/figma/frame-image?projectId=p1&nodeId=1%3A2&scale=2&format=png".to_string(),
            ]
        );
        assert_eq!(job.images.get("1:2"), Some(&None));
        assert_eq!(job.frames[0].id, "1:2");
    }

    #[tokio::test]
    async fn test_event_blocks_are_two_points_apart() {
        let images = StaticImages::default();
        let settings = settings();
        let compositor = DocumentCompositor::new(&images, &settings);
        let events = (0..3).map(|i| event("f", &format!("event_{i}"), None)).collect();
        let mut job = job(vec![Frame::new("f", "F", 375.0, 812.0)], events);

        let mut backend = RecordingBackend::new(PageGeometry::A4.width, PageGeometry::A4.height);
        compositor.compose(&mut job, &mut backend).await.unwrap();

        let mut blocks: Vec<PixelRect> = backend.pages()[1]
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { rect, style } if style.stroke == Some(BORDER) && rect.x == 44.0 => Some(*rect),
                _ => None,
            })
            .collect();
        blocks.sort_by(|a, b| a.y.total_cmp(&b.y));
        assert_eq!(blocks.len(), 3);
        for pair in blocks.windows(2) {
            assert!((pair[1].y - pair[0].bottom() - 2.0).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_tall_preview_fits_page_and_keeps_aspect() {
        let mut images = StaticImages::default();
        images
            .images
            .insert("https://cdn.test/scroll.png".to_string(), image(100, 10_000));
        let mut settings = settings();
        settings.preview_max_height = 5_000.0;
        let compositor = DocumentCompositor::new(&images, &settings);

        let region = NormalizedRegion::new("long", 0.0, 0.5, 1.0, 0.5).unwrap();
        let mut hotspot = event("long", "footer_link", Some(region));
        hotspot.implemented = Some(true);
        let mut job = job(
            vec![Frame::new("long", "Long", 100.0, 10_000.0).with_image_url("https://cdn.test/scroll.png")],
            vec![hotspot],
        );

        let mut backend = RecordingBackend::new(PageGeometry::A4.width, PageGeometry::A4.height);
        compositor.compose(&mut job, &mut backend).await.unwrap();

        let page = &backend.pages()[1];
        let drawn = page
            .iter()
            .find_map(|op| match op {
                DrawOp::Image { rect, width: 100, .. } => Some(*rect),
                _ => None,
            })
            .unwrap();
        assert!(drawn.bottom() <= PageGeometry::A4.content_bottom() + 1e-6);
        assert!((drawn.w / drawn.h - 0.01).abs() < 1e-9);

        let outline = page
            .iter()
            .find_map(|op| match op {
                DrawOp::Rect { rect, style } if style.stroke == Some(IMPLEMENTED_STROKE) => Some(*rect),
                _ => None,
            })
            .unwrap();
        let expected = PixelRect::new(drawn.x, drawn.y + drawn.h / 2.0, drawn.w, drawn.h / 2.0);
        assert!(outline.approx_eq(&expected, 1e-6));
    }

    #[tokio::test]
    async fn test_many_events_spill_onto_new_pages() {
        let images = StaticImages::default();
        let settings = settings();
        let compositor = DocumentCompositor::new(&images, &settings);
        let events: Vec<AnnotatedEvent> = (0..12)
            .map(|i| {
                let mut e = event("f", &format!("event_{i}"), None);
                e.location = Some("Header".to_string());
                e
            })
            .collect();
        let mut job = job(vec![Frame::new("f", "Long", 375.0, 812.0)], events);

        let mut backend = RecordingBackend::new(PageGeometry::A4.width, PageGeometry::A4.height);
        let report = compositor.compose(&mut job, &mut backend).await.unwrap();

        assert!(report.pages > 2);
        assert!(backend.contains_text("12. event_11"));
        let bottom = PageGeometry::A4.content_bottom();
        for page in &backend.pages()[1..] {
            for op in page {
                if let DrawOp::Rect { rect, style } = op {
                    if style.stroke == Some(BORDER) {
                        assert!(rect.bottom() <= bottom + 1e-6);
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_oversized_code_is_truncated() {
        let images = StaticImages::default();
        let settings = settings();
        let compositor = DocumentCompositor::new(&images, &settings);
        let mut huge = event("f", "huge", None);
        huge.label = Some("x".repeat(10_000));
        let mut job = job(vec![Frame::new("f", "F", 375.0, 812.0)], vec![huge]);

        let mut backend = RecordingBackend::new(PageGeometry::A4.width, PageGeometry::A4.height);
        let report = compositor.compose(&mut job, &mut backend).await.unwrap();
        assert_eq!(report.truncated_blocks, 1);
        assert!(backend.contains_text("..."));
    }
}

//! Drawing primitives the compositor renders through.
//!
//! All coordinates are page points with the origin at the top-left corner.
//! Text is positioned by its baseline.

use tagmap_common::error::TagmapResult;
use tagmap_project_model::region::PixelRect;
use tagmap_resource_loader::raster::EmbeddableImage;

/// Opaque 8-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// A grey level, as in `gray(220)`.
    pub const fn gray(level: u8) -> Self {
        Rgb(level, level, level)
    }
}

/// The three standard fonts documents use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    Courier,
}

impl Font {
    /// Average advance per character as a fraction of the font size.
    fn advance(&self) -> f64 {
        match self {
            Self::Helvetica => 0.52,
            Self::HelveticaBold => 0.56,
            Self::Courier => 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f64,
    pub color: Rgb,
}

impl TextStyle {
    pub const fn new(font: Font, size: f64, color: Rgb) -> Self {
        Self { font, size, color }
    }

    /// Estimated rendered width of `text`.
    pub fn width_of(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font.advance() * self.size
    }

    /// Characters of this style that fit in `width`.
    pub fn chars_in(&self, width: f64) -> usize {
        (width / (self.font.advance() * self.size)).floor().max(1.0) as usize
    }
}

/// Stroke and/or fill for a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectStyle {
    pub stroke: Option<Rgb>,
    pub fill: Option<Rgb>,
    pub line_width: f64,
}

impl RectStyle {
    pub const fn stroked(color: Rgb, line_width: f64) -> Self {
        Self {
            stroke: Some(color),
            fill: None,
            line_width,
        }
    }

    pub const fn filled(color: Rgb) -> Self {
        Self {
            stroke: None,
            fill: Some(color),
            line_width: 0.0,
        }
    }
}

/// A paged drawing surface.
pub trait DrawingBackend {
    /// Page width in points.
    fn page_width(&self) -> f64;

    /// Page height in points.
    fn page_height(&self) -> f64;

    /// Append a page and make it current. Returns its zero-based index.
    fn new_page(&mut self) -> usize;

    fn page_count(&self) -> usize;

    /// Make an existing page current.
    fn set_page(&mut self, index: usize) -> TagmapResult<()>;

    fn draw_image(&mut self, image: &EmbeddableImage, rect: PixelRect) -> TagmapResult<()>;

    fn draw_rect(&mut self, rect: PixelRect, style: RectStyle);

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: TextStyle);

    fn text_width(&self, text: &str, style: TextStyle) -> f64 {
        style.width_of(text)
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Image {
        rect: PixelRect,
        width: u32,
        height: u32,
    },
    Rect {
        rect: PixelRect,
        style: RectStyle,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        style: TextStyle,
    },
}

/// Backend that only remembers what was drawn, page by page.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    width: f64,
    height: f64,
    pages: Vec<Vec<DrawOp>>,
    current: usize,
}

impl RecordingBackend {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pages: vec![],
            current: 0,
        }
    }

    pub fn pages(&self) -> &[Vec<DrawOp>] {
        &self.pages
    }

    /// Every text drawn on `page`, in drawing order.
    pub fn texts_on(&self, page: usize) -> Vec<&str> {
        self.pages
            .get(page)
            .into_iter()
            .flatten()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether any page carries exactly `text`.
    pub fn contains_text(&self, text: &str) -> bool {
        (0..self.pages.len()).any(|page| self.texts_on(page).contains(&text))
    }

    fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.new_page();
        }
        self.pages[self.current].push(op);
    }
}

impl DrawingBackend for RecordingBackend {
    fn page_width(&self) -> f64 {
        self.width
    }

    fn page_height(&self) -> f64 {
        self.height
    }

    fn new_page(&mut self) -> usize {
        self.pages.push(vec![]);
        self.current = self.pages.len() - 1;
        self.current
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn set_page(&mut self, index: usize) -> TagmapResult<()> {
        if index >= self.pages.len() {
            return Err(tagmap_common::error::TagmapError::render(format!(
                "No page {index} (document has {})",
                self.pages.len()
            )));
        }
        self.current = index;
        Ok(())
    }

    fn draw_image(&mut self, image: &EmbeddableImage, rect: PixelRect) -> TagmapResult<()> {
        self.push(DrawOp::Image {
            rect,
            width: image.width,
            height: image.height,
        });
        Ok(())
    }

    fn draw_rect(&mut self, rect: PixelRect, style: RectStyle) {
        self.push(DrawOp::Rect { rect, style });
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: TextStyle) {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_backend_pages() {
        let mut backend = RecordingBackend::new(100.0, 200.0);
        assert_eq!(backend.new_page(), 0);
        backend.draw_text("first", 1.0, 2.0, TextStyle::new(Font::Helvetica, 10.0, Rgb::BLACK));
        assert_eq!(backend.new_page(), 1);
        backend.draw_rect(PixelRect::new(0.0, 0.0, 5.0, 5.0), RectStyle::filled(Rgb::WHITE));

        backend.set_page(0).unwrap();
        backend.draw_text("again", 1.0, 20.0, TextStyle::new(Font::Courier, 9.0, Rgb::BLACK));
        assert_eq!(backend.texts_on(0), vec!["first", "again"]);
        assert_eq!(backend.pages()[1].len(), 1);
        assert!(backend.set_page(2).is_err());
    }

    #[test]
    fn test_monospace_metrics() {
        let style = TextStyle::new(Font::Courier, 9.0, Rgb::BLACK);
        assert!((style.width_of("abcd") - 21.6).abs() < 1e-9);
        assert_eq!(style.chars_in(479.28), 88);
    }
}

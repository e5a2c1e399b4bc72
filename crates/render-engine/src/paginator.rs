//! Page geometry and block placement.
//!
//! The paginator hands out vertical slots top-down and breaks to a new page
//! whenever a block would run into the footer reserve. A block never ends
//! below `height - footer_reserve`; blocks taller than a whole page's content
//! area are clamped and flagged as truncated.

/// Fixed page layout, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    /// Band reserved for the running header.
    pub header_band: f64,
    /// Band reserved for the running footer.
    pub footer_band: f64,
    /// Horizontal content margin.
    pub margin_x: f64,
    /// Gap between the header band and the first content row.
    pub header_gap: f64,
    /// Gap kept above the footer band.
    pub footer_gap: f64,
}

impl PageGeometry {
    /// A4 portrait.
    pub const A4: PageGeometry = PageGeometry {
        width: 595.28,
        height: 841.89,
        header_band: 36.0,
        footer_band: 28.0,
        margin_x: 48.0,
        header_gap: 32.0,
        footer_gap: 24.0,
    };

    /// First usable y on a page.
    pub fn content_top(&self) -> f64 {
        self.header_band + self.header_gap
    }

    /// Space kept free at the bottom of each page.
    pub fn footer_reserve(&self) -> f64 {
        self.footer_band + self.footer_gap
    }

    /// Lowest y a block may reach.
    pub fn content_bottom(&self) -> f64 {
        self.height - self.footer_reserve()
    }

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin_x
    }

    /// Height available on an empty page.
    pub fn content_height(&self) -> f64 {
        self.content_bottom() - self.content_top()
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Layout constants for one event detail block.
pub mod event_block {
    /// Ascent of the block title above its baseline.
    pub const TITLE_ASCENT: f64 = 14.0;
    /// Offset from the title baseline to the code sample.
    pub const CODE_OFFSET: f64 = 56.0;
    /// Offset when a location row is present.
    pub const CODE_OFFSET_WITH_LOCATION: f64 = 64.0;
    /// Monospace line height.
    pub const CODE_LINE_HEIGHT: f64 = 12.0;
    pub const CODE_PADDING: f64 = 8.0;
    pub const BOTTOM_PADDING: f64 = 20.0;
    /// Vertical gap between consecutive blocks. The next title baseline
    /// lands 16 pt below the previous block.
    pub const GAP: f64 = 16.0 - TITLE_ASCENT;

    pub fn code_offset(has_location: bool) -> f64 {
        if has_location {
            CODE_OFFSET_WITH_LOCATION
        } else {
            CODE_OFFSET
        }
    }

    /// Height of a block carrying `code_lines` lines of code.
    pub fn height(code_lines: usize, has_location: bool) -> f64 {
        TITLE_ASCENT
            + code_offset(has_location)
            + code_lines as f64 * CODE_LINE_HEIGHT
            + CODE_PADDING
            + BOTTOM_PADDING
    }

    /// Most code lines a block of at most `max_height` can carry.
    pub fn max_code_lines(max_height: f64, has_location: bool) -> usize {
        let fixed = height(0, has_location);
        ((max_height - fixed) / CODE_LINE_HEIGHT).floor().max(0.0) as usize
    }
}

/// Displayed size of an image fitted into a `max_w x max_h` envelope,
/// preserving its aspect ratio.
pub fn fit_preview(image_w: f64, image_h: f64, max_w: f64, max_h: f64) -> (f64, f64) {
    if image_w <= 0.0 || image_h <= 0.0 {
        return (max_w, max_h);
    }
    let scale = (max_w / image_w).min(max_h / image_h);
    ((image_w * scale).max(1.0), (image_h * scale).max(1.0))
}

/// Where a block was put.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Zero-based page index.
    pub page: usize,
    /// Top of the block.
    pub y: f64,
    /// Height actually granted.
    pub height: f64,
    /// The requested height did not fit on an empty page.
    pub truncated: bool,
}

/// Top-down block placement over fixed-size pages.
#[derive(Debug, Clone)]
pub struct Paginator {
    geometry: PageGeometry,
    page: usize,
    y: f64,
}

impl Paginator {
    /// Start on page 0 at the top content margin.
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            page: 0,
            y: geometry.content_top(),
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Pages used so far.
    pub fn page_count(&self) -> usize {
        self.page + 1
    }

    /// Current y on the current page.
    pub fn cursor(&self) -> f64 {
        self.y
    }

    /// Begin a section on a fresh page.
    pub fn start_section(&mut self) -> usize {
        self.break_page();
        self.page
    }

    /// Leave vertical space. Overflow is resolved by the next `place`.
    pub fn skip(&mut self, gap: f64) {
        self.y += gap.max(0.0);
    }

    /// Reserve `height` points, breaking to a new page if needed.
    pub fn place(&mut self, height: f64) -> Placement {
        let limit = self.geometry.content_height();
        let truncated = height > limit;
        let height = height.clamp(0.0, limit);

        let at_top = self.y <= self.geometry.content_top();
        if !at_top && self.y + height > self.geometry.content_bottom() {
            self.break_page();
        }

        let placement = Placement {
            page: self.page,
            y: self.y,
            height,
            truncated,
        };
        self.y += height;
        placement
    }

    fn break_page(&mut self) {
        self.page += 1;
        self.y = self.geometry.content_top();
    }
}

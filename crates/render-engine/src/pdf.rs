//! PDF output through `lopdf`.
//!
//! Pages are buffered as content operations and assembled into a document
//! in [`PdfBackend::finish`]. Images are decoded to RGB and embedded as
//! image XObjects; text uses the standard Type1 fonts with WinAnsi encoding.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tagmap_common::error::{TagmapError, TagmapResult};
use tagmap_project_model::region::PixelRect;
use tagmap_resource_loader::raster::EmbeddableImage;

use crate::backend::{DrawingBackend, Font, RectStyle, Rgb, TextStyle};
use crate::paginator::PageGeometry;

#[derive(Debug, Default)]
struct PageBuffer {
    operations: Vec<Operation>,
    images: Vec<(String, ObjectId)>,
}

/// A [`DrawingBackend`] producing a PDF file.
pub struct PdfBackend {
    doc: Document,
    width: f64,
    height: f64,
    pages: Vec<PageBuffer>,
    current: usize,
    image_count: usize,
}

impl PdfBackend {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            doc: Document::with_version("1.5"),
            width,
            height,
            pages: vec![],
            current: 0,
            image_count: 0,
        }
    }

    /// A4 portrait.
    pub fn a4() -> Self {
        let geometry = PageGeometry::A4;
        Self::new(geometry.width, geometry.height)
    }

    /// Assemble the document and serialize it.
    pub fn finish(mut self) -> TagmapResult<Vec<u8>> {
        let fonts = self.font_resources();
        let pages_id = self.doc.new_object_id();
        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            (self.width as f32).into(),
            (self.height as f32).into(),
        ];

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in std::mem::take(&mut self.pages) {
            let content = Content {
                operations: page.operations,
            };
            let encoded = content.encode().map_err(pdf_error)?;
            let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));

            let mut xobjects = Dictionary::new();
            for (name, id) in page.images {
                xobjects.set(name, id);
            }

            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => media_box.clone(),
                "Resources" => dictionary! {
                    "Font" => fonts.clone(),
                    "XObject" => xobjects,
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        Ok(out)
    }

    fn font_resources(&mut self) -> Dictionary {
        let mut fonts = Dictionary::new();
        for font in [Font::Helvetica, Font::HelveticaBold, Font::Courier] {
            let id = self.doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base_font(font),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(resource_name(font), id);
        }
        fonts
    }

    fn page(&mut self) -> &mut PageBuffer {
        if self.pages.is_empty() {
            self.new_page();
        }
        &mut self.pages[self.current]
    }

    /// Flip a top-left y coordinate into PDF space.
    fn flip(&self, y: f64) -> f32 {
        (self.height - y) as f32
    }
}

/// JPEGs in a colour space PDF understands are embedded as-is (DCTDecode);
/// everything else is decoded to RGB and Flate-compressed.
fn image_xobject(image: &EmbeddableImage) -> TagmapResult<Stream> {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "BitsPerComponent" => 8i64,
    };
    if let Some(components) = image.jpeg_components() {
        let color_space = if components == 1 { "DeviceGray" } else { "DeviceRGB" };
        dict.set("ColorSpace", color_space);
        dict.set("Filter", "DCTDecode");
        return Ok(Stream::new(dict, image.data.clone()).with_compression(false));
    }

    let rgb = image
        .to_rgb8()
        .map_err(|e| TagmapError::render(format!("Cannot embed image: {e}")))?;
    dict.set("ColorSpace", "DeviceRGB");
    let mut stream = Stream::new(dict, rgb);
    stream.compress().map_err(pdf_error)?;
    Ok(stream)
}

impl DrawingBackend for PdfBackend {
    fn page_width(&self) -> f64 {
        self.width
    }

    fn page_height(&self) -> f64 {
        self.height
    }

    fn new_page(&mut self) -> usize {
        self.pages.push(PageBuffer::default());
        self.current = self.pages.len() - 1;
        self.current
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn set_page(&mut self, index: usize) -> TagmapResult<()> {
        if index >= self.pages.len() {
            return Err(TagmapError::render(format!(
                "No page {index} (document has {})",
                self.pages.len()
            )));
        }
        self.current = index;
        Ok(())
    }

    fn draw_image(&mut self, image: &EmbeddableImage, rect: PixelRect) -> TagmapResult<()> {
        let xobject = image_xobject(image)?;
        let id = self.doc.add_object(xobject);
        self.image_count += 1;
        let name = format!("Im{}", self.image_count);

        let bottom = self.flip(rect.y + rect.h);
        let page = self.page();
        page.images.push((name.clone(), id));
        page.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (rect.w as f32).into(),
                    Object::Integer(0),
                    Object::Integer(0),
                    (rect.h as f32).into(),
                    (rect.x as f32).into(),
                    bottom.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn draw_rect(&mut self, rect: PixelRect, style: RectStyle) {
        let bottom = self.flip(rect.y + rect.h);
        let mut ops = vec![Operation::new("q", vec![])];
        if let Some(color) = style.fill {
            ops.push(Operation::new("rg", color_operands(color)));
        }
        if let Some(color) = style.stroke {
            ops.push(Operation::new("RG", color_operands(color)));
            ops.push(Operation::new("w", vec![(style.line_width as f32).into()]));
        }
        ops.push(Operation::new(
            "re",
            vec![
                (rect.x as f32).into(),
                bottom.into(),
                (rect.w as f32).into(),
                (rect.h as f32).into(),
            ],
        ));
        let paint = match (style.fill.is_some(), style.stroke.is_some()) {
            (true, true) => "B",
            (true, false) => "f",
            (false, true) => "S",
            (false, false) => "n",
        };
        ops.push(Operation::new(paint, vec![]));
        ops.push(Operation::new("Q", vec![]));
        self.page().operations.extend(ops);
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: TextStyle) {
        let baseline = self.flip(y);
        self.page().operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(resource_name(style.font).as_bytes().to_vec()),
                    (style.size as f32).into(),
                ],
            ),
            Operation::new("rg", color_operands(style.color)),
            Operation::new("Td", vec![(x as f32).into(), baseline.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }
}

fn resource_name(font: Font) -> &'static str {
    match font {
        Font::Helvetica => "F1",
        Font::HelveticaBold => "F2",
        Font::Courier => "F3",
    }
}

fn base_font(font: Font) -> &'static str {
    match font {
        Font::Helvetica => "Helvetica",
        Font::HelveticaBold => "Helvetica-Bold",
        Font::Courier => "Courier",
    }
}

fn color_operands(color: Rgb) -> Vec<Object> {
    [color.0, color.1, color.2]
        .iter()
        .map(|c| Object::from(*c as f32 / 255.0))
        .collect()
}

/// Latin-1 subset of WinAnsi; anything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u8,
            _ => b'?',
        })
        .collect()
}

fn pdf_error(e: lopdf::Error) -> TagmapError {
    TagmapError::render(format!("PDF encoding failed: {e}"))
}

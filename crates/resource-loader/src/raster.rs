//! Decoding fetched payloads into images a document can embed.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat as CodecFormat, RgbaImage};

/// Side length used when an SVG reports no usable size.
const SVG_FALLBACK_SIDE: u32 = 256;

/// Encoding of [`EmbeddableImage::data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// A decoded-and-verified image ready to be placed in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddableImage {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// Encoded bytes in `format`.
    pub data: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("SVG parse failed: {0}")]
    Svg(#[from] usvg::Error),

    #[error("Cannot rasterize an SVG of {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },
}

impl EmbeddableImage {
    /// Accept a raster payload. PNG and JPEG pass through untouched; other
    /// raster formats are re-encoded as PNG.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, RasterError> {
        let decoded = image::load_from_memory(bytes)?;
        match image::guess_format(bytes)? {
            CodecFormat::Png => Ok(Self::passthrough(&decoded, ImageFormat::Png, bytes)),
            CodecFormat::Jpeg => Ok(Self::passthrough(&decoded, ImageFormat::Jpeg, bytes)),
            _ => Self::encode_png(&decoded),
        }
    }

    /// Decode any raster payload and re-encode it as PNG.
    pub fn reencode_png(bytes: &[u8]) -> Result<Self, RasterError> {
        Self::encode_png(&image::load_from_memory(bytes)?)
    }

    /// Rasterize an SVG document at its natural size.
    pub fn from_svg(bytes: &[u8]) -> Result<Self, RasterError> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opts)?;

        let size = tree.size();
        let width = natural_side(size.width());
        let height = natural_side(size.height());
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or(RasterError::EmptyCanvas { width, height })?;

        let transform = resvg::tiny_skia::Transform::from_scale(
            width as f32 / size.width().max(1.0),
            height as f32 / size.height().max(1.0),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let mut rgba = pixmap.take();
        demultiply_rgba8_in_place(&mut rgba);
        let image = RgbaImage::from_raw(width, height, rgba)
            .ok_or(RasterError::EmptyCanvas { width, height })?;
        Self::encode_png(&DynamicImage::ImageRgba8(image))
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    /// Decode to packed 8-bit RGB, compositing any transparency over white.
    pub fn to_rgb8(&self) -> Result<Vec<u8>, RasterError> {
        let codec = match self.format {
            ImageFormat::Png => CodecFormat::Png,
            ImageFormat::Jpeg => CodecFormat::Jpeg,
        };
        let rgba = image::load_from_memory_with_format(&self.data, codec)?.to_rgba8();
        let mut rgb = Vec::with_capacity(rgba.as_raw().len() / 4 * 3);
        for px in rgba.as_raw().chunks_exact(4) {
            let a = px[3] as u16;
            for &c in &px[..3] {
                rgb.push(((c as u16 * a + 255 * (255 - a) + 127) / 255) as u8);
            }
        }
        Ok(rgb)
    }

    /// Colour components of a JPEG that a PDF reader can decode as-is: 1 for
    /// greyscale, 3 for RGB. `None` for PNGs and for CMYK or unreadable JPEGs.
    pub fn jpeg_components(&self) -> Option<u8> {
        if self.format != ImageFormat::Jpeg {
            return None;
        }
        match sof_components(&self.data)? {
            n @ (1 | 3) => Some(n),
            _ => None,
        }
    }

    fn passthrough(decoded: &DynamicImage, format: ImageFormat, bytes: &[u8]) -> Self {
        Self {
            width: decoded.width(),
            height: decoded.height(),
            format,
            data: bytes.to_vec(),
        }
    }

    fn encode_png(image: &DynamicImage) -> Result<Self, RasterError> {
        let mut data = Vec::new();
        image.write_to(&mut Cursor::new(&mut data), CodecFormat::Png)?;
        Ok(Self {
            width: image.width(),
            height: image.height(),
            format: ImageFormat::Png,
            data,
        })
    }
}

/// Whether a payload should be treated as SVG.
pub fn looks_like_svg(url: &str, content_type: Option<&str>) -> bool {
    let by_type = content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim() == "image/svg+xml")
        .unwrap_or(false);
    let path = url.split(['?', '#']).next().unwrap_or(url);
    by_type || path.to_ascii_lowercase().ends_with(".svg")
}

fn natural_side(side: f32) -> u32 {
    if side.is_finite() && side >= 1.0 {
        side.round() as u32
    } else {
        SVG_FALLBACK_SIDE
    }
}

fn demultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Component count declared by the first start-of-frame segment of a JPEG.
fn sof_components(data: &[u8]) -> Option<u8> {
    if data.get(..2)? != [0xFF, 0xD8] {
        return None;
    }
    let mut i = 2;
    while i + 4 <= data.len() {
        if data[i] != 0xFF {
            return None;
        }
        let marker = data[i + 1];
        if marker == 0xFF {
            i += 1;
            continue;
        }
        // SOF0..SOF15, minus DHT, JPG and DAC
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            return data.get(i + 9).copied();
        }
        let len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + len;
    }
    None
}

//! Raster preparation for embedding
//!
//! Each image is checked against a pixel budget from its header before any
//! pixel data is decoded, then normalized to something the PDF backend can
//! embed: opaque, no larger than `max_edge` on either side.

use std::io::Cursor;

use image::codecs::jpeg::JpegDecoder;
use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat, ImageReader, Limits, RgbImage, RgbaImage};

use super::renderer::RenderError;

/// Largest source image accepted, in pixels
pub const DEFAULT_MAX_PIXELS: u64 = 40_000_000;

/// Longest side kept after downscaling. 400pt at 288 dpi.
pub const DEFAULT_MAX_EDGE: u32 = 1600;

/// Bounds applied to every embedded image
#[derive(Debug, Clone, Copy)]
pub struct RasterLimits {
    pub max_pixels: u64,
    pub max_edge: u32,
}

impl Default for RasterLimits {
    fn default() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
            max_edge: DEFAULT_MAX_EDGE,
        }
    }
}

/// Encoded image ready for the PDF backend
#[derive(Debug)]
pub struct PreparedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Bound, downscale and flatten one encoded image
///
/// Baseline JPEGs without alpha that already fit are passed through as-is.
/// Everything else is decoded under `limits`, reduced and re-encoded as an
/// RGB PNG.
pub fn prepare_image(data: &[u8], limits: &RasterLimits) -> Result<PreparedImage, RenderError> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let format = reader.format();
    let (width, height) = reader.into_dimensions()?;

    let pixels = u64::from(width) * u64::from(height);
    if pixels > limits.max_pixels {
        return Err(RenderError::ImageTooLarge { width, height });
    }

    let fits = width <= limits.max_edge && height <= limits.max_edge;
    if fits && format == Some(ImageFormat::Jpeg) && jpeg_is_opaque(data) {
        return Ok(PreparedImage {
            data: data.to_vec(),
            width,
            height,
        });
    }

    let mut reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let mut decode_limits = Limits::default();
    decode_limits.max_image_width = Some(width);
    decode_limits.max_image_height = Some(height);
    decode_limits.max_alloc = Some(limits.max_pixels.saturating_mul(8));
    reader.limits(decode_limits);

    let mut decoded = reader.decode()?;
    if !fits {
        decoded = decoded.thumbnail(limits.max_edge, limits.max_edge);
    }

    let rgb = if decoded.color().has_alpha() {
        flatten_on_white(&decoded.to_rgba8())
    } else {
        decoded.to_rgb8()
    };
    drop(decoded);

    let (width, height) = rgb.dimensions();
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(rgb).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(PreparedImage {
        data: png,
        width,
        height,
    })
}

fn jpeg_is_opaque(data: &[u8]) -> bool {
    JpegDecoder::new(Cursor::new(data))
        .map(|decoder| matches!(decoder.color_type(), ColorType::Rgb8 | ColorType::L8))
        .unwrap_or(false)
}

/// Composite onto a white background
fn flatten_on_white(rgba: &RgbaImage) -> RgbImage {
    let (width, height) = rgba.dimensions();
    let mut rgb = RgbImage::new(width, height);
    for (src, dst) in rgba.pixels().zip(rgb.pixels_mut()) {
        let [r, g, b, a] = src.0;
        let blend = |c: u8| -> u8 {
            let alpha = a as u16;
            ((c as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        dst.0 = [blend(r), blend(g), blend(b)];
    }
    rgb
}

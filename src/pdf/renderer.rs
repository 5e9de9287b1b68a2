//! PDF writer
//!
//! Builds a genpdf document from a content flow: paragraphs in the bundled
//! DejaVu Sans face, images centered at their display width, spacers as
//! vertical breaks. Images are prepared one at a time under [`RasterLimits`].

use std::io::Cursor;

use genpdf::elements::{Break, Image, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::{Alignment, Document, Margins, PaperSize, SimplePageDecorator};
use thiserror::Error;

use super::raster::{prepare_image, RasterLimits};
use crate::flow::ContentBlock;

/// Body typeface, embedded into every PDF
pub const BODY_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

const DOCUMENT_TITLE: &str = "Converted EPUB";

/// Page margins, in millimetres (one inch)
const MARGIN_MM: f64 = 25.4;

const FONT_SIZE: u8 = 10;

/// Line height as a multiple of the font size
const LINE_SPACING: f64 = 1.2;

/// Tallest an image may be drawn, in points. Keeps one image inside the
/// printable height of an A4 page.
const MAX_IMAGE_HEIGHT_PT: f64 = 680.0;

const MM_PER_PT: f64 = 25.4 / 72.0;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image too large: {width}x{height}")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("PDF error: {0}")]
    Pdf(#[from] genpdf::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders content flows to PDF bytes
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    limits: RasterLimits,
}

impl DocumentRenderer {
    pub fn new(limits: RasterLimits) -> Self {
        Self { limits }
    }

    /// Reject source images above `max_pixels`
    pub fn with_max_image_pixels(mut self, max_pixels: u64) -> Self {
        self.limits.max_pixels = max_pixels;
        self
    }

    /// Render `blocks` in order
    pub fn render(&self, blocks: &[ContentBlock]) -> Result<Vec<u8>, RenderError> {
        let font = FontData::new(BODY_FONT.to_vec(), None)?;
        let family = FontFamily {
            regular: font.clone(),
            bold: font.clone(),
            italic: font.clone(),
            bold_italic: font,
        };

        let mut doc = Document::new(family);
        doc.set_title(DOCUMENT_TITLE);
        doc.set_paper_size(PaperSize::A4);
        doc.set_font_size(FONT_SIZE);
        doc.set_line_spacing(LINE_SPACING);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(Margins::all(MARGIN_MM));
        doc.set_page_decorator(decorator);

        for block in blocks {
            match block {
                ContentBlock::Text { text } => {
                    doc.push(Paragraph::new(collapse_whitespace(text)));
                }
                ContentBlock::Image {
                    data,
                    display_width,
                } => {
                    doc.push(self.image_element(data, *display_width)?);
                }
                ContentBlock::Spacer { height } => {
                    doc.push(Break::new(spacer_lines(*height)));
                }
            }
        }

        let mut buf = Vec::new();
        doc.render(&mut buf)?;
        Ok(buf)
    }

    fn image_element(&self, data: &[u8], display_width: f32) -> Result<Image, RenderError> {
        let prepared = prepare_image(data, &self.limits)?;
        let width_pt = display_width_pt(
            prepared.width,
            prepared.height,
            f64::from(display_width),
        );
        let dpi = f64::from(prepared.width) * 72.0 / width_pt;

        tracing::debug!(
            width = prepared.width,
            height = prepared.height,
            width_mm = width_pt * MM_PER_PT,
            "Embedding image"
        );

        Ok(Image::from_reader(Cursor::new(prepared.data))?
            .with_alignment(Alignment::Center)
            .with_dpi(dpi))
    }
}

/// Drawn width for an image, shrunk when its height would overflow a page
fn display_width_pt(width: u32, height: u32, requested: f64) -> f64 {
    let height_pt = requested * f64::from(height) / f64::from(width.max(1));
    if height_pt > MAX_IMAGE_HEIGHT_PT {
        requested * MAX_IMAGE_HEIGHT_PT / height_pt
    } else {
        requested
    }
}

/// Spacer height in points as a count of body lines
fn spacer_lines(height: f32) -> f64 {
    f64::from(height) / (f64::from(FONT_SIZE) * LINE_SPACING)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

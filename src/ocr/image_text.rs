//! Image text extraction
//!
//! Turns one EPUB image item into content blocks: the OCR text (when any was
//! recognized) followed by the image itself. Failures are reported as an
//! explicit skip so a single bad image never aborts a conversion.

use std::fmt;
use std::io::Cursor;

use image::ImageFormat;

use super::service::OcrService;
use crate::flow::{ContentBlock, IMAGE_DISPLAY_WIDTH, IMAGE_SPACING, TEXT_SPACING};

/// Why an image item contributed nothing to the flow
#[derive(Debug)]
pub enum SkipReason {
    /// Bytes are not a raster image the decoder understands
    Decode(String),
    /// The OCR engine failed on a decodable image
    Ocr(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "image decode failed: {}", e),
            Self::Ocr(e) => write!(f, "OCR failed: {}", e),
        }
    }
}

/// Per-item result of image extraction
#[derive(Debug)]
pub enum ImageOutcome {
    Extracted(Vec<ContentBlock>),
    Skipped(SkipReason),
}

/// Decode an image, OCR it and emit its blocks
pub async fn extract_image_blocks(data: &[u8], ocr: &OcrService) -> ImageOutcome {
    let decoded = match image::load_from_memory(data) {
        Ok(img) => img,
        Err(e) => return ImageOutcome::Skipped(SkipReason::Decode(e.to_string())),
    };

    // Providers receive PNG regardless of the source format
    let mut png = Vec::new();
    if let Err(e) = decoded.write_to(&mut Cursor::new(&mut png), ImageFormat::Png) {
        return ImageOutcome::Skipped(SkipReason::Decode(format!("PNG re-encode: {}", e)));
    }
    drop(decoded);

    let recognized = match ocr.recognize(&png, None).await {
        Ok(result) => result,
        Err(e) => return ImageOutcome::Skipped(SkipReason::Ocr(e.to_string())),
    };

    let mut blocks = Vec::with_capacity(4);
    let text = recognized.text.trim();
    if !text.is_empty() {
        blocks.push(ContentBlock::text(text));
        blocks.push(ContentBlock::spacer(TEXT_SPACING));
    }
    blocks.push(ContentBlock::image(data.to_vec(), IMAGE_DISPLAY_WIDTH));
    blocks.push(ContentBlock::spacer(IMAGE_SPACING));

    ImageOutcome::Extracted(blocks)
}

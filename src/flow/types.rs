//! Content flow types

/// Gap after every text block, in points
pub const TEXT_SPACING: f32 = 8.0;

/// Gap after every image block, in points
pub const IMAGE_SPACING: f32 = 12.0;

/// Width images are drawn at, in points
pub const IMAGE_DISPLAY_WIDTH: f32 = 400.0;

/// One unit of output content, rendered in sequence order
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// A normal-style paragraph
    Text { text: String },
    /// An embedded raster image, scaled to `display_width` with its aspect ratio kept
    Image { data: Vec<u8>, display_width: f32 },
    /// Fixed vertical gap
    Spacer { height: f32 },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(data: Vec<u8>, display_width: f32) -> Self {
        Self::Image {
            data,
            display_width,
        }
    }

    pub fn spacer(height: f32) -> Self {
        Self::Spacer { height }
    }

    /// Paragraph text, if this is a text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Counters collected while assembling a flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowStats {
    pub items_scanned: usize,
    pub documents: usize,
    pub images: usize,
    pub images_skipped: usize,
    pub other: usize,
    pub text_blocks: usize,
    pub image_blocks: usize,
}

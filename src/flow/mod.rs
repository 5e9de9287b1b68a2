//! Content flow
//!
//! The ordered sequence of text, image and spacer blocks that the renderer
//! lays out. Blocks appear in the order the archive exposes its items; nothing
//! is reordered, deduplicated or grouped.

mod assembler;
mod types;

pub use assembler::{ContentFlow, FlowAssembler};
pub use types::{ContentBlock, FlowStats, IMAGE_DISPLAY_WIDTH, IMAGE_SPACING, TEXT_SPACING};

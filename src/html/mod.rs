//! HTML processing module
//!
//! Extracts readable paragraph text from EPUB document markup.
//!
//! Uses lol_html for efficient streaming HTML processing.

mod text;

pub use text::{decode_markup, extract_paragraphs, extract_text_blocks};

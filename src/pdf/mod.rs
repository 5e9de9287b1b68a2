//! PDF rendering module
//!
//! Renders a content flow onto A4 pages and writes it as a PDF.

mod raster;
mod renderer;

pub use raster::{prepare_image, PreparedImage, RasterLimits, DEFAULT_MAX_EDGE, DEFAULT_MAX_PIXELS};
pub use renderer::{DocumentRenderer, RenderError, BODY_FONT};

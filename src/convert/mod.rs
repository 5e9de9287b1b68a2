//! Conversion orchestration
//!
//! Drives one upload through archive extraction, flow assembly and PDF
//! rendering, with per-job temp files.

mod converter;
mod error;
mod workspace;

pub use converter::{validate_filename, ConversionOutput, Converter};
pub use error::{ConversionError, ValidationError};
pub use workspace::{InputGuard, JobPaths, Workspace};

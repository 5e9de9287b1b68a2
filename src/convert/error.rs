//! Conversion error types

use thiserror::Error;

use crate::epub::ArchiveError;
use crate::pdf::RenderError;

/// Upload rejected before any processing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Only EPUB files allowed")]
    UnsupportedExtension,
}

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to read EPUB: {0}")]
    Archive(#[from] ArchiveError),

    #[error("No readable text or images found in EPUB")]
    NoContent,

    #[error("Failed to render PDF: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conversion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

//! OCR Module
//!
//! Provides OCR (Optical Character Recognition) for images embedded in EPUBs.
//!
//! Supports multiple backends:
//! - Tesseract (local binary, path configured at startup)
//! - Ollama vision models (local LLM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use epub_pdf_server::ocr::{extract_image_blocks, OcrService, OcrServiceConfig};
//!
//! let service = OcrService::new(&OcrServiceConfig::default());
//!
//! match extract_image_blocks(&image_bytes, &service).await {
//!     ImageOutcome::Extracted(blocks) => flow.extend(blocks),
//!     ImageOutcome::Skipped(reason) => tracing::warn!("{}", reason),
//! }
//! ```

mod image_text;
mod provider;
mod service;
mod types;

pub use image_text::{extract_image_blocks, ImageOutcome, SkipReason};
pub use provider::{validate_language, OcrProviderTrait, OllamaProvider, TesseractProvider};
pub use service::{OcrService, OcrServiceConfig};
pub use types::{OcrError, OcrProvider, OcrResult};

#[cfg(test)]
pub(crate) use provider::MockProvider;

//! EPUB to PDF Server Library
//!
//! Converts uploaded EPUB books into text-and-image PDFs. The binary in
//! main.rs only wires configuration, logging and the listener; everything else
//! lives here so integration tests and benchmarks can drive it.
//!
//! # Modules
//!
//! - `epub`: Archive access and manifest item classification
//! - `html`: Paragraph text extraction from document markup
//! - `ocr`: Image text recognition (Tesseract, Ollama)
//! - `flow`: Ordered content assembly
//! - `pdf`: Image preparation and PDF writing
//! - `convert`: Per-request pipeline and temp files
//! - `routes`: HTTP surface

pub mod config;
pub mod convert;
pub mod epub;
pub mod error;
pub mod flow;
pub mod html;
pub mod ocr;
pub mod pdf;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

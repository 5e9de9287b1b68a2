//! Conversion pipeline
//!
//! validate → write temp input → extract → assemble → render → write output.
//! The temp input is removed on every exit path.

use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use super::error::{ConversionError, ValidationError};
use super::workspace::{InputGuard, Workspace};
use crate::epub::EpubArchive;
use crate::flow::{FlowAssembler, FlowStats};
use crate::ocr::OcrService;
use crate::pdf::DocumentRenderer;

/// Result of a successful conversion
#[derive(Debug)]
pub struct ConversionOutput {
    pub job_id: Uuid,
    pub pdf: Vec<u8>,
    pub output_path: PathBuf,
    pub stats: FlowStats,
}

/// Runs EPUB uploads through the pipeline
pub struct Converter {
    workspace: Workspace,
    ocr: Arc<OcrService>,
    renderer: DocumentRenderer,
}

impl Converter {
    pub fn new(workspace: Workspace, ocr: Arc<OcrService>) -> Self {
        Self {
            workspace,
            ocr,
            renderer: DocumentRenderer::default(),
        }
    }

    pub fn with_renderer(mut self, renderer: DocumentRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn ocr(&self) -> &OcrService {
        &self.ocr
    }

    /// Convert one uploaded EPUB
    ///
    /// Validation happens before anything touches the disk.
    pub async fn convert_upload(
        &self,
        filename: Option<&str>,
        data: &[u8],
    ) -> Result<ConversionOutput, ConversionError> {
        let filename = validate_filename(filename)?;

        let job = self.workspace.job();
        tracing::info!(
            job_id = %job.id,
            filename,
            bytes = data.len(),
            "Received EPUB upload"
        );

        let input = InputGuard::new(job.input.clone());
        tokio::fs::write(&job.input, data).await?;

        let mut archive = EpubArchive::open(&job.input).await?;
        tracing::info!(
            job_id = %job.id,
            items = archive.manifest().len(),
            "Extracted archive items"
        );

        let flow = FlowAssembler::new(&self.ocr)
            .assemble(archive.items())
            .await?;
        let stats = flow.stats();

        if !flow.found_content() {
            tracing::info!(job_id = %job.id, ?stats, "No content found");
            return Err(ConversionError::NoContent);
        }
        tracing::info!(job_id = %job.id, ?stats, "Assembled content flow");

        let renderer = self.renderer.clone();
        let blocks = flow.into_blocks();
        let pdf = tokio::task::spawn_blocking(move || renderer.render(&blocks)).await??;

        tokio::fs::write(&job.output, &pdf).await?;
        input.remove().await;
        tracing::info!(
            job_id = %job.id,
            output = %job.output.display(),
            bytes = pdf.len(),
            "Rendered PDF"
        );

        Ok(ConversionOutput {
            job_id: job.id,
            pdf,
            output_path: job.output,
            stats,
        })
    }
}

/// Accept only filenames ending in `.epub`, any case
///
/// A part without a filename is missing; an empty filename is present but
/// has the wrong extension.
pub fn validate_filename(filename: Option<&str>) -> Result<&str, ValidationError> {
    let filename = filename.ok_or(ValidationError::MissingFile)?;

    if filename.to_ascii_lowercase().ends_with(".epub") {
        Ok(filename)
    } else {
        Err(ValidationError::UnsupportedExtension)
    }
}

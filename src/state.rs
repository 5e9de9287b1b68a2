//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::convert::{Converter, Workspace};
use crate::ocr::OcrService;

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to create working directories: {0}")]
    Workspace(#[from] std::io::Error),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    converter: Converter,
}

impl AppState {
    /// Create a new application state
    ///
    /// Builds the OCR service from configuration and creates the upload and
    /// output directories.
    pub async fn new(config: Config) -> Result<Self, StateError> {
        let ocr = OcrService::new(&config.ocr);
        Self::with_ocr_service(config, ocr).await
    }

    /// Create state around an already built OCR service
    pub async fn with_ocr_service(config: Config, ocr: OcrService) -> Result<Self, StateError> {
        let workspace = Workspace::from_config(&config.storage);
        workspace.ensure_dirs().await?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                converter: Converter::new(workspace, Arc::new(ocr)),
                config,
            }),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the conversion pipeline
    pub fn converter(&self) -> &Converter {
        &self.inner.converter
    }
}

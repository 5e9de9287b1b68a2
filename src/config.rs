//! Configuration management for the EPUB to PDF server

use std::env;
use std::path::PathBuf;

use crate::ocr::{OcrProvider, OcrServiceConfig};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Unknown OCR provider: {0}")]
    UnknownProvider(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ocr: OcrServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request body limit for uploads, in bytes
    pub max_upload_bytes: usize,
}

/// Directories for per-request temp files
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Inbound EPUB uploads (removed after each request)
    pub upload_dir: PathBuf,
    /// Rendered PDFs (left in place)
    pub output_dir: PathBuf,
}

const DEFAULT_PORT: u16 = 10000;
const DEFAULT_MAX_UPLOAD_MB: usize = 100;

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                output_dir: PathBuf::from("output"),
            },
            ocr: OcrServiceConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let port = match env::var("PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value,
            })?,
            Err(_) => defaults.server.port,
        };

        let max_upload_bytes = match env::var("MAX_UPLOAD_MB") {
            Ok(value) => {
                let mb: usize = value.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "MAX_UPLOAD_MB",
                    value,
                })?;
                mb * 1024 * 1024
            }
            Err(_) => defaults.server.max_upload_bytes,
        };

        let providers = match env::var("OCR_PROVIDERS") {
            Ok(value) => parse_providers(&value)?,
            Err(_) => defaults.ocr.providers,
        };

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or(defaults.server.host),
                port,
                max_upload_bytes,
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.upload_dir),
                output_dir: env::var("OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.output_dir),
            },
            ocr: OcrServiceConfig {
                providers,
                tesseract_path: env::var("TESSERACT_CMD").unwrap_or(defaults.ocr.tesseract_path),
                default_language: env::var("OCR_LANGUAGE")
                    .unwrap_or(defaults.ocr.default_language),
                ollama_url: env::var("OLLAMA_URL").unwrap_or(defaults.ocr.ollama_url),
                ollama_model: env::var("OLLAMA_MODEL").unwrap_or(defaults.ocr.ollama_model),
            },
        })
    }
}

/// Parse a comma separated provider list such as `tesseract,ollama`
fn parse_providers(value: &str) -> Result<Vec<OcrProvider>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|_| ConfigError::UnknownProvider(s.to_string())))
        .collect()
}

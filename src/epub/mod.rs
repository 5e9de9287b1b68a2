//! EPUB parsing module
//!
//! Reads the EPUB container (zip + package document) and yields its manifest
//! items classified by declared media type.

mod archive;
mod types;

pub use archive::{ArchiveError, EpubArchive, SourceItems};
pub use types::{ItemKind, ManifestEntry, SourceItem};

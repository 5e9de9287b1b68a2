//! EPUB item types

/// How an archive item is processed, decided from its declared media type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// XHTML/HTML content document
    Document,
    /// Raster or vector image
    Image,
    /// Stylesheets, fonts, navigation files and anything else
    Other,
}

impl ItemKind {
    /// Classify a manifest media type
    pub fn from_media_type(media_type: &str) -> Self {
        let media_type = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match media_type.as_str() {
            "application/xhtml+xml" | "text/html" => Self::Document,
            m if m.starts_with("image/") => Self::Image,
            _ => Self::Other,
        }
    }
}

/// One manifest entry with its content
#[derive(Debug, Clone)]
pub struct SourceItem {
    pub kind: ItemKind,
    /// Path of the entry inside the zip
    pub path: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

/// Manifest entry resolved against the package document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: String,
    /// Path of the entry inside the zip
    pub path: String,
    pub media_type: String,
    pub kind: ItemKind,
}

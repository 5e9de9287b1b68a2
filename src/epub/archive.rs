//! EPUB container access
//!
//! Opens the zip, follows `META-INF/container.xml` to the package document and
//! exposes the manifest items in declaration order. Item content is read
//! lazily, one entry at a time.

use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::de::from_str;
use serde::Deserialize;
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use super::types::{ItemKind, ManifestEntry, SourceItem};

const CONTAINER_PATH: &str = "META-INF/container.xml";
const PACKAGE_MEDIA_TYPE: &str = "application/oebps-package+xml";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Not a valid EPUB archive: {0}")]
    Zip(#[from] ZipError),

    #[error("Missing META-INF/container.xml")]
    MissingContainer,

    #[error("container.xml declares no package document")]
    NoRootfile,

    #[error("Package document not found: {0}")]
    MissingPackage(String),

    #[error("Malformed XML in {path}: {message}")]
    Xml { path: String, message: String },

    #[error("Package document has no manifest")]
    MissingManifest,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An opened EPUB
pub struct EpubArchive {
    zip: ZipArchive<Cursor<Vec<u8>>>,
    package_path: String,
    manifest: Vec<ManifestEntry>,
}

impl EpubArchive {
    /// Open an EPUB from a file path
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let data = tokio::fs::read(path).await?;
        Self::from_bytes(data)
    }

    /// Open an EPUB from bytes
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ArchiveError> {
        let mut zip = ZipArchive::new(Cursor::new(data))?;

        let container = match read_entry(&mut zip, CONTAINER_PATH) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(ZipError::FileNotFound) => return Err(ArchiveError::MissingContainer),
            Err(e) => return Err(e.into()),
        };
        let package_path = package_path(&container)?;

        let package = match read_entry(&mut zip, &package_path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(ZipError::FileNotFound) => return Err(ArchiveError::MissingPackage(package_path)),
            Err(e) => return Err(e.into()),
        };
        let manifest = parse_manifest(&package, &package_path)?;

        tracing::debug!(
            package = %package_path,
            items = manifest.len(),
            "Opened EPUB package"
        );

        Ok(Self {
            zip,
            package_path,
            manifest,
        })
    }

    /// Path of the package document inside the zip
    pub fn package_path(&self) -> &str {
        &self.package_path
    }

    /// Manifest entries in declaration order
    pub fn manifest(&self) -> &[ManifestEntry] {
        &self.manifest
    }

    /// Iterate the manifest items, reading each entry's content on demand
    pub fn items(&mut self) -> SourceItems<'_> {
        SourceItems {
            zip: &mut self.zip,
            entries: self.manifest.iter(),
        }
    }
}

/// Lazy iterator over manifest items
///
/// Entries declared in the manifest but absent from the zip are skipped with a
/// warning; any other read failure is yielded as an error.
pub struct SourceItems<'a> {
    zip: &'a mut ZipArchive<Cursor<Vec<u8>>>,
    entries: std::slice::Iter<'a, ManifestEntry>,
}

impl Iterator for SourceItems<'_> {
    type Item = Result<SourceItem, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        for entry in self.entries.by_ref() {
            match read_entry(self.zip, &entry.path) {
                Ok(data) => {
                    return Some(Ok(SourceItem {
                        kind: entry.kind,
                        path: entry.path.clone(),
                        media_type: entry.media_type.clone(),
                        data,
                    }))
                }
                Err(ZipError::FileNotFound) => {
                    tracing::warn!(
                        id = %entry.id,
                        path = %entry.path,
                        "Manifest item missing from archive, skipping"
                    );
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
        None
    }
}

fn read_entry(zip: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Result<Vec<u8>, ZipError> {
    let mut file = zip.by_name(name)?;
    let mut buf = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Find the package document path in container.xml
fn package_path(container_xml: &str) -> Result<String, ArchiveError> {
    let container: Container = from_str(container_xml).map_err(|e| ArchiveError::Xml {
        path: CONTAINER_PATH.to_string(),
        message: e.to_string(),
    })?;

    let rootfiles = container.rootfiles.map(|r| r.rootfile).unwrap_or_default();

    rootfiles
        .iter()
        .find(|r| r.media_type.as_deref() == Some(PACKAGE_MEDIA_TYPE))
        .or_else(|| rootfiles.first())
        .and_then(|r| r.full_path.as_deref())
        .map(|p| p.trim_start_matches('/').to_string())
        .filter(|p| !p.is_empty())
        .ok_or(ArchiveError::NoRootfile)
}

/// Parse manifest items, resolving hrefs against the package document
fn parse_manifest(package_xml: &str, package_path: &str) -> Result<Vec<ManifestEntry>, ArchiveError> {
    let package: OpfPackage = from_str(package_xml).map_err(|e| ArchiveError::Xml {
        path: package_path.to_string(),
        message: e.to_string(),
    })?;

    let manifest = package.manifest.ok_or(ArchiveError::MissingManifest)?;
    let base_dir = package_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

    let entries = manifest
        .item
        .into_iter()
        .filter_map(|item| {
            let Some(href) = item.href else {
                tracing::debug!(id = ?item.id, "Manifest item without href, ignoring");
                return None;
            };
            let media_type = item.media_type.unwrap_or_default();

            Some(ManifestEntry {
                id: item.id.unwrap_or_default(),
                path: resolve_href(base_dir, &href),
                kind: ItemKind::from_media_type(&media_type),
                media_type,
            })
        })
        .collect();

    Ok(entries)
}

/// Resolve a manifest href to a zip entry path
///
/// Strips fragments, percent-decodes and normalizes `.`/`..` segments.
fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or_default();
    let decoded = urlencoding::decode(href)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| href.to_string());

    let mut parts: Vec<&str> = if decoded.starts_with('/') {
        Vec::new()
    } else {
        base_dir.split('/').filter(|s| !s.is_empty()).collect()
    };

    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }

    parts.join("/")
}

// container.xml structures for deserialization

#[derive(Debug, Deserialize)]
struct Container {
    #[serde(default)]
    rootfiles: Option<RootFiles>,
}

#[derive(Debug, Deserialize)]
struct RootFiles {
    #[serde(rename = "rootfile", default)]
    rootfile: Vec<RootFile>,
}

#[derive(Debug, Deserialize)]
struct RootFile {
    #[serde(rename = "@full-path", default)]
    full_path: Option<String>,

    #[serde(rename = "@media-type", default)]
    media_type: Option<String>,
}

// Package document structures for deserialization

#[derive(Debug, Deserialize)]
struct OpfPackage {
    #[serde(default)]
    manifest: Option<OpfManifest>,
}

#[derive(Debug, Deserialize)]
struct OpfManifest {
    #[serde(rename = "item", default)]
    item: Vec<OpfManifestItem>,
}

#[derive(Debug, Deserialize)]
struct OpfManifestItem {
    #[serde(rename = "@id", default)]
    id: Option<String>,

    #[serde(rename = "@href", default)]
    href: Option<String>,

    #[serde(rename = "@media-type", default)]
    media_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{png_bytes, EpubBuilder};

    fn collect(archive: &mut EpubArchive) -> Vec<SourceItem> {
        archive.items().collect::<Result<Vec<_>, _>>().unwrap()
    }

    #[test]
    fn test_items_in_manifest_order() {
        let png = png_bytes(2, 2);
        let epub = EpubBuilder::new()
            .document("ch1.xhtml", "<p>One</p>")
            .image("images/fig.png", "image/png", &png)
            .item("style.css", "text/css", b"p {}")
            .document("ch2.xhtml", "<p>Two</p>")
            .build();

        let mut archive = EpubArchive::from_bytes(epub).unwrap();
        assert_eq!(archive.package_path(), "OEBPS/content.opf");

        let items = collect(&mut archive);
        let summary: Vec<(ItemKind, &str)> =
            items.iter().map(|i| (i.kind, i.path.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (ItemKind::Document, "OEBPS/ch1.xhtml"),
                (ItemKind::Image, "OEBPS/images/fig.png"),
                (ItemKind::Other, "OEBPS/style.css"),
                (ItemKind::Document, "OEBPS/ch2.xhtml"),
            ]
        );
        assert_eq!(items[1].data, png);
    }

    #[test]
    fn test_kind_ignores_extension() {
        let epub = EpubBuilder::new()
            .item("chapter.html", "image/png", b"<p>not really an image</p>")
            .item("picture.png", "application/xhtml+xml", b"<p>not really a picture</p>")
            .build();

        let mut archive = EpubArchive::from_bytes(epub).unwrap();
        let kinds: Vec<ItemKind> = collect(&mut archive).iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![ItemKind::Image, ItemKind::Document]);
    }

    #[test]
    fn test_missing_entry_is_skipped() {
        let epub = EpubBuilder::new()
            .missing("gone.xhtml", "application/xhtml+xml")
            .document("here.xhtml", "<p>Here</p>")
            .build();

        let mut archive = EpubArchive::from_bytes(epub).unwrap();
        assert_eq!(archive.manifest().len(), 2);

        let items = collect(&mut archive);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, "OEBPS/here.xhtml");
    }

    #[test]
    fn test_not_a_zip() {
        let result = EpubArchive::from_bytes(b"plain text, not an archive".to_vec());
        assert!(matches!(result, Err(ArchiveError::Zip(_))));
    }

    #[test]
    fn test_missing_container() {
        let epub = EpubBuilder::new().without_container().build();
        let result = EpubArchive::from_bytes(epub);
        assert!(matches!(result, Err(ArchiveError::MissingContainer)));
    }

    #[test]
    fn test_missing_manifest() {
        let epub = EpubBuilder::new()
            .package_override(r#"<?xml version="1.0"?><package xmlns="http://www.idpf.org/2007/opf" version="3.0"><metadata/></package>"#)
            .build();
        let result = EpubArchive::from_bytes(epub);
        assert!(matches!(result, Err(ArchiveError::MissingManifest)));
    }

    #[test]
    fn test_malformed_package() {
        let epub = EpubBuilder::new()
            .package_override("<package><manifest></spine></package>")
            .build();
        let result = EpubArchive::from_bytes(epub);
        assert!(matches!(result, Err(ArchiveError::Xml { .. })));
    }

    #[test]
    fn test_package_path() {
        let xml = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="OPS/package.opf" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#;
        assert_eq!(package_path(xml).unwrap(), "OPS/package.opf");

        let empty = r#"<container><rootfiles/></container>"#;
        assert!(matches!(package_path(empty), Err(ArchiveError::NoRootfile)));
    }

    #[test]
    fn test_resolve_href() {
        assert_eq!(resolve_href("OEBPS", "text/ch1.xhtml"), "OEBPS/text/ch1.xhtml");
        assert_eq!(resolve_href("OEBPS/text", "../images/a.png"), "OEBPS/images/a.png");
        assert_eq!(resolve_href("", "./ch1.xhtml#sec2"), "ch1.xhtml");
        assert_eq!(resolve_href("OEBPS", "My%20Chapter.xhtml"), "OEBPS/My Chapter.xhtml");
        assert_eq!(resolve_href("OEBPS", "/root.xhtml"), "root.xhtml");
    }
}

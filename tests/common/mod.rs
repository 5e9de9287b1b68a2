//! Shared helpers for HTTP tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;

use ab_glyph::{Font, FontRef};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use image::{ImageFormat, Rgb, RgbImage};
use lopdf::content::Content;
use lopdf::{Document, Object};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use epub_pdf_server::config::Config;
use epub_pdf_server::pdf::BODY_FONT;
use epub_pdf_server::ocr::{OcrError, OcrProvider, OcrProviderTrait, OcrResult, OcrService};
use epub_pdf_server::routes;
use epub_pdf_server::state::AppState;

const BOUNDARY: &str = "----epub-pdf-test-boundary";

/// OCR stand-in returning fixed text
pub struct FixedOcr(pub &'static str);

#[async_trait]
impl OcrProviderTrait for FixedOcr {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Tesseract
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn recognize(&self, _image_data: &[u8], _language: Option<&str>) -> Result<OcrResult, OcrError> {
        Ok(OcrResult {
            text: self.0.to_string(),
            provider: OcrProvider::Tesseract,
        })
    }
}

/// Router over a fresh temp workspace
pub struct TestApp {
    pub router: Router,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn new(ocr_text: &'static str) -> Self {
        let dir = TempDir::new().expect("temp dir");

        let mut config = Config::default();
        config.storage.upload_dir = dir.path().join("uploads");
        config.storage.output_dir = dir.path().join("output");

        let ocr = OcrService::with_providers("eng", vec![Arc::new(FixedOcr(ocr_text))]);
        let state = AppState::with_ocr_service(config, ocr)
            .await
            .expect("app state");

        Self {
            router: routes::app(state),
            dir,
        }
    }

    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn output_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("output")
    }
}

pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).expect("read dir").count()
}

/// Multipart request carrying one field
pub fn upload_request(field: &str, filename: Option<&str>, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    match filename {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, name
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n", field).as_bytes(),
        ),
    }
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/convert")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("request")
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

/// Minimal EPUB with the given `(href, media type, content)` items in
/// manifest order
pub fn epub(items: &[(&str, &str, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default();

    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();

    zip.start_file("META-INF/container.xml", deflated).unwrap();
    zip.write_all(
        br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
    )
    .unwrap();

    let manifest: String = items
        .iter()
        .enumerate()
        .map(|(i, (href, media_type, _))| {
            format!(r#"<item id="i{}" href="{}" media-type="{}"/>"#, i, href, media_type)
        })
        .collect();
    let package = format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>T</dc:title></metadata>
  <manifest>{}</manifest>
  <spine/>
</package>"#,
        manifest
    );
    zip.start_file("OEBPS/content.opf", deflated).unwrap();
    zip.write_all(package.as_bytes()).unwrap();

    for (href, _, data) in items {
        zip.start_file(format!("OEBPS/{}", href), deflated).unwrap();
        zip.write_all(data).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

pub fn xhtml(body: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><html xmlns="http://www.w3.org/1999/xhtml"><head><title>c</title></head><body>{}</body></html>"#,
        body
    )
    .into_bytes()
}

/// Text of every text section (`BT` .. `ET`), in page order, with all
/// whitespace removed
///
/// Glyph ids written against the embedded body font are mapped back to
/// characters through the font's cmap.
pub fn pdf_text(pdf: &[u8]) -> Vec<String> {
    let font = FontRef::try_from_slice(BODY_FONT).expect("body font");
    let chars: HashMap<u16, char> = font
        .codepoint_ids()
        .map(|(glyph, c)| (glyph.0, c))
        .collect();

    let doc = Document::load_mem(pdf).expect("load pdf");
    let mut texts = Vec::new();
    for page_id in doc.get_pages().into_values() {
        let data = doc.get_page_content(page_id).expect("page content");
        let content = Content::decode(&data).expect("decode content");

        let mut current = String::new();
        for op in content.operations {
            match op.operator.as_str() {
                "BT" => current.clear(),
                "ET" => {
                    if !current.is_empty() {
                        texts.push(std::mem::take(&mut current));
                    }
                }
                "Tj" | "TJ" => {
                    for operand in &op.operands {
                        collect_glyphs(operand, &chars, &mut current);
                    }
                }
                _ => {}
            }
        }
    }
    texts
}

fn collect_glyphs(operand: &Object, chars: &HashMap<u16, char>, out: &mut String) {
    match operand {
        Object::Array(items) => {
            for item in items {
                collect_glyphs(item, chars, out);
            }
        }
        Object::String(bytes, _) => {
            for pair in bytes.chunks_exact(2) {
                let glyph = u16::from_be_bytes([pair[0], pair[1]]);
                let c = chars.get(&glyph).copied().unwrap_or('\u{fffd}');
                if !c.is_whitespace() {
                    out.push(c);
                }
            }
        }
        _ => {}
    }
}

/// Expected `pdf_text` output for the given lines
pub fn lines(expected: &[&str]) -> Vec<String> {
    expected
        .iter()
        .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect())
        .collect()
}

/// Number of image draws across all pages
pub fn pdf_image_count(pdf: &[u8]) -> usize {
    let doc = Document::load_mem(pdf).expect("load pdf");
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let data = doc.get_page_content(page_id).expect("page content");
            Content::decode(&data)
                .expect("decode content")
                .operations
                .iter()
                .filter(|op| op.operator == "Do")
                .count()
        })
        .sum()
}

//! Fixtures shared by unit tests

use std::io::{Cursor, Write};

use image::{ImageFormat, Rgb, RgbImage};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Encode a solid PNG of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 60, 90]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

struct Entry {
    href: String,
    media_type: String,
    data: Option<Vec<u8>>,
}

/// Builds EPUB archives in memory, with every item under `OEBPS/`
pub struct EpubBuilder {
    entries: Vec<Entry>,
    container: bool,
    package: Option<String>,
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            container: true,
            package: None,
        }
    }

    /// XHTML document wrapping `body`
    pub fn document(self, href: &str, body: &str) -> Self {
        let xhtml = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Chapter</title></head>
<body>{}</body></html>"#,
            body
        );
        self.item(href, "application/xhtml+xml", xhtml.as_bytes())
    }

    pub fn image(self, href: &str, media_type: &str, data: &[u8]) -> Self {
        self.item(href, media_type, data)
    }

    pub fn item(mut self, href: &str, media_type: &str, data: &[u8]) -> Self {
        self.entries.push(Entry {
            href: href.to_string(),
            media_type: media_type.to_string(),
            data: Some(data.to_vec()),
        });
        self
    }

    /// Declared in the manifest but not stored in the zip
    pub fn missing(mut self, href: &str, media_type: &str) -> Self {
        self.entries.push(Entry {
            href: href.to_string(),
            media_type: media_type.to_string(),
            data: None,
        });
        self
    }

    pub fn without_container(mut self) -> Self {
        self.container = false;
        self
    }

    /// Replace the generated package document
    pub fn package_override(mut self, xml: &str) -> Self {
        self.package = Some(xml.to_string());
        self
    }

    fn package_xml(&self) -> String {
        let mut manifest = String::new();
        let mut spine = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            manifest.push_str(&format!(
                r#"<item id="item{}" href="{}" media-type="{}"/>"#,
                i, entry.href, entry.media_type
            ));
            if entry.media_type == "application/xhtml+xml" {
                spine.push_str(&format!(r#"<itemref idref="item{}"/>"#, i));
            }
        }

        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="id">urn:uuid:test</dc:identifier>
    <dc:title>Test Book</dc:title>
  </metadata>
  <manifest>{}</manifest>
  <spine>{}</spine>
</package>"#,
            manifest, spine
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default();

        zip.start_file("mimetype", stored).expect("mimetype");
        zip.write_all(b"application/epub+zip").expect("mimetype");

        if self.container {
            zip.start_file("META-INF/container.xml", deflated).expect("container");
            zip.write_all(
                br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
            )
            .expect("container");
        }

        let package = self.package.clone().unwrap_or_else(|| self.package_xml());
        zip.start_file("OEBPS/content.opf", deflated).expect("package");
        zip.write_all(package.as_bytes()).expect("package");

        for entry in &self.entries {
            if let Some(data) = &entry.data {
                zip.start_file(format!("OEBPS/{}", entry.href), deflated)
                    .expect("entry");
                zip.write_all(data).expect("entry");
            }
        }

        zip.finish().expect("finish").into_inner()
    }
}

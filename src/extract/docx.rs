//! DOCX extraction: document-body text plus `word/media/` images.
//!
//! A DOCX file is a ZIP archive of XML parts. Text lives in
//! `word/document.xml` as `<w:t>` runs grouped into `<w:p>` paragraphs;
//! embedded pictures live as opaque files under `word/media/`. The two
//! concerns read the same archive independently: the text pass streams one
//! XML entry, the image pass enumerates entry names.
//!
//! Image order is the archive's enumeration order, which is not guaranteed
//! to match the images' visual position in the rendered document. This is
//! inherited behaviour that downstream consumers may rely on; do not
//! re-sort.

use crate::error::HarvestError;
use crate::extract::{ExtractedImage, ExtractionResult, ImageFormat};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::io::{BufReader, Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

const MEDIA_PREFIX: &str = "word/media/";

/// Extract text and images from a buffered DOCX document.
pub fn extract(bytes: &[u8]) -> Result<ExtractionResult, HarvestError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| HarvestError::Extraction {
        detail: format!("not a DOCX archive: {e}"),
    })?;

    let text = extract_document_text(&mut archive)?;
    let images = extract_media_images(&mut archive)?;

    debug!(
        "DOCX extracted: {} chars of text, {} image(s)",
        text.len(),
        images.len()
    );
    Ok(ExtractionResult { text, images })
}

/// Stream `word/document.xml`, flattening runs into paragraph text.
///
/// Paragraphs are joined with blank lines; explicit breaks (`<w:br>`,
/// `<w:cr>`) become newlines and `<w:tab>` becomes a tab, matching what a
/// flat document-text dump of the same file produces.
fn extract_document_text(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
) -> Result<String, HarvestError> {
    let document = archive
        .by_name("word/document.xml")
        .map_err(|e| HarvestError::Extraction {
            detail: format!("missing word/document.xml: {e}"),
        })?;

    let mut reader = Reader::from_reader(BufReader::new(document));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::with_capacity(1024);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    if let Ok(text) = e.unescape() {
                        current.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(HarvestError::Extraction {
                    detail: format!("malformed word/document.xml: {e}"),
                })
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n\n"))
}

/// Enumerate archive entries and collect `word/media/*.{jpeg,png}` blobs.
///
/// The entry's own extension decides the published format; anything else
/// under `word/media/` (emf, wmf, gif, …) is skipped, matching the
/// original upload contract.
fn extract_media_images(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
) -> Result<Vec<ExtractedImage>, HarvestError> {
    let mut images = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| HarvestError::Extraction {
            detail: format!("unreadable archive entry #{index}: {e}"),
        })?;
        let name = entry.name().to_string();

        if !name.starts_with(MEDIA_PREFIX) {
            continue;
        }
        let Some(format) = name
            .rsplit('.')
            .next()
            .filter(|_| name.ends_with(".jpeg") || name.ends_with(".png"))
            .and_then(ImageFormat::from_extension)
        else {
            continue;
        };

        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| HarvestError::Extraction {
                detail: format!("failed reading {name}: {e}"),
            })?;

        images.push(ExtractedImage {
            bytes: data.into(),
            format,
        });
    }

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn docx_fixture(paragraphs: &[&str], media: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
        );
        for text in paragraphs {
            xml.push_str(&format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>"));
        }
        xml.push_str("</w:body></w:document>");

        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();

        for (name, bytes) in media {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn extracts_paragraph_text() {
        let docx = docx_fixture(&["First paragraph.", "Second paragraph."], &[]);
        let result = extract(&docx).expect("extraction should succeed");
        assert_eq!(result.text, "First paragraph.\n\nSecond paragraph.");
        assert!(result.images.is_empty());
    }

    #[test]
    fn collects_media_images_in_enumeration_order() {
        let docx = docx_fixture(
            &["Body."],
            &[
                ("word/media/image1.png", b"png-bytes-1"),
                ("word/media/image2.jpeg", b"jpeg-bytes-2"),
                ("word/media/chart.gif", b"ignored"),
                ("word/fonts/font1.odttf", b"ignored"),
            ],
        );
        let result = extract(&docx).expect("extraction should succeed");

        assert_eq!(result.images.len(), 2);
        assert_eq!(result.images[0].format, ImageFormat::Png);
        assert_eq!(&result.images[0].bytes[..], b"png-bytes-1");
        assert_eq!(result.images[1].format, ImageFormat::Jpeg);
        assert_eq!(&result.images[1].bytes[..], b"jpeg-bytes-2");
    }

    #[test]
    fn document_with_no_text_yields_empty_string() {
        let docx = docx_fixture(&[], &[("word/media/image1.png", b"blob")]);
        let result = extract(&docx).expect("extraction should succeed");
        assert_eq!(result.text, "");
        assert_eq!(result.images.len(), 1);
    }

    #[test]
    fn garbage_bytes_fail_extraction() {
        let err = extract(b"this is not a zip archive").unwrap_err();
        assert!(matches!(err, HarvestError::Extraction { .. }));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn archive_without_document_xml_fails() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/media/image1.png", FileOptions::default())
            .unwrap();
        writer.write_all(b"blob").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = extract(&bytes).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }
}

//! PDF extraction: per-page text plus page-ordered embedded images.
//!
//! ## Why two libraries?
//!
//! `pdf-extract` does the hard part of text extraction — positioning,
//! encoding tables, standard fonts — and yields one string per page in page
//! order. It has no image API, so embedded rasters come from walking the
//! document's object graph with `lopdf`: each page's `XObject` resources
//! are resolved and every `/Subtype /Image` stream is collected in
//! declaration order.
//!
//! ## Image bytes and the PNG label
//!
//! An image stream's content is its *native embedded form*: raw samples
//! behind a generic compressor (FlateDecode — decompressed here), or a
//! self-contained image codec payload (DCTDecode/JPXDecode — passed through
//! untouched). The publisher labels every PDF image `png` regardless of the
//! embedded format. That is a deliberate simplification of the output
//! contract, not a conversion guarantee — consumers that care about true
//! formats must sniff the bytes.

use crate::error::HarvestError;
use crate::extract::{ExtractedImage, ExtractionResult, ImageFormat};
use lopdf::{Dictionary, Document, Object};
use tracing::debug;

/// Extract text and images from a buffered PDF document.
pub fn extract(bytes: &[u8]) -> Result<ExtractionResult, HarvestError> {
    let text = extract_pages_text(bytes)?;
    let images = extract_page_images(bytes)?;

    debug!(
        "PDF extracted: {} chars of text, {} image(s)",
        text.len(),
        images.len()
    );
    Ok(ExtractionResult { text, images })
}

/// Per-page text in page order, non-empty pages joined with newlines.
fn extract_pages_text(bytes: &[u8]) -> Result<String, HarvestError> {
    let pages =
        pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| HarvestError::Extraction {
            detail: format!("PDF text extraction failed: {e}"),
        })?;

    let mut text = String::new();
    for page in pages {
        if !page.trim().is_empty() {
            text.push_str(&page);
            text.push('\n');
        }
    }
    Ok(text)
}

/// Walk pages in page order and collect every image XObject's bytes.
fn extract_page_images(bytes: &[u8]) -> Result<Vec<ExtractedImage>, HarvestError> {
    let doc = Document::load_mem(bytes).map_err(|e| HarvestError::Extraction {
        detail: format!("PDF parse failed: {e}"),
    })?;

    let mut images = Vec::new();
    for (page_num, page_id) in doc.get_pages() {
        let Some(resources) = page_resources(&doc, page_id) else {
            continue;
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            continue;
        };
        let Some(xobjects) = resolve_dict(&doc, xobjects) else {
            continue;
        };

        for (name, value) in xobjects.iter() {
            let stream = match resolve(&doc, value).and_then(|o| o.as_stream().ok()) {
                Some(s) => s,
                None => {
                    return Err(HarvestError::Extraction {
                        detail: format!(
                            "unresolvable XObject {} on page {page_num}",
                            String::from_utf8_lossy(name)
                        ),
                    })
                }
            };

            let is_image = matches!(
                stream.dict.get(b"Subtype"),
                Ok(Object::Name(subtype)) if subtype.as_slice() == b"Image"
            );
            if !is_image {
                continue;
            }

            // Generic compression comes off; image-codec payloads
            // (DCTDecode, JPXDecode) stay in their native encoded form.
            let content = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());

            images.push(ExtractedImage {
                bytes: content.into(),
                format: ImageFormat::Png,
            });
        }
    }

    Ok(images)
}

/// Find a page's `Resources` dictionary, following the `Parent` chain for
/// inherited resources. Bounded to keep a cyclic document from looping.
fn page_resources(doc: &Document, page_id: lopdf::ObjectId) -> Option<&Dictionary> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..32 {
        if let Ok(resources) = current.get(b"Resources") {
            return resolve_dict(doc, resources);
        }
        let parent = current.get(b"Parent").ok()?;
        current = resolve(doc, parent)?.as_dict().ok()?;
    }
    None
}

/// Follow one level of indirection if `obj` is a reference.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Resolve an object (direct or referenced) down to a dictionary.
fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, obj)?.as_dict().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};

    /// Build a PDF with one text page per entry of `pages`, plus `images`
    /// raw-RGB image XObjects attached to the first page.
    fn pdf_fixture(pages: &[&str], images: &[&[u8]]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });

        let mut xobject_dict = Dictionary::new();
        for (index, data) in images.iter().enumerate() {
            let stream_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 2,
                    "Height" => 2,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                data.to_vec(),
            ));
            xobject_dict.set(format!("Im{}", index + 1), Object::Reference(stream_id));
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => xobject_dict,
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut std::io::Cursor::new(&mut buf)).unwrap();
        buf
    }

    #[test]
    fn extracts_text_from_each_page() {
        let pdf = pdf_fixture(&["Hello first page", "World second page"], &[]);
        let result = extract(&pdf).expect("extraction should succeed");

        assert!(result.text.contains("Hello first page"), "got: {}", result.text);
        assert!(result.text.contains("World second page"), "got: {}", result.text);
        let hello = result.text.find("Hello").unwrap();
        let world = result.text.find("World").unwrap();
        assert!(hello < world, "pages must stay in page order");
        assert!(result.images.is_empty());
    }

    #[test]
    fn collects_image_xobjects_as_png_labelled() {
        let raw_a: &[u8] = &[10u8; 12];
        let raw_b: &[u8] = &[20u8; 12];
        let pdf = pdf_fixture(&["Page with pictures"], &[raw_a, raw_b]);

        let result = extract(&pdf).expect("extraction should succeed");
        assert_eq!(result.images.len(), 2);
        for image in &result.images {
            assert_eq!(image.format, ImageFormat::Png);
        }
        assert_eq!(&result.images[0].bytes[..], raw_a);
        assert_eq!(&result.images[1].bytes[..], raw_b);
    }

    #[test]
    fn garbage_bytes_fail_extraction() {
        let err = extract(b"%PDF-not really").unwrap_err();
        assert!(matches!(err, HarvestError::Extraction { .. }));
    }
}

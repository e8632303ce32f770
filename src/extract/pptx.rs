//! PPTX extraction: slide text with slide-number prefixes, plus picture
//! blobs resolved through slide relationships.
//!
//! A PPTX file is a ZIP archive with one XML part per slide
//! (`ppt/slides/slide1.xml`, `slide2.xml`, …). Shape text lives in `<a:t>`
//! runs inside a shape's `<p:txBody>`; pictures are `<p:pic>` shapes whose
//! `<a:blip r:embed="…">` points through the slide's `.rels` part at a
//! `ppt/media/` entry.
//!
//! One opened archive serves both concerns: each slide's XML is parsed
//! exactly once into its text shapes and its picture relationships, and the
//! media blobs are read afterwards. Picture bytes are sniffed with the
//! `image` crate to determine their true format — the media entry's
//! extension is not trusted.
//!
//! Emission order for both text and images is slide order, then shape
//! order within the slide.

use crate::error::HarvestError;
use crate::extract::{ExtractedImage, ExtractionResult, ImageFormat};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::io::{BufReader, Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

/// Extract text and images from a buffered PPTX document.
pub fn extract(bytes: &[u8]) -> Result<ExtractionResult, HarvestError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| HarvestError::Extraction {
        detail: format!("not a PPTX archive: {e}"),
    })?;

    let mut text = String::new();
    let mut images = Vec::new();

    // Slides are numbered from 1 with no gaps; probing by name avoids a
    // full entry scan and keeps slides in presentation order.
    let mut slide_num = 1;
    loop {
        let slide_name = format!("ppt/slides/slide{slide_num}.xml");
        if archive.by_name(&slide_name).is_err() {
            break;
        }

        let slide = parse_slide(&mut archive, &slide_name)?;

        for shape_text in &slide.shape_texts {
            text.push_str(&format!("Slide {slide_num}: {shape_text}\n"));
        }

        if !slide.picture_rels.is_empty() {
            let rels = parse_slide_rels(&mut archive, slide_num)?;
            for rel_id in &slide.picture_rels {
                let target = rels.get(rel_id).ok_or_else(|| HarvestError::Extraction {
                    detail: format!("slide {slide_num}: unresolved relationship {rel_id}"),
                })?;
                images.push(read_picture(&mut archive, slide_num, target)?);
            }
        }

        slide_num += 1;
    }

    debug!(
        "PPTX extracted: {} slide(s), {} chars of text, {} image(s)",
        slide_num - 1,
        text.len(),
        images.len()
    );
    Ok(ExtractionResult { text, images })
}

/// One slide's content, in shape traversal order.
struct SlideContent {
    /// Text of every top-level shape that carries a text body, empty
    /// strings included — an empty text frame still produces a line.
    shape_texts: Vec<String>,
    /// `r:embed` relationship ids of every top-level picture shape.
    picture_rels: Vec<String>,
}

/// Parse one slide part into its text shapes and picture relationships.
///
/// Shapes nested inside group shapes (`<p:grpSp>`) are skipped; only
/// top-level shapes contribute, matching the slide's shape collection.
fn parse_slide(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    slide_name: &str,
) -> Result<SlideContent, HarvestError> {
    let entry = archive.by_name(slide_name).map_err(|e| HarvestError::Extraction {
        detail: format!("missing {slide_name}: {e}"),
    })?;

    let mut reader = Reader::from_reader(BufReader::new(entry));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::with_capacity(1024);
    let mut content = SlideContent {
        shape_texts: Vec::new(),
        picture_rels: Vec::new(),
    };

    let mut group_depth: u32 = 0;
    let mut in_shape = false;
    let mut in_tx_body = false;
    let mut has_tx_body = false;
    let mut in_text = false;
    let mut in_pic = false;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current_para = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"grpSp" => group_depth += 1,
                b"sp" if group_depth == 0 => {
                    in_shape = true;
                    has_tx_body = false;
                    paragraphs.clear();
                }
                b"txBody" if in_shape => {
                    in_tx_body = true;
                    has_tx_body = true;
                }
                b"p" if in_tx_body => current_para.clear(),
                b"t" if in_tx_body => in_text = true,
                b"pic" if group_depth == 0 => in_pic = true,
                b"blip" if in_pic => {
                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        if attr.key.local_name().as_ref() == b"embed" {
                            content
                                .picture_rels
                                .push(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    if let Ok(text) = e.unescape() {
                        current_para.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"grpSp" => group_depth = group_depth.saturating_sub(1),
                b"t" => in_text = false,
                b"p" if in_tx_body => paragraphs.push(std::mem::take(&mut current_para)),
                b"txBody" => in_tx_body = false,
                b"pic" => in_pic = false,
                b"sp" if group_depth == 0 && in_shape => {
                    if has_tx_body {
                        content.shape_texts.push(paragraphs.join("\n"));
                    }
                    in_shape = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(HarvestError::Extraction {
                    detail: format!("malformed {slide_name}: {e}"),
                })
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(content)
}

/// Parse a slide's `.rels` part into a relationship-id → target map.
fn parse_slide_rels(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    slide_num: usize,
) -> Result<HashMap<String, String>, HarvestError> {
    let rels_name = format!("ppt/slides/_rels/slide{slide_num}.xml.rels");
    let entry = archive.by_name(&rels_name).map_err(|e| HarvestError::Extraction {
        detail: format!("missing {rels_name}: {e}"),
    })?;

    let mut reader = Reader::from_reader(BufReader::new(entry));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::with_capacity(512);
    let mut rels = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id = None;
                    let mut target = None;
                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        match attr.key.local_name().as_ref() {
                            b"Id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                            b"Target" => {
                                target = Some(String::from_utf8_lossy(&attr.value).to_string())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(target)) = (id, target) {
                        rels.insert(id, target);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(HarvestError::Extraction {
                    detail: format!("malformed {rels_name}: {e}"),
                })
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Read a picture's media entry and sniff its true format.
fn read_picture(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    slide_num: usize,
    target: &str,
) -> Result<ExtractedImage, HarvestError> {
    let part_name = resolve_target(target);
    let mut entry = archive.by_name(&part_name).map_err(|e| HarvestError::Extraction {
        detail: format!("slide {slide_num}: missing media part {part_name}: {e}"),
    })?;

    let mut data = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut data)
        .map_err(|e| HarvestError::Extraction {
            detail: format!("failed reading {part_name}: {e}"),
        })?;

    let sniffed = image::guess_format(&data).ok().and_then(ImageFormat::from_sniff);
    let format = sniffed.ok_or_else(|| HarvestError::Extraction {
        detail: format!("slide {slide_num}: unrecognised image format in {part_name}"),
    })?;

    Ok(ExtractedImage {
        bytes: data.into(),
        format,
    })
}

/// Resolve a relationship target (relative to `ppt/slides/`) to a part name.
fn resolve_target(target: &str) -> String {
    if let Some(rest) = target.strip_prefix("../") {
        format!("ppt/{rest}")
    } else if let Some(rest) = target.strip_prefix('/') {
        rest.to_string()
    } else {
        format!("ppt/slides/{target}")
    }
}

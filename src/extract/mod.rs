//! Format-specific extraction: one document in, text plus ordered images out.
//!
//! Each submodule handles exactly one format and shares the same output
//! contract, [`ExtractionResult`]. Keeping the formats separate makes each
//! independently testable and lets us swap a parsing backend without
//! touching the other two.
//!
//! ## Data Flow
//!
//! ```text
//! bytes ──▶ docx │ pdf │ pptx ──▶ ExtractionResult { text, images }
//!           (zip+xml) (pdf-extract+lopdf) (zip+xml+image)
//! ```
//!
//! Extraction is synchronous and CPU-bound; the handlers run it under
//! `tokio::task::spawn_blocking`. Any parsing failure aborts the whole
//! invocation — there is no partial output.

pub mod docx;
pub mod pdf;
pub mod pptx;

use crate::error::HarvestError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The transient product of one extraction: the document's concatenated
/// text and its embedded raster images, in a fixed order.
///
/// Never persisted as a unit — the publisher writes its parts as separate
/// objects.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// UTF-8 text, newline-joined per logical unit (paragraph, page, or
    /// slide shape depending on the format). May be empty.
    pub text: String,
    /// Embedded images in the order the format's traversal yields them.
    pub images: Vec<ExtractedImage>,
}

/// One embedded image: opaque bytes plus the format used for its key
/// extension and content type.
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    pub bytes: Bytes,
    pub format: ImageFormat,
}

/// Raster image formats this crate labels on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Lower-case extension used in derived object keys.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
        }
    }

    /// Content type for the published object: `image/<extension>`.
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
        }
    }

    /// Map an archive-entry extension (case-insensitive) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "bmp" => Some(ImageFormat::Bmp),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            _ => None,
        }
    }

    /// Map a sniffed [`image::ImageFormat`] to a format we label.
    pub fn from_sniff(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            image::ImageFormat::Gif => Some(ImageFormat::Gif),
            image::ImageFormat::Bmp => Some(ImageFormat::Bmp),
            image::ImageFormat::Tiff => Some(ImageFormat::Tiff),
            _ => None,
        }
    }
}

/// The three supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Docx,
    Pdf,
    Pptx,
}

impl DocumentKind {
    /// The source-key extension for this format, including the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Docx => ".docx",
            DocumentKind::Pdf => ".pdf",
            DocumentKind::Pptx => ".pptx",
        }
    }

    /// Infer the format from a key's extension (case-insensitive).
    pub fn from_key(key: &str) -> Option<Self> {
        let lower = key.to_ascii_lowercase();
        if lower.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else if lower.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if lower.ends_with(".pptx") {
            Some(DocumentKind::Pptx)
        } else {
            None
        }
    }

    /// Run the format's extractor over a buffered document.
    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractionResult, HarvestError> {
        match self {
            DocumentKind::Docx => docx::extract(bytes),
            DocumentKind::Pdf => pdf::extract(bytes),
            DocumentKind::Pptx => pptx::extract(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_round_trip() {
        assert_eq!(DocumentKind::from_key("Report A.docx"), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_key("SPEC.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_key("deck.pptx"), Some(DocumentKind::Pptx));
        assert_eq!(DocumentKind::from_key("notes.txt"), None);
    }

    #[test]
    fn image_format_labels() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::Jpeg.content_type(), "image/jpeg");
        assert_eq!(ImageFormat::Png.extension(), "png");
        assert_eq!(ImageFormat::from_extension("svg"), None);
    }
}

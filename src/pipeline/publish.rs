//! Publish stage: derived keys, destination resolution, sequential writes.
//!
//! ## The naming contract
//!
//! This module owns the only real contract in the system. For a decoded
//! source key `<stem><ext>`:
//!
//! * the text object is `<stem>.txt`, content type `text/plain`, written
//!   exactly once per invocation even when the text is empty;
//! * image `k` (1-based) is `<stem>_image_<k padded>.<image ext>`, where
//!   the padding width is the digit count of the document's *total* image
//!   count — a 5-image document uses `_image_1`, a 12-image document uses
//!   `_image_01`.
//!
//! Images are published sequentially in extraction order. That is a
//! correctness requirement, not a performance choice: the index and its
//! padding depend on the total count, which must be final before the first
//! write, and deterministic key assignment requires a fixed order.
//!
//! Writes are independent and non-transactional. A failure partway through
//! the image loop leaves the text object and earlier images in place;
//! there is no rollback and no cleanup.

use crate::error::HarvestError;
use crate::extract::{DocumentKind, ExtractionResult};
use crate::output::PublishSummary;
use crate::storage::ObjectStore;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

/// Fixed destination for the PDF and PPTX pipelines, and for recognised
/// DOCX uploads.
const EXTRACTED_BUCKET: &str = "extractedtextimage";

/// Resolve the destination bucket for a pipeline invocation.
///
/// Only the DOCX pipeline routes by source bucket; PDF and PPTX always
/// publish to the fixed destination.
pub fn resolve_destination(
    kind: DocumentKind,
    source_bucket: &str,
) -> Result<&'static str, HarvestError> {
    match kind {
        DocumentKind::Docx => match source_bucket {
            "disclosurefileupload" => Ok(EXTRACTED_BUCKET),
            "priortartfileupload" => Ok("priorartextractedbucket"),
            _ => Err(HarvestError::UnexpectedSourceBucket {
                bucket: source_bucket.to_string(),
            }),
        },
        DocumentKind::Pdf | DocumentKind::Pptx => Ok(EXTRACTED_BUCKET),
    }
}

/// Digits needed to zero-pad indices for `total` images.
///
/// Derived from the current document's count, never a global constant.
/// `total = 0` still yields 1 — the loop below never runs then, but the
/// computation must not fail on imageless documents.
pub fn padding_width(total: usize) -> usize {
    total.to_string().len()
}

/// Strip the format extension from a decoded key.
///
/// A key that unexpectedly lacks the extension is used as-is — the derived
/// keys then append to the full source key rather than failing the
/// invocation.
fn key_stem<'a>(decoded_key: &'a str, kind: DocumentKind) -> &'a str {
    decoded_key
        .strip_suffix(kind.extension())
        .unwrap_or(decoded_key)
}

/// Key of the text object: stem plus `.txt`.
pub fn text_key(decoded_key: &str, kind: DocumentKind) -> String {
    format!("{}.txt", key_stem(decoded_key, kind))
}

/// Key of image `index` (1-based) out of `total`.
pub fn image_key(
    decoded_key: &str,
    kind: DocumentKind,
    index: usize,
    total: usize,
    extension: &str,
) -> String {
    let width = padding_width(total);
    format!(
        "{}_image_{index:0width$}.{extension}",
        key_stem(decoded_key, kind)
    )
}

/// Write one extraction's text and images to the destination bucket.
pub async fn publish(
    store: &Arc<dyn ObjectStore>,
    destination: &str,
    decoded_key: &str,
    kind: DocumentKind,
    extraction: ExtractionResult,
) -> Result<PublishSummary, HarvestError> {
    let text_key = text_key(decoded_key, kind);
    let text_bytes = Bytes::from(extraction.text.into_bytes());
    let mut bytes_written = text_bytes.len();

    // Empty text still produces an empty object, never a skipped write.
    store
        .put(destination, &text_key, text_bytes, "text/plain")
        .await?;
    debug!("Published text object {destination}/{text_key}");

    let total = extraction.images.len();
    let mut image_keys = Vec::with_capacity(total);

    for (index, image) in extraction.images.into_iter().enumerate() {
        let key = image_key(
            decoded_key,
            kind,
            index + 1,
            total,
            image.format.extension(),
        );
        bytes_written += image.bytes.len();
        store
            .put(destination, &key, image.bytes, image.format.content_type())
            .await?;
        debug!("Published image object {destination}/{key}");
        image_keys.push(key);
    }

    info!(
        "Published {} object(s) to {destination} ({bytes_written} bytes)",
        image_keys.len() + 1
    );

    Ok(PublishSummary {
        destination_bucket: destination.to_string(),
        text_key,
        image_keys,
        bytes_written,
    })
}

//! Error types for the docharvest library.
//!
//! One enum covers every failure mode of an invocation. The variants map
//! onto the three-way response contract:
//!
//! * [`HarvestError::NotFound`] — the source object is absent; reported as
//!   HTTP-style 404.
//! * Everything else — configuration, extraction, or storage faults; all
//!   collapse to 500 with the error's display string as the body.
//!
//! There is no non-fatal tier: a failure at any stage after fetch discards
//! the whole invocation's results. Objects already written by a partially
//! completed image loop are left in place; cleanup is not attempted.

use thiserror::Error;

/// All errors returned by the docharvest library.
#[derive(Debug, Error)]
pub enum HarvestError {
    // ── Event errors ──────────────────────────────────────────────────────
    /// The notification payload is missing records or required fields.
    #[error("Invalid storage event: {detail}")]
    InvalidEvent { detail: String },

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// The decoded key does not exist in the source bucket.
    #[error("File {key} not found in bucket {bucket}.")]
    NotFound { bucket: String, key: String },

    /// The source bucket has no configured destination (DOCX pipeline only).
    #[error("Unexpected source bucket: {bucket}")]
    UnexpectedSourceBucket { bucket: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The parsing library rejected the document.
    #[error("Extraction failed: {detail}")]
    Extraction { detail: String },

    // ── Storage errors ────────────────────────────────────────────────────
    /// Any read/write fault against object storage other than a missing key.
    #[error("Storage error: {detail}")]
    Storage { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HarvestError {
    /// HTTP-style status code for the invocation response.
    ///
    /// Only the missing-source case is distinguished; every other failure is
    /// a generic 500 whose body carries the display string.
    pub fn status_code(&self) -> u16 {
        match self {
            HarvestError::NotFound { .. } => 404,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let e = HarvestError::NotFound {
            bucket: "disclosurefileupload".into(),
            key: "Report A.docx".into(),
        };
        assert_eq!(e.status_code(), 404);
        let msg = e.to_string();
        assert!(msg.contains("Report A.docx"), "got: {msg}");
        assert!(msg.contains("disclosurefileupload"), "got: {msg}");
    }

    #[test]
    fn unexpected_bucket_maps_to_500() {
        let e = HarvestError::UnexpectedSourceBucket {
            bucket: "randombucket".into(),
        };
        assert_eq!(e.status_code(), 500);
        assert_eq!(e.to_string(), "Unexpected source bucket: randombucket");
    }

    #[test]
    fn extraction_display_carries_library_detail() {
        let e = HarvestError::Extraction {
            detail: "invalid Zip archive".into(),
        };
        assert_eq!(e.status_code(), 500);
        assert!(e.to_string().contains("invalid Zip archive"));
    }

    #[test]
    fn storage_maps_to_500() {
        let e = HarvestError::Storage {
            detail: "connection reset".into(),
        };
        assert_eq!(e.status_code(), 500);
    }
}

//! Caller-facing result types: what an invocation produced, and the
//! HTTP-style response surface.

use crate::error::HarvestError;
use serde::{Deserialize, Serialize};

/// What one successful invocation wrote to the destination bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSummary {
    /// Destination bucket every object landed in.
    pub destination_bucket: String,
    /// Key of the text object (always written, even for empty text).
    pub text_key: String,
    /// Keys of the image objects, in publish order.
    pub image_keys: Vec<String>,
    /// Total bytes written across all objects.
    pub bytes_written: usize,
}

/// The only external response surface: a status code plus a human-readable
/// message.
///
/// * `200` — text and images extracted and uploaded.
/// * `404` — the source object does not exist.
/// * `500` — any other failure, body carries the error's display string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    /// Collapse a pipeline result into the three-way response contract.
    pub fn from_result(result: Result<PublishSummary, HarvestError>) -> Self {
        match result {
            Ok(summary) => InvocationResponse {
                status_code: 200,
                body: format!(
                    "Text and {} image(s) extracted and uploaded successfully!",
                    summary.image_keys.len()
                ),
            },
            Err(err) => InvocationResponse {
                status_code: err.status_code(),
                body: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(images: usize) -> PublishSummary {
        PublishSummary {
            destination_bucket: "extractedtextimage".into(),
            text_key: "spec.txt".into(),
            image_keys: (1..=images).map(|i| format!("spec_image_{i}.png")).collect(),
            bytes_written: 1024,
        }
    }

    #[test]
    fn success_maps_to_200() {
        let response = InvocationResponse::from_result(Ok(summary(3)));
        assert_eq!(response.status_code, 200);
        assert!(response.body.contains("3 image(s)"));
    }

    #[test]
    fn not_found_maps_to_404_with_message() {
        let err = HarvestError::NotFound {
            bucket: "disclosurefileupload".into(),
            key: "Report A.docx".into(),
        };
        let response = InvocationResponse::from_result(Err(err));
        assert_eq!(response.status_code, 404);
        assert_eq!(
            response.body,
            "File Report A.docx not found in bucket disclosurefileupload."
        );
    }

    #[test]
    fn other_errors_map_to_500() {
        let err = HarvestError::Extraction {
            detail: "truncated stream".into(),
        };
        let response = InvocationResponse::from_result(Err(err));
        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("truncated stream"));
    }

    #[test]
    fn response_serialises_with_lambda_field_names() {
        let response = InvocationResponse {
            status_code: 200,
            body: "ok".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"statusCode\":200"), "got: {json}");
    }
}

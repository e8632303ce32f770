//! Trigger-event types: the object-storage "created" notification payload.
//!
//! ## Why decode the key here?
//!
//! Notification payloads percent-encode the object key, and encode spaces as
//! `+` (form-urlencoding). A key like `Report A.docx` therefore arrives as
//! `Report+A.docx` — fetching with the raw key would 404 on a perfectly
//! valid object. Decoding happens exactly once, at the event boundary, so
//! every later stage (fetch, key derivation, publish) works with the real
//! key and never has to care about encoding.

use crate::error::HarvestError;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

/// A storage "object created" notification, as delivered by the event
/// source. Only the fields this crate consumes are modelled; unknown fields
/// in the payload are ignored by serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records")]
    pub records: Vec<EventRecord>,
}

/// One record of a [`StorageEvent`]. Notifications for single-object
/// creation carry exactly one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

/// The `s3` sub-document of an event record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

/// Bucket reference within the event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

/// Object reference within the event payload. The key is still
/// percent-encoded here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRef {
    pub key: String,
}

/// The source document of one invocation: bucket plus *decoded* key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceObject {
    pub bucket: String,
    pub key: String,
}

impl SourceObject {
    /// Pull bucket and decoded key out of the first record of an event.
    ///
    /// # Errors
    /// [`HarvestError::InvalidEvent`] when the event carries no records.
    pub fn from_event(event: &StorageEvent) -> Result<Self, HarvestError> {
        let record = event.records.first().ok_or_else(|| HarvestError::InvalidEvent {
            detail: "event contains no records".to_string(),
        })?;

        Ok(SourceObject {
            bucket: record.s3.bucket.name.clone(),
            key: decode_key(&record.s3.object.key),
        })
    }
}

/// Decode a percent-encoded object key with `+`-for-space semantics.
///
/// Invalid UTF-8 sequences are replaced rather than rejected — a key the
/// storage service accepted must never make the decode step fail.
pub fn decode_key(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Build a minimal single-record event. Used by the CLI's `--bucket/--key`
/// mode and by tests.
pub fn event_for(bucket: &str, key: &str) -> StorageEvent {
    StorageEvent {
        records: vec![EventRecord {
            s3: S3Entity {
                bucket: BucketRef {
                    name: bucket.to_string(),
                },
                object: ObjectRef {
                    key: key.to_string(),
                },
            },
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plus_as_space() {
        assert_eq!(decode_key("Report+A.docx"), "Report A.docx");
    }

    #[test]
    fn decode_percent_sequences() {
        assert_eq!(decode_key("Report%20A.docx"), "Report A.docx");
        assert_eq!(decode_key("a%2Bb.pdf"), "a+b.pdf");
        assert_eq!(decode_key("caf%C3%A9.pptx"), "café.pptx");
        assert_eq!(decode_key("100%25+done.pdf"), "100% done.pdf");
    }

    #[test]
    fn decode_plain_key_is_identity() {
        assert_eq!(decode_key("spec.pdf"), "spec.pdf");
        assert_eq!(decode_key("nested/path/deck.pptx"), "nested/path/deck.pptx");
    }

    #[test]
    fn parse_notification_json() {
        let json = r#"{
            "Records": [
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": { "name": "disclosurefileupload", "arn": "arn:aws:s3:::disclosurefileupload" },
                        "object": { "key": "Report+A.docx", "size": 12345 }
                    }
                }
            ]
        }"#;
        let event: StorageEvent = serde_json::from_str(json).expect("event should parse");
        let source = SourceObject::from_event(&event).expect("record present");
        assert_eq!(source.bucket, "disclosurefileupload");
        assert_eq!(source.key, "Report A.docx");
    }

    #[test]
    fn empty_records_is_invalid_event() {
        let event = StorageEvent { records: vec![] };
        let err = SourceObject::from_event(&event).unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("no records"));
    }
}

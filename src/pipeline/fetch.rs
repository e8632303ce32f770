//! Fetch stage: event → (source object, buffered document bytes).
//!
//! ## Why buffer the whole document?
//!
//! Every downstream parser (ZIP central directory, PDF xref table) needs
//! random access, so streaming would only add complexity without saving
//! memory. Buffering bounds the supported document size to available
//! memory, which is the intended trade-off for single-document
//! invocations.

use crate::error::HarvestError;
use crate::event::{SourceObject, StorageEvent};
use crate::storage::ObjectStore;
use bytes::Bytes;
use std::sync::Arc;
use tracing::info;

/// Resolve the event's source object and read its full body.
///
/// # Errors
/// * [`HarvestError::InvalidEvent`] — the notification carries no records.
/// * [`HarvestError::NotFound`] — the decoded key is absent from the bucket.
/// * [`HarvestError::Storage`] — any other retrieval fault.
pub async fn fetch(
    event: &StorageEvent,
    store: &Arc<dyn ObjectStore>,
) -> Result<(SourceObject, Bytes), HarvestError> {
    let source = SourceObject::from_event(event)?;
    info!("Fetching s3://{}/{}", source.bucket, source.key);

    let body = store.get(&source.bucket, &source.key).await?;
    info!("Fetched {} bytes", body.len());

    Ok((source, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::event_for;
    use crate::storage::MemoryStore;

    fn memory_store() -> (Arc<MemoryStore>, Arc<dyn ObjectStore>) {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn ObjectStore> = Arc::clone(&memory) as Arc<dyn ObjectStore>;
        (memory, store)
    }

    #[tokio::test]
    async fn fetch_decodes_key_before_lookup() {
        let (memory, store) = memory_store();
        memory.insert("uploads", "Report A.docx", &b"doc-bytes"[..]);

        let event = event_for("uploads", "Report+A.docx");
        let (source, body) = fetch(&event, &store).await.expect("fetch should succeed");

        assert_eq!(source.key, "Report A.docx");
        assert_eq!(&body[..], b"doc-bytes");
    }

    #[tokio::test]
    async fn fetch_missing_key_is_not_found() {
        let (_memory, store) = memory_store();
        let event = event_for("uploads", "absent.pdf");

        let err = fetch(&event, &store).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}

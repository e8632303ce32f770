//! Object-storage access: the `ObjectStore` seam, the S3 backend, and an
//! in-memory fake for tests.
//!
//! ## Why a trait?
//!
//! The handlers only ever need two verbs — read one whole object, write one
//! whole object with a content type. Putting those two verbs behind
//! [`ObjectStore`] keeps the pipelines testable without a running S3: the
//! end-to-end tests run against [`MemoryStore`] and assert on the exact
//! keys, bodies, and content types written.
//!
//! ## Client lifetime
//!
//! When no store is injected through [`crate::config::PipelineConfig`], the
//! handlers share one lazily-built S3 client per process
//! ([`resolve_store`]). Building an AWS client involves credential and
//! region resolution, so doing it once and reusing it across invocations is
//! the normal serverless pattern. A config that overrides region or
//! endpoint gets its own client instead of polluting the shared one.

use crate::config::PipelineConfig;
use crate::error::HarvestError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::OnceCell;
use tracing::debug;

/// Whole-object read/write access to a bucket-addressed store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the full body of `bucket`/`key`.
    ///
    /// # Errors
    /// [`HarvestError::NotFound`] when the key is absent;
    /// [`HarvestError::Storage`] for any other retrieval fault.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, HarvestError>;

    /// Write `body` to `bucket`/`key` with the given content type,
    /// overwriting any existing object.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), HarvestError>;
}

// ── S3 backend ───────────────────────────────────────────────────────────

/// [`ObjectStore`] backed by the AWS S3 SDK.
pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Build a store from the SDK's default provider chain, with optional
    /// region and endpoint overrides (MinIO, LocalStack). A custom endpoint
    /// implies path-style addressing.
    pub async fn connect(
        region: Option<&str>,
        endpoint_url: Option<&str>,
    ) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Wrap an already-configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, HarvestError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;

        match response {
            Ok(output) => {
                let body = output.body.collect().await.map_err(|e| HarvestError::Storage {
                    detail: e.to_string(),
                })?;
                let bytes = body.into_bytes();
                debug!("Fetched s3://{bucket}/{key} ({} bytes)", bytes.len());
                Ok(bytes)
            }
            Err(err) => {
                let detail = format!("{}", DisplayErrorContext(&err));
                if err.into_service_error().is_no_such_key() {
                    Err(HarvestError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    })
                } else {
                    Err(HarvestError::Storage { detail })
                }
            }
        }
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), HarvestError> {
        let len = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| HarvestError::Storage {
                detail: format!("{}", DisplayErrorContext(&err)),
            })?;
        debug!("Wrote s3://{bucket}/{key} ({len} bytes, {content_type})");
        Ok(())
    }
}

// ── Store resolution ─────────────────────────────────────────────────────

static DEFAULT_STORE: OnceCell<Arc<S3Store>> = OnceCell::const_new();

/// Resolve the storage backend for an invocation, from most-specific to
/// least-specific:
///
/// 1. **Injected store** (`config.store`) — used as-is; this is the test
///    seam and the hook for custom middleware.
/// 2. **Config-built client** — a region or endpoint override builds a
///    dedicated client for this config.
/// 3. **Shared default client** — built once per process on first use and
///    reused by every subsequent invocation.
pub async fn resolve_store(config: &PipelineConfig) -> Arc<dyn ObjectStore> {
    if let Some(ref store) = config.store {
        return Arc::clone(store);
    }

    if config.region.is_some() || config.endpoint_url.is_some() {
        return Arc::new(
            S3Store::connect(config.region.as_deref(), config.endpoint_url.as_deref()).await,
        );
    }

    let store = DEFAULT_STORE
        .get_or_init(|| async { Arc::new(S3Store::connect(None, None).await) })
        .await;
    Arc::clone(store) as Arc<dyn ObjectStore>
}

// ── In-memory backend ────────────────────────────────────────────────────

/// A stored object: body plus content type.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

/// In-process [`ObjectStore`] fake. Objects live in a map keyed by
/// (bucket, key); writes overwrite, matching S3 semantics.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, defaulting the content type. Test setup helper.
    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.objects.write().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.into(),
                content_type: "application/octet-stream".to_string(),
            },
        );
    }

    /// Look up a stored object.
    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// All keys in a bucket, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Total object count across all buckets.
    pub fn len(&self) -> usize {
        self.objects.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, HarvestError> {
        self.object(bucket, key)
            .map(|o| o.body)
            .ok_or_else(|| HarvestError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), HarvestError> {
        self.objects.write().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        store
            .put("bucket", "a.txt", Bytes::from_static(b"hello"), "text/plain")
            .await
            .unwrap();

        let body = store.get("bucket", "a.txt").await.unwrap();
        assert_eq!(&body[..], b"hello");

        let object = store.object("bucket", "a.txt").unwrap();
        assert_eq!(object.content_type, "text/plain");
    }

    #[tokio::test]
    async fn memory_store_missing_key_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("bucket", "absent.pdf").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn memory_store_put_overwrites() {
        let store = MemoryStore::new();
        store
            .put("bucket", "a.txt", Bytes::from_static(b"one"), "text/plain")
            .await
            .unwrap();
        store
            .put("bucket", "a.txt", Bytes::from_static(b"two"), "text/plain")
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(&store.get("bucket", "a.txt").await.unwrap()[..], b"two");
    }

    #[tokio::test]
    async fn memory_store_keys_are_bucket_scoped_and_sorted() {
        let store = MemoryStore::new();
        store.insert("a", "z.txt", &b"z"[..]);
        store.insert("a", "m.txt", &b"m"[..]);
        store.insert("b", "other.txt", &b"o"[..]);

        assert_eq!(store.keys("a"), vec!["m.txt", "z.txt"]);
        assert_eq!(store.keys("b"), vec!["other.txt"]);
    }

    #[tokio::test]
    async fn injected_store_wins_resolution() {
        let memory: Arc<dyn ObjectStore> = Arc::new(MemoryStore::new());
        let config = PipelineConfig {
            store: Some(Arc::clone(&memory)),
            ..Default::default()
        };
        let resolved = resolve_store(&config).await;
        // Same allocation: the injected store is used as-is.
        assert!(Arc::ptr_eq(&memory, &resolved));
    }
}

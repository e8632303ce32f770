//! Configuration for the extraction pipelines.
//!
//! All pipeline behaviour that is *not* part of the naming contract lives in
//! [`PipelineConfig`], built via its [`PipelineConfigBuilder`]. Destination
//! buckets are deliberately not configurable — they are a hardcoded
//! per-pipeline lookup (see [`crate::pipeline::publish`]), and keeping them
//! out of the config means two deployments cannot drift apart silently.
//!
//! # Design choice: injectable storage
//!
//! The storage client is the only external service handle this crate holds.
//! Rather than a process-global singleton, the handle is an
//! `Arc<dyn ObjectStore>` slot on the config: tests inject a
//! [`crate::storage::MemoryStore`], production leaves the slot empty and the
//! handlers lazily build one shared S3 client on first use.

use crate::error::HarvestError;
use crate::storage::ObjectStore;
use std::fmt;
use std::sync::Arc;

/// Configuration for one pipeline invocation.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use docharvest::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .region("eu-west-1")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Default)]
pub struct PipelineConfig {
    /// Pre-constructed storage backend. Takes precedence over building an
    /// S3 client; this is how tests substitute a fake store.
    pub store: Option<Arc<dyn ObjectStore>>,

    /// AWS region override. If None, the SDK's default provider chain
    /// (env vars, profile, instance metadata) decides.
    pub region: Option<String>,

    /// Custom S3 endpoint (MinIO, LocalStack). Implies path-style
    /// addressing. Must be an http(s) URL.
    pub endpoint_url: Option<String>,
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("store", &self.store.as_ref().map(|_| "<dyn ObjectStore>"))
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.config.store = Some(store);
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = Some(region.into());
        self
    }

    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint_url = Some(url.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, HarvestError> {
        if let Some(ref url) = self.config.endpoint_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(HarvestError::InvalidConfig(format!(
                    "endpoint_url must be an http(s) URL, got '{url}'"
                )));
            }
        }
        Ok(self.config)
    }
}

//! # docharvest
//!
//! Extract plain text and embedded raster images from office documents
//! (DOCX, PDF, PPTX) uploaded to an object-storage bucket, and republish
//! the extracted artifacts to a destination bucket.
//!
//! ## Why this crate?
//!
//! Upload pipelines that feed search indexes, review tooling, or ML
//! ingestion rarely want the original binary document — they want its text
//! and its pictures, as separately addressable objects with predictable
//! keys. docharvest is the glue that turns one "object created" notification
//! into exactly that: one `text/plain` object plus zero-or-more image
//! objects, named deterministically from the source key.
//!
//! ## Pipeline Overview
//!
//! ```text
//! notification
//!  │
//!  ├─ 1. Fetch    decode the percent-encoded key, read the whole document
//!  ├─ 2. Extract  format-specific text + image extraction (spawn_blocking)
//!  └─ 3. Publish  one .txt object, then images in fixed order with
//!                 zero-padded 1-based indices
//! ```
//!
//! Each document format has an independent, stateless handler; invocations
//! share no state and may run concurrently.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docharvest::{handle_docx, PipelineConfig, StorageEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let event: StorageEvent = serde_json::from_str(&std::fs::read_to_string("event.json")?)?;
//!     let config = PipelineConfig::default();
//!     let response = handle_docx(&event, &config).await;
//!     println!("{}: {}", response.status_code, response.body);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docharvest` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docharvest = { version = "0.3", default-features = false }
//! ```
//!
//! ## Naming contract
//!
//! For a decoded source key `Report A.docx` containing three images:
//!
//! | Object | Key | Content type |
//! |--------|-----|--------------|
//! | text   | `Report A.txt` | `text/plain` |
//! | image 1 | `Report A_image_1.png` | `image/png` |
//! | image 2 | `Report A_image_2.jpeg` | `image/jpeg` |
//! | image 3 | `Report A_image_3.png` | `image/png` |
//!
//! Index padding widens with the image count: a 12-image document produces
//! `_image_01` … `_image_12`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod event;
pub mod extract;
pub mod handler;
pub mod output;
pub mod pipeline;
pub mod storage;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::HarvestError;
pub use event::{SourceObject, StorageEvent};
pub use extract::{DocumentKind, ExtractedImage, ExtractionResult, ImageFormat};
pub use handler::{
    handle_docx, handle_pdf, handle_pptx, process_docx, process_pdf, process_pptx,
};
pub use output::{InvocationResponse, PublishSummary};
pub use storage::{MemoryStore, ObjectStore, S3Store};

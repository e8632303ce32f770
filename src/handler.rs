//! Invocation entry points: one handler per document format.
//!
//! Each handler runs one sequential fetch → extract → publish flow for a
//! single notification. Handlers share no state; concurrent invocations
//! (for different documents) are independent, and there is no internal
//! parallelism within an invocation.
//!
//! Two API layers exist for each format:
//!
//! * `process_*` — returns `Result<PublishSummary, HarvestError>` for
//!   programmatic callers that want the typed outcome.
//! * `handle_*` — collapses the result into the external
//!   [`InvocationResponse`] contract (200 / 404 / 500 plus message).

use crate::config::PipelineConfig;
use crate::error::HarvestError;
use crate::event::StorageEvent;
use crate::extract::DocumentKind;
use crate::output::{InvocationResponse, PublishSummary};
use crate::pipeline::{fetch, publish};
use crate::storage;
use tracing::{error, info};

/// Extract and republish one DOCX upload.
pub async fn process_docx(
    event: &StorageEvent,
    config: &PipelineConfig,
) -> Result<PublishSummary, HarvestError> {
    process(DocumentKind::Docx, event, config).await
}

/// Extract and republish one PDF upload.
pub async fn process_pdf(
    event: &StorageEvent,
    config: &PipelineConfig,
) -> Result<PublishSummary, HarvestError> {
    process(DocumentKind::Pdf, event, config).await
}

/// Extract and republish one PPTX upload.
pub async fn process_pptx(
    event: &StorageEvent,
    config: &PipelineConfig,
) -> Result<PublishSummary, HarvestError> {
    process(DocumentKind::Pptx, event, config).await
}

/// DOCX handler with the external response contract.
pub async fn handle_docx(event: &StorageEvent, config: &PipelineConfig) -> InvocationResponse {
    respond(process_docx(event, config).await)
}

/// PDF handler with the external response contract.
pub async fn handle_pdf(event: &StorageEvent, config: &PipelineConfig) -> InvocationResponse {
    respond(process_pdf(event, config).await)
}

/// PPTX handler with the external response contract.
pub async fn handle_pptx(event: &StorageEvent, config: &PipelineConfig) -> InvocationResponse {
    respond(process_pptx(event, config).await)
}

/// The shared sequential flow behind all three formats.
async fn process(
    kind: DocumentKind,
    event: &StorageEvent,
    config: &PipelineConfig,
) -> Result<PublishSummary, HarvestError> {
    let store = storage::resolve_store(config).await;

    // ── Step 1: Fetch ────────────────────────────────────────────────────
    let (source, body) = fetch::fetch(event, &store).await?;

    // ── Step 2: Resolve destination ──────────────────────────────────────
    // Before extraction: an unroutable upload must not pay for a parse.
    let destination = publish::resolve_destination(kind, &source.bucket)?;

    // ── Step 3: Extract ──────────────────────────────────────────────────
    // Parsing is CPU-bound; keep it off the async worker threads.
    let extraction = tokio::task::spawn_blocking(move || kind.extract(&body))
        .await
        .map_err(|e| HarvestError::Internal(format!("extraction task panicked: {e}")))??;
    info!(
        "Extracted {} chars of text and {} image(s) from {}",
        extraction.text.len(),
        extraction.images.len(),
        source.key
    );

    // ── Step 4: Publish ──────────────────────────────────────────────────
    let summary = publish::publish(&store, destination, &source.key, kind, extraction).await?;
    info!("Text and images extracted and uploaded successfully!");

    Ok(summary)
}

/// Collapse a pipeline result into the response contract, logging failures.
fn respond(result: Result<PublishSummary, HarvestError>) -> InvocationResponse {
    if let Err(ref err) = result {
        error!("Error processing file: {err}");
    }
    InvocationResponse::from_result(result)
}

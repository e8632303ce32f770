//! CLI binary for docharvest.
//!
//! A thin shim over the library crate: builds a storage event from the
//! flags (or reads one from a file / stdin), runs the matching handler,
//! and prints the invocation response as JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use docharvest::event::{decode_key, event_for};
use docharvest::{
    handle_docx, handle_pdf, handle_pptx, DocumentKind, PipelineConfig, StorageEvent,
};
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "docharvest",
    version,
    about = "Extract text and embedded images from a DOCX/PDF/PPTX upload and republish them"
)]
struct Cli {
    /// Storage notification JSON file, or `-` to read it from stdin.
    #[arg(long, conflicts_with_all = ["bucket", "key"])]
    event: Option<String>,

    /// Source bucket (alternative to --event).
    #[arg(long, requires = "key")]
    bucket: Option<String>,

    /// Source object key, percent-encoded as in a real notification.
    #[arg(long, requires = "bucket")]
    key: Option<String>,

    /// Document format. Inferred from the key extension when omitted.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// AWS region override.
    #[arg(long)]
    region: Option<String>,

    /// Custom S3 endpoint (MinIO, LocalStack); implies path-style requests.
    #[arg(long, env = "DOCHARVEST_ENDPOINT_URL")]
    endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Docx,
    Pdf,
    Pptx,
}

impl From<Format> for DocumentKind {
    fn from(format: Format) -> Self {
        match format {
            Format::Docx => DocumentKind::Docx,
            Format::Pdf => DocumentKind::Pdf,
            Format::Pptx => DocumentKind::Pptx,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let event = load_event(&cli)?;
    let kind = resolve_kind(&cli, &event)?;

    let mut builder = PipelineConfig::builder();
    if let Some(ref region) = cli.region {
        builder = builder.region(region);
    }
    if let Some(ref endpoint) = cli.endpoint_url {
        builder = builder.endpoint_url(endpoint);
    }
    let config = builder.build()?;

    let response = match kind {
        DocumentKind::Docx => handle_docx(&event, &config).await,
        DocumentKind::Pdf => handle_pdf(&event, &config).await,
        DocumentKind::Pptx => handle_pptx(&event, &config).await,
    };

    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.status_code != 200 {
        std::process::exit(1);
    }
    Ok(())
}

/// Build the event from `--event` or from `--bucket`/`--key`.
fn load_event(cli: &Cli) -> Result<StorageEvent> {
    if let Some(ref path) = cli.event {
        let json = if path == "-" {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed reading event from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path).with_context(|| format!("failed reading '{path}'"))?
        };
        return serde_json::from_str(&json).context("event is not a valid storage notification");
    }

    match (&cli.bucket, &cli.key) {
        (Some(bucket), Some(key)) => Ok(event_for(bucket, key)),
        _ => bail!("provide --event <file|-> or both --bucket and --key"),
    }
}

/// Pick the pipeline: explicit `--format` wins, otherwise the decoded key's
/// extension decides.
fn resolve_kind(cli: &Cli, event: &StorageEvent) -> Result<DocumentKind> {
    if let Some(format) = cli.format {
        return Ok(format.into());
    }

    let raw_key = event
        .records
        .first()
        .map(|r| r.s3.object.key.as_str())
        .unwrap_or_default();
    let decoded = decode_key(raw_key);

    DocumentKind::from_key(&decoded).with_context(|| {
        format!("cannot infer document format from key '{decoded}'; pass --format")
    })
}

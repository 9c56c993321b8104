//! CLI binary for paperfeed.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to a `RunConfig`, drives one batch run, and prints the summary.

use anyhow::{Context, Result};
use clap::Parser;
use paperfeed::{run_batch, DeletionPrompt, LopdfCodec, RunConfig, StdinPrompt, Uploader};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Split everything in the consume folder into numbered single pages
  paperfeed --consume /scans/in --output /scans/out

  # Interactively weed out bad scans first, then upload and archive
  paperfeed --curate --upload --archive

  # Check that the Paperless instance is reachable (exit 1 if not)
  paperfeed --test-api

ENVIRONMENT VARIABLES (also read from a .env file):
  CONSUME_FOLDER    Folder holding the multi-page source scans
  OUTPUT_FOLDER     Folder the single-page output files go to
  ARCHIVE_FOLDER    Where processed scans are moved with --archive
                    (default: <CONSUME_FOLDER>/archived)
  API_BASE_URL      Paperless-NGX API base, e.g. https://paperless.local/api/
  API_TOKEN         API token, sent as 'Authorization: Token ...'
  PUBKEY            PEM trust-anchor certificate for TLS verification

OUTPUT NAMING:
  Pages are numbered sequentially across the whole batch:
    01_Xerox_Scan_05-03-25 14h02m.pdf
    02_Xerox_Scan_05-03-25 14h02m.pdf
  The counter never resets between documents within one run.
"#;

/// Split multi-page PDF scans and feed them to a Paperless-NGX instance.
#[derive(Parser, Debug)]
#[command(
    name = "paperfeed",
    version,
    about = "Split multi-page PDF scans and feed them to a Paperless-NGX instance",
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder holding the multi-page source scans.
    #[arg(long, env = "CONSUME_FOLDER")]
    consume: Option<PathBuf>,

    /// Folder the single-page output files are written to.
    #[arg(long, env = "OUTPUT_FOLDER")]
    output: Option<PathBuf>,

    /// Where processed scans are moved with --archive.
    #[arg(long, env = "ARCHIVE_FOLDER")]
    archive_to: Option<PathBuf>,

    /// Paperless-NGX API base URL.
    #[arg(long, env = "API_BASE_URL")]
    api_base_url: Option<String>,

    /// API token, sent as 'Authorization: Token ...'.
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// PEM trust-anchor certificate for TLS verification.
    #[arg(long, env = "PUBKEY")]
    pubkey: Option<PathBuf>,

    /// Fixed label embedded in every output filename.
    #[arg(long, env = "PAPERFEED_LABEL", default_value = "Xerox_Scan")]
    label: String,

    /// Timeout for every HTTP call, in seconds.
    #[arg(long, env = "PAPERFEED_HTTP_TIMEOUT", default_value_t = 30)]
    http_timeout: u64,

    /// Test API connectivity and exit (exit code 1 on failure).
    #[arg(long = "test-api")]
    test_api: bool,

    /// Upload the output files to the Paperless instance after processing.
    #[arg(long)]
    upload: bool,

    /// Move processed source scans to the archive folder after the run.
    #[arg(long)]
    archive: bool,

    /// Interactively curate the consume folder before processing.
    #[arg(long)]
    curate: bool,

    /// Print the run report as JSON instead of a text summary.
    #[arg(long)]
    json: bool,

    /// Enable detailed logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Quiet by default: the summary lines below are the user interface,
    // logging is for diagnostics.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── API-test mode: connectivity only, nothing touched ────────────────
    if cli.test_api {
        let config = RunConfig::builder()
            .consume_dir(cli.consume.unwrap_or_else(|| PathBuf::from(".")))
            .output_dir(cli.output.unwrap_or_else(|| PathBuf::from(".")))
            .api_base_url(cli.api_base_url.clone().unwrap_or_default())
            .api_token(cli.api_token.clone().unwrap_or_default())
            .http_timeout_secs(cli.http_timeout);
        let config = match cli.pubkey {
            Some(ref p) => config.trust_anchor(p.clone()),
            None => config,
        }
        .build()
        .context("Invalid configuration")?;

        let uploader = Uploader::from_config(&config).context("Cannot build API client")?;
        match uploader.check_connectivity().await {
            Ok(()) => {
                println!("API connection successful");
                return Ok(());
            }
            Err(e) => {
                eprintln!("API connection failed: {e}");
                std::process::exit(1);
            }
        }
    }

    // ── Build config ─────────────────────────────────────────────────────
    let consume = cli
        .consume
        .context("CONSUME_FOLDER must be set (flag or environment variable)")?;
    let output = cli
        .output
        .context("OUTPUT_FOLDER must be set (flag or environment variable)")?;

    let mut builder = RunConfig::builder()
        .consume_dir(consume)
        .output_dir(output)
        .label(cli.label)
        .upload(cli.upload)
        .archive(cli.archive)
        .http_timeout_secs(cli.http_timeout);
    if let Some(dir) = cli.archive_to {
        builder = builder.archive_dir(dir);
    }
    if let Some(url) = cli.api_base_url {
        builder = builder.api_base_url(url);
    }
    if let Some(token) = cli.api_token {
        builder = builder.api_token(token);
    }
    if let Some(pubkey) = cli.pubkey {
        builder = builder.trust_anchor(pubkey);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run the batch ────────────────────────────────────────────────────
    let mut stdin_prompt = StdinPrompt;
    let prompt: Option<&mut dyn DeletionPrompt> = if cli.curate {
        Some(&mut stdin_prompt)
    } else {
        None
    };

    let report = run_batch(&config, &LopdfCodec, prompt)
        .await
        .context("Batch run failed")?;

    // ── Summary ──────────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else {
        println!(
            "\nProcessed {}/{} documents, {} pages written, {} renamed",
            report.stats.documents_processed,
            report.stats.documents_total,
            report.stats.pages_written,
            report.stats.files_renamed,
        );
        for doc in report.documents.iter().filter(|d| !d.is_success()) {
            println!(
                "  failed: {}: {}",
                doc.source.display(),
                doc.error.as_ref().unwrap()
            );
        }
        if let Some(ref upload) = report.upload {
            match upload.error {
                None => println!("Uploaded {} files", upload.uploaded),
                Some(ref e) => println!("Upload failed after {} files: {e}", upload.uploaded),
            }
        }
        if let Some(ref archive) = report.archive {
            if archive.skipped_after_upload_failure {
                println!("Archiving skipped (upload failed)");
            } else {
                println!(
                    "Archived {} files ({} failed)",
                    archive.moved, archive.failed
                );
            }
        }
    }

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

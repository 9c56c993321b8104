//! The batch orchestrator: curate → clean → split/rename per document →
//! upload → archive.
//!
//! ## State that matters
//!
//! The only cross-document state is the rename counter, created here at run
//! start and threaded by value through every renamer invocation. Each stage
//! otherwise reads its inputs fresh from the file system, so a failed
//! document leaves nothing behind except its log lines and its entry in the
//! report.
//!
//! ## Failure isolation
//!
//! Per-document errors are recorded and the loop continues. An upload
//! failure ends that step but rolls nothing back; the split and renamed
//! pages stay on disk for a retry. Archiving is skipped when an upload was
//! requested and failed, so source scans are never moved away before their
//! pages are known to have reached the server.

use crate::codec::DocumentCodec;
use crate::config::RunConfig;
use crate::error::PipelineError;
use crate::pipeline::archive::archive_consumed;
use crate::pipeline::clean::clean_output;
use crate::pipeline::curate::{curate_consume_dir, list_entries, DeletionPrompt};
use crate::pipeline::rename::renumber_pages;
use crate::pipeline::split::split_document;
use crate::pipeline::upload::Uploader;
use crate::report::{DocumentResult, RunReport, RunStats, UploadReport};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Run the whole ingestion batch.
///
/// `prompt` enables the interactive curation step; pass `None` for
/// unattended runs. Returns `Err` only for fatal problems (unusable
/// directories); every other failure is contained and reported in the
/// returned [`RunReport`].
pub async fn run_batch(
    config: &RunConfig,
    codec: &dyn DocumentCodec,
    mut prompt: Option<&mut dyn DeletionPrompt>,
) -> Result<RunReport, PipelineError> {
    let run_start = Instant::now();

    // ── Init: both working directories must exist ────────────────────────
    ensure_dir(&config.consume_dir)?;
    ensure_dir(&config.output_dir)?;

    // ── Curating: only with a prompt and more than one candidate ─────────
    let mut curated_deletions = 0;
    if let Some(ref mut p) = prompt {
        if list_entries(&config.consume_dir).len() > 1 {
            let outcome = curate_consume_dir(&config.consume_dir, *p);
            curated_deletions = outcome.deleted;
        }
    }

    // ── Cleaning: the output folder belongs to this run alone ────────────
    clean_output(&config.output_dir);

    // ── Per-document loop ────────────────────────────────────────────────
    let sources = list_pdfs(&config.consume_dir)?;
    if sources.is_empty() {
        warn!("No PDF files found in {}", config.consume_dir.display());
    }

    let mut documents = Vec::with_capacity(sources.len());
    let mut counter: u32 = 1;

    for (i, source) in sources.iter().enumerate() {
        info!(
            "Processing file {}/{}: {}",
            i + 1,
            sources.len(),
            source.display()
        );
        let (result, next_counter) = process_document(config, codec, source, counter);
        counter = next_counter;
        documents.push(result);
    }

    // ── Uploading: flag-gated, fail-fast ─────────────────────────────────
    let upload = if config.upload {
        Some(run_upload(config).await)
    } else {
        None
    };
    let upload_ok = upload.as_ref().map_or(true, |u| u.error.is_none());

    // ── Archiving: never before a requested upload has succeeded ─────────
    let archive = if config.archive {
        if upload_ok {
            Some(archive_consumed(&config.consume_dir, &config.archive_dir))
        } else {
            warn!("Upload failed; leaving source files in the consume folder");
            Some(crate::report::ArchiveReport {
                moved: 0,
                failed: 0,
                skipped_after_upload_failure: true,
            })
        }
    } else {
        None
    };

    let stats = RunStats {
        documents_total: documents.len(),
        documents_processed: documents.iter().filter(|d| d.is_success()).count(),
        documents_failed: documents.iter().filter(|d| !d.is_success()).count(),
        pages_written: documents.iter().map(|d| d.pages_written).sum(),
        files_renamed: documents.iter().map(|d| d.renamed).sum(),
        total_duration_ms: run_start.elapsed().as_millis() as u64,
    };

    info!(
        "Completed processing {} PDF files ({} pages written)",
        stats.documents_total, stats.pages_written
    );

    Ok(RunReport {
        documents,
        stats,
        upload,
        archive,
        curated_deletions,
    })
}

/// Split one document and, if that worked, give its pages their final names.
///
/// Never fails the batch: both outcomes land in the `DocumentResult`.
fn process_document(
    config: &RunConfig,
    codec: &dyn DocumentCodec,
    source: &Path,
    counter: u32,
) -> (DocumentResult, u32) {
    let mut result = DocumentResult {
        source: source.to_path_buf(),
        pages_total: 0,
        pages_written: 0,
        pages_failed: 0,
        renamed: 0,
        error: None,
    };

    let outcome = match split_document(codec, source, &config.output_dir) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Failed to process {}: {e}", source.display());
            result.error = Some(e);
            return (result, counter);
        }
    };
    result.pages_total = outcome.pages_total;
    result.pages_written = outcome.pages_written;
    result.pages_failed = outcome.pages_failed;

    match renumber_pages(&config.output_dir, counter, &config.label) {
        Ok(renamed) => {
            result.renamed = renamed.renamed;
            (result, renamed.next_counter)
        }
        Err(e) => {
            error!("Failed to rename pages of {}: {e}", source.display());
            result.error = Some(e);
            (result, counter)
        }
    }
}

/// Run the upload step, folding any failure into the report.
///
/// An aborted sweep still reports the files posted before the abort.
async fn run_upload(config: &RunConfig) -> UploadReport {
    let uploader = match Uploader::from_config(config) {
        Ok(u) => u,
        Err(e) => {
            error!("{e}");
            return UploadReport {
                uploaded: 0,
                error: Some(e.to_string()),
            };
        }
    };

    let outcome = uploader.upload_directory(&config.output_dir).await;
    if let Some(ref e) = outcome.error {
        error!("{e}");
    }
    UploadReport {
        uploaded: outcome.uploaded,
        error: outcome.error.map(|e| e.to_string()),
    }
}

fn ensure_dir(path: &Path) -> Result<(), PipelineError> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| PipelineError::DirectoryCreate {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!("Created directory: {}", path.display());
    }
    Ok(())
}

/// Source documents, sorted by name so batch order (and therefore numbering)
/// is deterministic regardless of file-system listing order.
fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| PipelineError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

//! Run reporting types.
//!
//! A run always produces a [`RunReport`], even when individual documents or
//! the optional upload step failed; partial success is the normal case for
//! a batch tool fed by a flaky scanner. Everything here is serde-serialisable
//! so the CLI can emit the report as JSON for scripting.

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome for one source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Path of the source scan in the consume folder.
    pub source: PathBuf,
    /// Pages the codec reported for this document (0 when it failed to open).
    pub pages_total: usize,
    /// Temp page files actually written by the splitter.
    pub pages_written: usize,
    /// Pages that failed to extract (logged and skipped).
    pub pages_failed: usize,
    /// Files given their final sequence name by the renamer.
    pub renamed: usize,
    /// Set when the document as a whole failed; the batch continued.
    pub error: Option<DocumentError>,
}

impl DocumentResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of the optional upload step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReport {
    /// Files successfully posted before the step ended.
    pub uploaded: usize,
    /// Why the step aborted, if it did. Uploads already completed stay valid.
    pub error: Option<String>,
}

/// Outcome of the optional archive step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveReport {
    /// Source files moved into the archive directory.
    pub moved: usize,
    /// Files that could not be moved (collision or I/O); left in place.
    pub failed: usize,
    /// True when archiving was requested but skipped because the upload failed.
    pub skipped_after_upload_failure: bool,
}

/// Aggregate counters for the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub documents_total: usize,
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub pages_written: usize,
    pub files_renamed: usize,
    pub total_duration_ms: u64,
}

/// Complete result of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub documents: Vec<DocumentResult>,
    pub stats: RunStats,
    /// Present only when `--upload` was requested.
    pub upload: Option<UploadReport>,
    /// Present only when `--archive` was requested.
    pub archive: Option<ArchiveReport>,
    /// Files deleted by the operator during curation.
    pub curated_deletions: usize,
}

impl RunReport {
    /// True when every requested step completed without error.
    ///
    /// Per-document failures do not make a run unsuccessful (that is the
    /// continuation policy working as intended), but an aborted upload does,
    /// since the operator asked for it and it did not happen.
    pub fn is_success(&self) -> bool {
        self.upload.as_ref().map_or(true, |u| u.error.is_none())
    }
}

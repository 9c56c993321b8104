//! Error types for the paperfeed library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PipelineError`]: **fatal** to the run or to a whole optional step
//!   (bad configuration, unusable directory, failed connectivity check).
//!   Returned as `Err(PipelineError)` from [`crate::run::run_batch`] and the
//!   uploader entry points.
//!
//! * [`DocumentError`]: **non-fatal**. One source document (or one of its
//!   pages) failed but the rest of the batch is fine. Stored inside
//!   [`crate::report::DocumentResult`] so callers can inspect partial
//!   success rather than losing the whole batch to one bad scan.
//!
//! The separation encodes the continuation policy directly in the types:
//! anything that crosses a function boundary as `DocumentError` has already
//! been contained to its document.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors: the run (or an entire optional step) cannot proceed.
///
/// Document-level failures use [`DocumentError`] and are stored in
/// [`crate::report::DocumentResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// A configured path still contains a template placeholder.
    #[error("Placeholder path in {var}: '{path}'\nUpdate your .env before running.")]
    PlaceholderPath { var: String, path: String },

    /// A required configuration value is absent.
    #[error("{var} must be set (flag or environment variable)")]
    MissingConfig { var: &'static str },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Directory errors ──────────────────────────────────────────────────
    /// A working directory could not be created.
    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A working directory could not be listed.
    #[error("Failed to read directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Network errors ────────────────────────────────────────────────────
    /// The TLS trust anchor (PUBKEY) could not be loaded.
    #[error("Failed to load trust anchor '{path}': {detail}")]
    TrustAnchor { path: PathBuf, detail: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    /// The pre-upload connectivity check did not return HTTP 200.
    #[error("API connectivity check failed for '{url}': {detail}")]
    ConnectivityFailed { url: String, detail: String },

    /// An upload aborted the batch (first non-2xx or network error).
    #[error("Upload of '{file}' failed: {detail}")]
    UploadFailed { file: String, detail: String },
}

/// A non-fatal error scoped to one source document or one of its pages.
///
/// Stored alongside [`crate::report::DocumentResult`] when a document fails.
/// The batch always continues with the next document.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// Source file vanished between discovery and processing.
    #[error("Document not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Document opened but contains zero pages.
    #[error("Document is empty: '{path}'")]
    Empty { path: PathBuf },

    /// Document could not be parsed by the codec.
    #[error("Document '{path}' is corrupt: {detail}")]
    Corrupt { path: PathBuf, detail: String },

    /// One page could not be extracted or written (others may be fine).
    #[error("Page {page}: extraction failed: {detail}")]
    PageExtractFailed { page: usize, detail: String },

    /// The renamer found no temp page files to number.
    #[error("No page files produced in '{dir}'")]
    NoPagesProduced { dir: PathBuf },

    /// A file-system operation failed for this document.
    #[error("I/O error: {detail}")]
    Io { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_path_display() {
        let e = PipelineError::PlaceholderPath {
            var: "CONSUME_FOLDER".into(),
            path: "C:/path/to/consume".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("CONSUME_FOLDER"), "got: {msg}");
        assert!(msg.contains("C:/path/to/consume"));
    }

    #[test]
    fn connectivity_failed_display() {
        let e = PipelineError::ConnectivityFailed {
            url: "https://paperless.local/api/".into(),
            detail: "HTTP 503".into(),
        };
        assert!(e.to_string().contains("paperless.local"));
        assert!(e.to_string().contains("503"));
    }

    #[test]
    fn upload_failed_display() {
        let e = PipelineError::UploadFailed {
            file: "01_Xerox_Scan_05-03-25 14h02m.pdf".into(),
            detail: "HTTP 400: bad multipart body".into(),
        };
        assert!(e.to_string().contains("01_Xerox_Scan"));
        assert!(e.to_string().contains("400"));
    }

    #[test]
    fn page_extract_failed_display() {
        let e = DocumentError::PageExtractFailed {
            page: 7,
            detail: "object stream truncated".into(),
        };
        assert!(e.to_string().contains("Page 7"));
    }

    #[test]
    fn document_error_serialises() {
        let e = DocumentError::Empty {
            path: PathBuf::from("/scans/empty.pdf"),
        };
        let json = serde_json::to_string(&e).expect("must serialise");
        let back: DocumentError = serde_json::from_str(&json).expect("must deserialise");
        assert!(matches!(back, DocumentError::Empty { .. }));
    }
}

//! # paperfeed
//!
//! Split multi-page PDF scans into single-page files and feed them to a
//! Paperless-NGX-style document-management instance.
//!
//! ## Why this crate?
//!
//! Office scanners dump whole stacks of paper into one multi-page PDF.
//! Paperless-NGX, on the other hand, works best when every logical document
//! arrives as its own file. paperfeed bridges the two: it watches a consume
//! folder, splits each scan into single pages, numbers the pages sequentially
//! across the whole batch, and optionally uploads everything and archives the
//! originals.
//!
//! ## Pipeline Overview
//!
//! ```text
//! consume folder
//!  │
//!  ├─ 1. Curate   operator deletes unwanted scans (optional, interactive)
//!  ├─ 2. Clean    empty the output folder so stale pages never collide
//!  ├─ 3. Split    one single-page PDF per page, temp_page_NNNN.pdf
//!  ├─ 4. Rename   NN_<label>_<timestamp>.pdf, counter carried across docs
//!  ├─ 5. Upload   multipart POST per page to the Paperless endpoint (optional)
//!  └─ 6. Archive  move processed scans out of the consume folder (optional)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paperfeed::{run_batch, LopdfCodec, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::builder()
//!         .consume_dir("/scans/consume")
//!         .output_dir("/scans/output")
//!         .build()?;
//!     let report = run_batch(&config, &LopdfCodec, None).await?;
//!     println!(
//!         "{} documents, {} pages written",
//!         report.stats.documents_processed, report.stats.pages_written
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Model
//!
//! A bad page never kills its document, and a bad document never kills the
//! batch. Only configuration problems and unusable directories abort a run;
//! everything else is logged and recorded in the [`RunReport`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use codec::{DocumentCodec, LopdfCodec, PageSource};
pub use config::{RunConfig, RunConfigBuilder};
pub use error::{DocumentError, PipelineError};
pub use pipeline::curate::{ConsumeEntry, CurationOutcome, DeletionPrompt, StdinPrompt};
pub use pipeline::upload::{UploadOutcome, Uploader};
pub use report::{ArchiveReport, DocumentResult, RunReport, RunStats, UploadReport};
pub use run::run_batch;

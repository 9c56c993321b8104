//! Pipeline stages for batch scan ingestion.
//!
//! Each submodule implements exactly one stage. Keeping stages separate makes
//! each independently testable and lets us swap implementations (e.g. a
//! scripted curation prompt instead of stdin) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! curate ──▶ clean ──▶ split ──▶ rename ──▶ upload ──▶ archive
//! (stdin)   (output)  (codec)  (counter)  (reqwest)  (fs move)
//! ```
//!
//! 1. [`curate`]  - operator-driven deletion of unwanted source scans
//! 2. [`clean`]   - best-effort sweep of stale files from the output folder
//! 3. [`split`]   - one `temp_page_NNNN.pdf` per page, continue-on-error
//! 4. [`rename`]  - sequence-numbered final names; the counter is threaded
//!    through the orchestrator, never hidden in a global
//! 5. [`upload`]  - the only stage with network I/O; fail-fast, no retries
//! 6. [`archive`] - move processed scans out of the consume folder

pub mod archive;
pub mod clean;
pub mod curate;
pub mod rename;
pub mod split;
pub mod upload;

//! Page splitting: one temp file per page of a source document.
//!
//! ## Why zero-padded temp names?
//!
//! The renamer sorts temp files lexicographically to recover page order.
//! `temp_page_10.pdf` sorts before `temp_page_2.pdf`, so ordinals are padded
//! to four digits (`temp_page_0002.pdf`), which keeps lexicographic and page
//! order identical for any realistic scan.

use crate::codec::DocumentCodec;
use crate::error::DocumentError;
use std::path::Path;
use tracing::{debug, error, info};

/// Prefix shared by every not-yet-renamed page file.
pub const TEMP_PAGE_PREFIX: &str = "temp_page_";

/// What the splitter did for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Pages the codec reported.
    pub pages_total: usize,
    /// Temp files actually written.
    pub pages_written: usize,
    /// Pages whose extraction failed (logged and skipped).
    pub pages_failed: usize,
}

/// Temp filename for a 0-based page index.
pub fn temp_page_name(index: usize) -> String {
    format!("{TEMP_PAGE_PREFIX}{:04}.pdf", index + 1)
}

/// Split `source` into single-page files under `output_dir`.
///
/// A page that fails to extract is logged and skipped; the remaining pages
/// are still attempted. The document as a whole only fails when it cannot be
/// opened at all (missing, empty, or corrupt), in which case the caller logs
/// the error and moves on to the next document.
pub fn split_document(
    codec: &dyn DocumentCodec,
    source: &Path,
    output_dir: &Path,
) -> Result<SplitOutcome, DocumentError> {
    let doc = codec.open(source)?;
    let pages_total = doc.page_count();

    let mut pages_written = 0;
    let mut pages_failed = 0;
    for index in 0..pages_total {
        let dest = output_dir.join(temp_page_name(index));
        match doc.extract_page(index, &dest) {
            Ok(()) => {
                debug!("Created page {} of {}", index + 1, source.display());
                pages_written += 1;
            }
            Err(e) => {
                error!("Error processing page {} of {}: {e}", index + 1, source.display());
                pages_failed += 1;
            }
        }
    }

    info!(
        "Split {} into {} pages ({} failed)",
        source.display(),
        pages_written,
        pages_failed
    );
    Ok(SplitOutcome {
        pages_total,
        pages_written,
        pages_failed,
    })
}

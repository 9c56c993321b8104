//! Document codec seam: open a PDF and extract single pages from it.
//!
//! The pipeline never manipulates PDF internals directly. It talks to a
//! [`DocumentCodec`], and the codec hands back a [`PageSource`] per opened
//! document. This keeps the binary page-extraction routine an opaque,
//! swappable capability: production uses [`LopdfCodec`], tests use scripted
//! codecs that fail on demand to exercise the continue-on-error paths.

use crate::error::DocumentError;
use lopdf::Document;
use std::path::Path;
use tracing::debug;

/// Opens source documents. One instance serves the whole run.
pub trait DocumentCodec: Send + Sync {
    /// Open `path`, validating that it exists, parses, and has ≥ 1 page.
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, DocumentError>;
}

/// One opened document; extracts standalone single-page copies of itself.
pub trait PageSource: std::fmt::Debug {
    /// Number of pages in the document. Always ≥ 1 for a successfully
    /// opened source.
    fn page_count(&self) -> usize;

    /// Write page `index` (0-based) as a standalone document at `dest`.
    fn extract_page(&self, index: usize, dest: &Path) -> Result<(), DocumentError>;
}

/// Production codec backed by [`lopdf`].
///
/// Page extraction clones the parsed document, deletes every other page, and
/// prunes objects no longer reachable from the page tree. Cloning sounds
/// wasteful but the parse tree of a scanned PDF is small next to its image
/// streams, which lopdf shares until pruning drops the unreferenced ones.
pub struct LopdfCodec;

impl DocumentCodec for LopdfCodec {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, DocumentError> {
        if !path.exists() {
            return Err(DocumentError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let doc = Document::load(path).map_err(|e| DocumentError::Corrupt {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

        let pages = doc.get_pages().len();
        if pages == 0 {
            return Err(DocumentError::Empty {
                path: path.to_path_buf(),
            });
        }

        debug!("Opened {} ({} pages)", path.display(), pages);
        Ok(Box::new(LopdfSource { doc }))
    }
}

#[derive(Debug)]
struct LopdfSource {
    doc: Document,
}

impl PageSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    fn extract_page(&self, index: usize, dest: &Path) -> Result<(), DocumentError> {
        let total = self.doc.get_pages().len() as u32;
        let keep = index as u32 + 1; // lopdf numbers pages from 1
        if keep > total {
            return Err(DocumentError::PageExtractFailed {
                page: index + 1,
                detail: format!("page out of range (document has {total} pages)"),
            });
        }

        let mut single = self.doc.clone();
        let delete: Vec<u32> = (1..=total).filter(|p| *p != keep).collect();
        single.delete_pages(&delete);
        single.prune_objects();

        single
            .save(dest)
            .map_err(|e| DocumentError::PageExtractFailed {
                page: index + 1,
                detail: format!("failed to write '{}': {e}", dest.display()),
            })?;

        debug!("Extracted page {} → {}", index + 1, dest.display());
        Ok(())
    }
}

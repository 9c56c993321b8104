//! Output cleaning: empty the output folder before a run.
//!
//! The output directory is exclusively owned by one run. Sweeping it first
//! means a leftover `01_...` page from yesterday can never be renamed or
//! uploaded alongside today's batch.

use std::path::Path;
use tracing::{info, warn};

/// Delete every regular file directly under `dir`. Best-effort.
///
/// Subdirectories are never touched and the sweep never recurses. A file
/// that cannot be deleted is logged as a warning and left for the later
/// stages to collide with, and the run proceeds regardless. Returns the number
/// of files removed.
pub fn clean_output(dir: &Path) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Error accessing directory {}: {e}", dir.display());
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.filter_map(|e| e.ok()) {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!(
                    "Error deleting {}; proceeding anyway: {e}",
                    entry.path().display()
                );
            }
        }
    }

    info!("Removed {removed} existing files from {}", dir.display());
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_only_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"y").unwrap();
        std::fs::create_dir(dir.path().join("keep_me")).unwrap();
        std::fs::write(dir.path().join("keep_me/inner.pdf"), b"z").unwrap();

        let removed = clean_output(dir.path());

        assert_eq!(removed, 2);
        assert!(dir.path().join("keep_me").is_dir());
        assert!(dir.path().join("keep_me/inner.pdf").exists());
    }

    #[test]
    fn empty_directory_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(clean_output(dir.path()), 0);
        // Running again must not error either.
        assert_eq!(clean_output(dir.path()), 0);
    }

    #[test]
    fn missing_directory_does_not_panic() {
        assert_eq!(clean_output(Path::new("/no/such/dir/anywhere")), 0);
    }
}

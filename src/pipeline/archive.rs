//! Archival: move processed source scans out of the consume folder.
//!
//! ## Collision policy
//!
//! A same-named file already in the archive means a previous run archived a
//! scan with the same name; silently overwriting it would destroy the only
//! copy of that earlier document. So a collision fails that one file, the
//! source stays in the consume folder where the operator can see it, and the
//! sweep continues with the rest.

use crate::report::ArchiveReport;
use std::path::Path;
use tracing::{error, info, warn};

/// Move every regular file from `consume_dir` into `archive_dir`.
///
/// Creates the archive directory on demand. Per-file failures (collisions,
/// I/O errors) are logged and counted, never fatal; the affected source file
/// is left in place.
pub fn archive_consumed(consume_dir: &Path, archive_dir: &Path) -> ArchiveReport {
    let mut report = ArchiveReport {
        moved: 0,
        failed: 0,
        skipped_after_upload_failure: false,
    };

    if let Err(e) = std::fs::create_dir_all(archive_dir) {
        error!("Cannot create archive directory {}: {e}", archive_dir.display());
        return report;
    }

    let entries = match std::fs::read_dir(consume_dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Error accessing directory {}: {e}", consume_dir.display());
            return report;
        }
    };

    for entry in entries.filter_map(|e| e.ok()) {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name();
        let dest = archive_dir.join(&name);

        if dest.exists() {
            warn!(
                "{} already exists in the archive; leaving the source in place",
                name.to_string_lossy()
            );
            report.failed += 1;
            continue;
        }

        match std::fs::rename(entry.path(), &dest) {
            Ok(()) => {
                info!("Archived {}", name.to_string_lossy());
                report.moved += 1;
            }
            Err(e) => {
                warn!("Could not archive {}: {e}", name.to_string_lossy());
                report.failed += 1;
            }
        }
    }

    info!(
        "Archived {} files ({} failed) into {}",
        report.moved,
        report.failed,
        archive_dir.display()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_every_file_into_the_archive() {
        let root = tempfile::tempdir().unwrap();
        let consume = root.path().join("consume");
        let archive = root.path().join("archive");
        std::fs::create_dir(&consume).unwrap();
        std::fs::write(consume.join("a.pdf"), b"a").unwrap();
        std::fs::write(consume.join("b.pdf"), b"b").unwrap();

        let report = archive_consumed(&consume, &archive);

        assert_eq!(report.moved, 2);
        assert_eq!(report.failed, 0);
        assert!(archive.join("a.pdf").exists());
        assert!(!consume.join("a.pdf").exists());
    }

    #[test]
    fn collision_leaves_the_source_in_place() {
        let root = tempfile::tempdir().unwrap();
        let consume = root.path().join("consume");
        let archive = root.path().join("archive");
        std::fs::create_dir(&consume).unwrap();
        std::fs::create_dir(&archive).unwrap();
        std::fs::write(consume.join("scan.pdf"), b"new").unwrap();
        std::fs::write(archive.join("scan.pdf"), b"old").unwrap();

        let report = archive_consumed(&consume, &archive);

        assert_eq!(report.moved, 0);
        assert_eq!(report.failed, 1);
        assert!(consume.join("scan.pdf").exists(), "source must survive");
        assert_eq!(std::fs::read(archive.join("scan.pdf")).unwrap(), b"old");
    }

    #[test]
    fn subdirectories_are_not_archived() {
        let root = tempfile::tempdir().unwrap();
        let consume = root.path().join("consume");
        let archive = root.path().join("archive");
        std::fs::create_dir_all(consume.join("nested")).unwrap();
        std::fs::write(consume.join("scan.pdf"), b"x").unwrap();

        let report = archive_consumed(&consume, &archive);

        assert_eq!(report.moved, 1);
        assert!(consume.join("nested").is_dir());
    }

    #[test]
    fn empty_consume_folder_is_a_noop() {
        let root = tempfile::tempdir().unwrap();
        let consume = root.path().join("consume");
        let archive = root.path().join("archive");
        std::fs::create_dir(&consume).unwrap();

        let report = archive_consumed(&consume, &archive);
        assert_eq!(report.moved, 0);
        assert_eq!(report.failed, 0);
    }
}

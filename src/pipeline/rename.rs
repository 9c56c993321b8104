//! Renaming: give temp page files their final, globally sequenced names.
//!
//! ## The counter is the whole point
//!
//! Output numbering is sequential across the entire batch, not per document:
//! a 3-page scan followed by a 2-page scan yields `01..03` then `04..05`.
//! The counter is owned by the orchestrator and threaded through here by
//! value, so there is no hidden process-wide state to reset or race on.
//!
//! Only `temp_page_*.pdf` files are touched, so pages that already received
//! their final name earlier in the run are never renamed twice.

use crate::error::DocumentError;
use crate::pipeline::split::TEMP_PAGE_PREFIX;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// What one renamer invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameOutcome {
    /// Counter value for the next document.
    pub next_counter: u32,
    /// Files successfully renamed.
    pub renamed: usize,
}

/// Final filename for a sequence number: `NN_<label>_<stamp>.pdf`.
///
/// The counter is left-zero-padded to at least two digits; batches past 99
/// simply grow a third digit.
pub fn final_page_name(counter: u32, label: &str, stamp: &str) -> String {
    format!("{counter:02}_{label}_{stamp}.pdf")
}

/// Rename every temp page file in `output_dir`, starting at `counter`.
///
/// The timestamp is captured once per invocation so all pages of one
/// document share it. A single rename failure is logged, leaves the counter
/// untouched for that file, and does not stop the sweep. Fails only when
/// there is nothing to rename: the splitter claimed success but produced
/// zero pages, which callers treat as a document failure.
pub fn renumber_pages(
    output_dir: &Path,
    counter: u32,
    label: &str,
) -> Result<RenameOutcome, DocumentError> {
    let stamp = chrono::Local::now().format("%d-%m-%y %Hh%Mm").to_string();
    renumber_pages_at(output_dir, counter, label, &stamp)
}

/// [`renumber_pages`] with an explicit timestamp, for deterministic tests.
pub fn renumber_pages_at(
    output_dir: &Path,
    mut counter: u32,
    label: &str,
    stamp: &str,
) -> Result<RenameOutcome, DocumentError> {
    let mut temp_files: Vec<String> = std::fs::read_dir(output_dir)
        .map_err(|e| DocumentError::Io {
            detail: format!("failed to list '{}': {e}", output_dir.display()),
        })?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(TEMP_PAGE_PREFIX) && name.ends_with(".pdf"))
        .collect();

    if temp_files.is_empty() {
        warn!("No page files found in {}", output_dir.display());
        return Err(DocumentError::NoPagesProduced {
            dir: output_dir.to_path_buf(),
        });
    }

    // Temp names are zero-padded, so lexicographic order is page order.
    temp_files.sort();

    let mut renamed = 0;
    for name in &temp_files {
        let old_path = output_dir.join(name);
        let new_name = final_page_name(counter, label, stamp);
        let new_path = output_dir.join(&new_name);

        match std::fs::rename(&old_path, &new_path) {
            Ok(()) => {
                debug!("Renamed: {name} -> {new_name}");
                counter += 1;
                renamed += 1;
            }
            Err(e) => {
                error!("Error renaming {name}: {e}");
            }
        }
    }

    info!("Renamed {renamed} of {} page files", temp_files.len());
    Ok(RenameOutcome {
        next_counter: counter,
        renamed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::split::temp_page_name;

    fn touch_temp_pages(dir: &Path, count: usize) {
        for i in 0..count {
            std::fs::write(dir.join(temp_page_name(i)), b"stub").unwrap();
        }
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn final_name_is_zero_padded_to_two_digits() {
        assert_eq!(
            final_page_name(1, "Xerox_Scan", "05-03-25 14h02m"),
            "01_Xerox_Scan_05-03-25 14h02m.pdf"
        );
        assert_eq!(
            final_page_name(42, "Xerox_Scan", "05-03-25 14h02m"),
            "42_Xerox_Scan_05-03-25 14h02m.pdf"
        );
        // Three digits past 99, no truncation.
        assert_eq!(
            final_page_name(100, "Xerox_Scan", "05-03-25 14h02m"),
            "100_Xerox_Scan_05-03-25 14h02m.pdf"
        );
    }

    #[test]
    fn names_form_a_gapless_sequence_from_the_start_counter() {
        let dir = tempfile::tempdir().unwrap();
        touch_temp_pages(dir.path(), 3);

        let outcome = renumber_pages_at(dir.path(), 4, "Scan", "01-01-25 09h00m").unwrap();

        assert_eq!(outcome.next_counter, 7);
        assert_eq!(outcome.renamed, 3);
        assert_eq!(
            listing(dir.path()),
            vec![
                "04_Scan_01-01-25 09h00m.pdf",
                "05_Scan_01-01-25 09h00m.pdf",
                "06_Scan_01-01-25 09h00m.pdf",
            ]
        );
    }

    #[test]
    fn already_renamed_files_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        // Pages 01..02 from an earlier document in the same run.
        std::fs::write(dir.path().join("01_Scan_01-01-25 09h00m.pdf"), b"done").unwrap();
        std::fs::write(dir.path().join("02_Scan_01-01-25 09h00m.pdf"), b"done").unwrap();
        touch_temp_pages(dir.path(), 2);

        let outcome = renumber_pages_at(dir.path(), 3, "Scan", "01-01-25 09h01m").unwrap();

        assert_eq!(outcome.renamed, 2);
        assert_eq!(outcome.next_counter, 5);
        let names = listing(dir.path());
        assert_eq!(names.len(), 4);
        assert!(names.contains(&"01_Scan_01-01-25 09h00m.pdf".to_string()));
        assert!(names.contains(&"04_Scan_01-01-25 09h01m.pdf".to_string()));
    }

    #[test]
    fn empty_directory_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = renumber_pages_at(dir.path(), 1, "Scan", "01-01-25 09h00m").unwrap_err();
        assert!(matches!(err, DocumentError::NoPagesProduced { .. }));
    }

    #[test]
    fn non_temp_files_do_not_count_as_pages() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"keep me").unwrap();
        std::fs::write(dir.path().join("cover.pdf"), b"keep me too").unwrap();

        let err = renumber_pages_at(dir.path(), 1, "Scan", "01-01-25 09h00m").unwrap_err();
        assert!(matches!(err, DocumentError::NoPagesProduced { .. }));
        assert_eq!(listing(dir.path()).len(), 2);
    }

    #[test]
    fn all_pages_of_one_invocation_share_a_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        touch_temp_pages(dir.path(), 5);

        renumber_pages(dir.path(), 1, "Scan").unwrap();

        let stamps: Vec<String> = listing(dir.path())
            .iter()
            .map(|n| n.split('_').skip(2).collect::<Vec<_>>().join("_"))
            .collect();
        assert!(
            stamps.windows(2).all(|w| w[0] == w[1]),
            "timestamps differ: {stamps:?}"
        );
    }
}

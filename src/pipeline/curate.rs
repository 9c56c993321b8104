//! Source curation: operator-driven deletion of unwanted scans.
//!
//! ## Why a prompt trait?
//!
//! The curation loop is a blocking, human-in-the-loop state machine. Putting
//! the terminal behind the [`DeletionPrompt`] trait keeps the state machine
//! itself deterministic and unit-testable, and lets a service context swap
//! stdin for a scripted or API-driven decision source without touching the
//! orchestrator.
//!
//! ## The escape hatch
//!
//! An operator who types something non-numeric is re-prompted. An operator
//! who picks an out-of-range index gets one focused retry, and if the reply
//! is non-numeric *again*, the loop exits with "skip" rather than trapping a
//! confused operator forever. Deletion errors never abort the loop either;
//! the worst curation can do is nothing.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One file in the consume folder, as shown to the operator.
#[derive(Debug, Clone)]
pub struct ConsumeEntry {
    pub name: String,
    pub path: PathBuf,
    /// Creation time where the file system provides one; modification time
    /// otherwise (some Linux file systems have no birth time).
    pub created: Option<std::time::SystemTime>,
}

impl ConsumeEntry {
    fn created_display(&self) -> String {
        self.created
            .map(|t| DateTime::<Local>::from(t).format("%d-%m-%y %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Decision source for the curation loop.
pub trait DeletionPrompt {
    /// Show the indexed listing and return the operator's raw reply.
    /// Index 0 means "keep everything, continue the run".
    fn select(&mut self, entries: &[ConsumeEntry]) -> io::Result<String>;

    /// Re-prompt after an out-of-range index; `max_index` is the highest
    /// valid choice.
    fn retry(&mut self, max_index: usize) -> io::Result<String>;
}

/// Interactive prompt reading from stdin, writing the listing to stdout.
pub struct StdinPrompt;

impl DeletionPrompt for StdinPrompt {
    fn select(&mut self, entries: &[ConsumeEntry]) -> io::Result<String> {
        println!("\nFiles in the consume folder:");
        for (i, entry) in entries.iter().enumerate() {
            println!("  [{}] {}  ({})", i + 1, entry.name, entry.created_display());
        }
        print!("Enter the number of a file to delete, or 0 to continue: ");
        io::stdout().flush()?;
        read_reply()
    }

    fn retry(&mut self, max_index: usize) -> io::Result<String> {
        print!("Please enter a number between 0 and {max_index}: ");
        io::stdout().flush()?;
        read_reply()
    }
}

fn read_reply() -> io::Result<String> {
    let mut reply = String::new();
    io::stdin().read_line(&mut reply)?;
    Ok(reply)
}

/// What the curation loop did.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CurationOutcome {
    /// Files deleted on operator command.
    pub deleted: usize,
    /// True when the operator chose to continue (or the escape hatch fired)
    /// rather than the folder shrinking to one entry.
    pub skipped: bool,
}

/// Run the curation loop over `dir` until it has ≤ 1 entry or the operator
/// skips. Always succeeds: every error inside the loop is contained.
pub fn curate_consume_dir(dir: &Path, prompt: &mut dyn DeletionPrompt) -> CurationOutcome {
    let mut outcome = CurationOutcome::default();

    loop {
        // Re-read after every mutation so the shown indices always match
        // the directory contents.
        let entries = list_entries(dir);
        if entries.len() <= 1 {
            return outcome;
        }

        let reply = match prompt.select(&entries) {
            Ok(r) => r,
            Err(e) => {
                warn!("Curation prompt unavailable, continuing run: {e}");
                outcome.skipped = true;
                return outcome;
            }
        };

        let choice = match reply.trim().parse::<usize>() {
            Ok(n) => n,
            // Non-numeric: show the listing again.
            Err(_) => continue,
        };

        if choice == 0 {
            outcome.skipped = true;
            return outcome;
        }

        let choice = if choice <= entries.len() {
            choice
        } else {
            match reprompt_in_range(prompt, entries.len()) {
                Some(0) | None => {
                    outcome.skipped = true;
                    return outcome;
                }
                Some(n) => n,
            }
        };

        delete_entry(&entries[choice - 1], &mut outcome);
    }
}

/// Retry until the operator supplies an in-range number. A non-numeric reply
/// here is the escape hatch: `None` tells the caller to skip curation.
fn reprompt_in_range(prompt: &mut dyn DeletionPrompt, max_index: usize) -> Option<usize> {
    loop {
        let reply = match prompt.retry(max_index) {
            Ok(r) => r,
            Err(_) => return None,
        };
        match reply.trim().parse::<usize>() {
            Err(_) => return None,
            Ok(n) if n <= max_index => return Some(n),
            Ok(_) => continue,
        }
    }
}

fn delete_entry(entry: &ConsumeEntry, outcome: &mut CurationOutcome) {
    match std::fs::remove_file(&entry.path) {
        Ok(()) => {
            info!("Deleted {}", entry.name);
            outcome.deleted += 1;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("{} is already gone, skipping", entry.name);
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            warn!("No permission to delete {}", entry.name);
        }
        Err(e) => {
            warn!("Could not delete {}: {e}", entry.name);
        }
    }
}

/// Files directly under `dir`, sorted by name for stable indices.
pub fn list_entries(dir: &Path) -> Vec<ConsumeEntry> {
    let mut entries: Vec<ConsumeEntry> = match std::fs::read_dir(dir) {
        Ok(rd) => rd
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| {
                let created = e
                    .metadata()
                    .ok()
                    .and_then(|m| m.created().or_else(|_| m.modified()).ok());
                ConsumeEntry {
                    name: e.file_name().to_string_lossy().into_owned(),
                    path: e.path(),
                    created,
                }
            })
            .collect(),
        Err(e) => {
            warn!("Error accessing directory {}: {e}", dir.display());
            return Vec::new();
        }
    };
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Prompt fed from a fixed script of replies.
    struct ScriptedPrompt {
        replies: VecDeque<&'static str>,
        selects: usize,
        retries: usize,
    }

    impl ScriptedPrompt {
        fn new(replies: &[&'static str]) -> Self {
            Self {
                replies: replies.iter().copied().collect(),
                selects: 0,
                retries: 0,
            }
        }

        fn next_reply(&mut self) -> io::Result<String> {
            self.replies
                .pop_front()
                .map(|s| format!("{s}\n"))
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }
    }

    impl DeletionPrompt for ScriptedPrompt {
        fn select(&mut self, _entries: &[ConsumeEntry]) -> io::Result<String> {
            self.selects += 1;
            self.next_reply()
        }

        fn retry(&mut self, _max_index: usize) -> io::Result<String> {
            self.retries += 1;
            self.next_reply()
        }
    }

    fn seed_files(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), b"scan").unwrap();
        }
    }

    #[test]
    fn zero_at_first_prompt_exits_with_no_deletions() {
        let dir = tempfile::tempdir().unwrap();
        seed_files(dir.path(), &["a.pdf", "b.pdf", "c.pdf"]);
        let mut prompt = ScriptedPrompt::new(&["0"]);

        let outcome = curate_consume_dir(dir.path(), &mut prompt);

        assert_eq!(outcome.deleted, 0);
        assert!(outcome.skipped);
        assert_eq!(list_entries(dir.path()).len(), 3);
    }

    #[test]
    fn valid_index_deletes_that_file() {
        let dir = tempfile::tempdir().unwrap();
        seed_files(dir.path(), &["a.pdf", "b.pdf", "c.pdf"]);
        // Delete "b.pdf" (index 2 in the sorted listing), then continue.
        let mut prompt = ScriptedPrompt::new(&["2", "0"]);

        let outcome = curate_consume_dir(dir.path(), &mut prompt);

        assert_eq!(outcome.deleted, 1);
        assert!(!dir.path().join("b.pdf").exists());
        assert!(dir.path().join("a.pdf").exists());
    }

    #[test]
    fn loop_stops_when_one_entry_remains() {
        let dir = tempfile::tempdir().unwrap();
        seed_files(dir.path(), &["a.pdf", "b.pdf"]);
        let mut prompt = ScriptedPrompt::new(&["1"]);

        let outcome = curate_consume_dir(dir.path(), &mut prompt);

        assert_eq!(outcome.deleted, 1);
        assert!(!outcome.skipped);
        assert_eq!(list_entries(dir.path()).len(), 1);
    }

    #[test]
    fn non_numeric_input_reprompts() {
        let dir = tempfile::tempdir().unwrap();
        seed_files(dir.path(), &["a.pdf", "b.pdf", "c.pdf"]);
        let mut prompt = ScriptedPrompt::new(&["banana", "1", "0"]);

        let outcome = curate_consume_dir(dir.path(), &mut prompt);

        assert_eq!(prompt.selects, 3, "non-numeric reply must re-show the listing");
        assert_eq!(outcome.deleted, 1);
    }

    #[test]
    fn out_of_range_then_non_numeric_is_the_escape_hatch() {
        let dir = tempfile::tempdir().unwrap();
        seed_files(dir.path(), &["a.pdf", "b.pdf", "c.pdf"]);
        let mut prompt = ScriptedPrompt::new(&["99", "what"]);

        let outcome = curate_consume_dir(dir.path(), &mut prompt);

        assert_eq!(prompt.retries, 1);
        assert!(outcome.skipped);
        assert_eq!(outcome.deleted, 0);
        assert_eq!(list_entries(dir.path()).len(), 3);
    }

    #[test]
    fn out_of_range_then_valid_deletes() {
        let dir = tempfile::tempdir().unwrap();
        seed_files(dir.path(), &["a.pdf", "b.pdf", "c.pdf"]);
        let mut prompt = ScriptedPrompt::new(&["7", "3", "0"]);

        let outcome = curate_consume_dir(dir.path(), &mut prompt);

        assert_eq!(outcome.deleted, 1);
        assert!(!dir.path().join("c.pdf").exists());
    }

    #[test]
    fn missing_file_mid_loop_does_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        seed_files(dir.path(), &["a.pdf", "b.pdf", "c.pdf"]);

        /// Deletes the target out from under the loop before answering.
        struct RacingPrompt {
            dir: PathBuf,
            step: usize,
        }
        impl DeletionPrompt for RacingPrompt {
            fn select(&mut self, _entries: &[ConsumeEntry]) -> io::Result<String> {
                self.step += 1;
                match self.step {
                    1 => {
                        // The file vanishes between listing and deletion.
                        std::fs::remove_file(self.dir.join("a.pdf")).unwrap();
                        Ok("1\n".into())
                    }
                    _ => Ok("0\n".into()),
                }
            }
            fn retry(&mut self, _max: usize) -> io::Result<String> {
                Ok("0\n".into())
            }
        }

        let mut prompt = RacingPrompt {
            dir: dir.path().to_path_buf(),
            step: 0,
        };
        let outcome = curate_consume_dir(dir.path(), &mut prompt);

        // The NotFound was reported, not counted, and the loop went on.
        assert_eq!(outcome.deleted, 0);
        assert!(outcome.skipped);
    }

    #[test]
    fn single_entry_folder_never_prompts() {
        let dir = tempfile::tempdir().unwrap();
        seed_files(dir.path(), &["only.pdf"]);
        let mut prompt = ScriptedPrompt::new(&[]);

        let outcome = curate_consume_dir(dir.path(), &mut prompt);

        assert_eq!(prompt.selects, 0);
        assert_eq!(outcome.deleted, 0);
    }
}

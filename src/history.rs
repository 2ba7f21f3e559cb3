/// Rename history and undo.
///
/// The journal of the last successful rename is stored in the project root
/// so the rename can be reverted later with `pairfile undo`.
use crate::error::{PairError, PairResult};
use crate::filesystem::FileSystem;
use crate::rename::{RenameOutcome, Step};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Name of the history file kept in the project root.
pub const HISTORY_FILE_NAME: &str = ".pairfile_history.json";

/// Persisted record of one rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameLog {
    /// RFC 3339 timestamp of when the rename happened.
    pub timestamp: String,
    pub old_base: String,
    pub new_base: String,
    /// Mutations in the order they were applied.
    pub steps: Vec<Step>,
}

impl RenameLog {
    /// Builds a log entry from a completed rename.
    pub fn from_outcome(outcome: &RenameOutcome) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            old_base: outcome.old_base.clone(),
            new_base: outcome.new_base.clone(),
            steps: outcome.journal.steps().to_vec(),
        }
    }

    /// Returns the path to the history file for this project root.
    pub fn history_file_path(root: &Path) -> PathBuf {
        root.join(HISTORY_FILE_NAME)
    }

    /// Saves this log, replacing any previous one.
    pub fn save<F: FileSystem + ?Sized>(&self, fs: &F, root: &Path) -> PairResult<()> {
        let history_path = Self::history_file_path(root);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PairError::History(format!("JSON serialization failed: {e}")))?;

        fs.write(&history_path, &json)
            .map_err(|e| PairError::io(&history_path, e))
    }

    /// Loads the most recent log, if there is one.
    pub fn load<F: FileSystem + ?Sized>(fs: &F, root: &Path) -> PairResult<Option<Self>> {
        let history_path = Self::history_file_path(root);

        let json = match fs.read_to_string(&history_path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PairError::io(&history_path, e)),
        };

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| PairError::History(format!("invalid history file: {e}")))
    }

    /// Deletes the history file for this project root.
    pub fn delete<F: FileSystem + ?Sized>(fs: &F, root: &Path) -> PairResult<()> {
        let history_path = Self::history_file_path(root);
        if fs.exists(&history_path) {
            fs.remove_file(&history_path)
                .map_err(|e| PairError::io(&history_path, e))?;
        }
        Ok(())
    }
}

/// Represents the result of an undo operation.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Base name the pair had before the reverted rename.
    pub restored_base: String,
    /// Number of steps successfully reverted.
    pub reverted_steps: usize,
    /// Steps that could not be reverted.
    pub failed_steps: Vec<(PathBuf, String)>,
    /// Steps left alone (file gone or edited since).
    pub skipped_steps: Vec<(PathBuf, String)>,
}

impl UndoReport {
    /// Returns true if every step was reverted.
    pub fn is_complete_success(&self) -> bool {
        self.failed_steps.is_empty() && self.skipped_steps.is_empty()
    }
}

/// Outcome of reverting a single step.
enum Revert {
    Done,
    Skipped(PathBuf, String),
    Failed(PathBuf, String),
}

/// Manages undo of the last rename.
pub struct UndoManager;

impl UndoManager {
    /// Reverts the most recent rename recorded under `root`.
    ///
    /// Steps are reverted newest first. A file that has since moved away is
    /// skipped, as is a file whose content was edited after the rename. A file
    /// occupying an original name is backed up with a timestamp suffix. The
    /// history file is deleted only when every step was reverted.
    ///
    /// # Errors
    ///
    /// [`PairError::History`] if there is nothing to undo or the history file
    /// cannot be parsed.
    pub fn undo<F: FileSystem + ?Sized>(fs: &F, root: &Path) -> PairResult<UndoReport> {
        let log = RenameLog::load(fs, root)?
            .ok_or_else(|| PairError::History("No previous rename found to undo".to_string()))?;

        let mut report = UndoReport {
            restored_base: log.old_base.clone(),
            ..UndoReport::default()
        };

        for step in log.steps.iter().rev() {
            match Self::revert(fs, step) {
                Revert::Done => report.reverted_steps += 1,
                Revert::Skipped(path, reason) => {
                    tracing::warn!(path = %path.display(), reason = %reason, "undo step skipped");
                    report.skipped_steps.push((path, reason));
                }
                Revert::Failed(path, reason) => {
                    tracing::error!(path = %path.display(), reason = %reason, "undo step failed");
                    report.failed_steps.push((path, reason));
                }
            }
        }

        if report.is_complete_success()
            && let Err(e) = RenameLog::delete(fs, root)
        {
            tracing::warn!(error = %e, "could not delete history file");
        }

        Ok(report)
    }

    fn revert<F: FileSystem + ?Sized>(fs: &F, step: &Step) -> Revert {
        match step {
            Step::Renamed { from, to } => {
                if !fs.exists(to) {
                    return Revert::Skipped(
                        to.clone(),
                        "File not found at expected location".to_string(),
                    );
                }
                if fs.exists(from) && !fs.same_file(from, to) {
                    let backup = Self::generate_backup_path(from);
                    if let Err(e) = fs.rename(from, &backup) {
                        return Revert::Failed(
                            from.clone(),
                            format!("Could not backup conflicting file: {e}"),
                        );
                    }
                }
                match fs.rename(to, from) {
                    Ok(()) => Revert::Done,
                    Err(e) => Revert::Failed(to.clone(), format!("Failed to restore file: {e}")),
                }
            }
            Step::Rewrote {
                path,
                previous,
                written,
            } => match fs.read_to_string(path) {
                Ok(current) if &current == written => match fs.write(path, previous) {
                    Ok(()) => Revert::Done,
                    Err(e) => Revert::Failed(path.clone(), format!("Failed to restore content: {e}")),
                },
                Ok(_) => Revert::Skipped(path.clone(), "File was modified after the rename".to_string()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    Revert::Skipped(path.clone(), "File not found at expected location".to_string())
                }
                Err(e) => Revert::Failed(path.clone(), format!("Could not read file: {e}")),
            },
        }
    }

    /// Generates a backup path for a file by appending a timestamp.
    ///
    /// Example: `foo.h` becomes `foo.h.bak.20251109-143052`
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file");

        original_path.with_file_name(format!("{filename}.bak.{timestamp}"))
    }
}

//! Output formatting and styling module.
//!
//! Provides a centralized interface for all user-facing CLI output: colored
//! status lines, the search spinner, and the per-command summaries.

use crate::creator::FileOutcome;
use crate::history::UndoReport;
use crate::rename::RenameOutcome;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pairfile::output::OutputFormatter;
    /// OutputFormatter::success("Header file created: include/widget.hpp");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Creates a spinner shown while the project tree is scanned.
    ///
    /// Draws to stderr and stays hidden when stderr is not a terminal.
    pub fn create_spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    /// Reports one file of a newly created pair.
    pub fn file_outcome(kind: &str, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Created(path) => {
                Self::success(&format!("{} created: {}", kind, path.display()))
            }
            FileOutcome::AlreadyExists(path) => {
                Self::warning(&format!("{} already exists: {}", kind, path.display()))
            }
        }
    }

    /// Reports a completed rename.
    pub fn rename_summary(outcome: &RenameOutcome) {
        Self::success(&format!(
            "Renamed: {} → {}",
            outcome.old_base, outcome.new_base
        ));
        println!("   {}", outcome.header.display());
        println!("   {}", outcome.source.display());
    }

    /// Reports the result of an undo.
    pub fn undo_summary(report: &UndoReport) {
        if report.is_complete_success() {
            Self::success(&format!("Undo complete! Restored '{}'", report.restored_base));
        } else {
            Self::warning("Undo finished with problems");
        }
        println!("  Reverted: {}", report.reverted_steps);

        if !report.skipped_steps.is_empty() {
            println!("  Skipped: {}", report.skipped_steps.len());
            for (path, reason) in &report.skipped_steps {
                println!("    - {}: {}", path.display(), reason);
            }
        }

        if !report.failed_steps.is_empty() {
            println!("  Failed: {}", report.failed_steps.len());
            for (path, reason) in &report.failed_steps {
                eprintln!("    - {}: {}", path.display(), reason);
            }
        }

        if !report.is_complete_success() {
            Self::warning("History file was NOT deleted. Fix the issues above and try again.");
        }
    }
}

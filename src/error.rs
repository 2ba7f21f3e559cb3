//! Error types shared by the pair-file operations.
//!
//! Every command funnels its failures into [`PairError`]; the binary prints
//! them once at the command boundary and never retries.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while creating, renaming or restoring pair files.
#[derive(Debug, Error)]
pub enum PairError {
    /// The project root does not exist or is not a directory.
    #[error("No project root is available at {}", .0.display())]
    NoWorkspace(PathBuf),

    /// Rename was invoked without a file to operate on.
    #[error("No file selected or open for renaming")]
    NoActiveFile,

    /// A prompt was dismissed. Not reported to the user.
    #[error("Operation cancelled")]
    UserCancelled,

    /// The base name entered cannot be used as a file name.
    #[error("Invalid base name '{name}': {reason}")]
    InvalidBaseName { name: String, reason: String },

    /// No file with the same base name and the opposite class was found.
    #[error("No pair file found for {0}")]
    NoCounterpartFound(String),

    /// The extension is not one of the configured header extensions.
    #[error("'{0}' is not a recognized header extension")]
    NotAHeader(String),

    /// The extension is not one of the configured source extensions.
    #[error("'{0}' is not a recognized source extension")]
    NotASource(String),

    /// A file expected to exist has gone missing.
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// A manually selected directory does not exist.
    #[error("Directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// The creation or rename target is already present.
    #[error("File already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// The include directive cannot be built without a header extension.
    #[error("Could not determine the header file extension")]
    HeaderExtensionMissing,

    /// A filesystem call failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be loaded or is inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The rename history is missing or unreadable.
    #[error("Rename history error: {0}")]
    History(String),

    /// An operation failed and some of its compensating actions failed too.
    #[error("{cause}; rollback incomplete ({} step(s) could not be reverted)", failures.len())]
    RollbackIncomplete {
        cause: Box<PairError>,
        failures: Vec<(PathBuf, String)>,
    },
}

impl PairError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the silent, user-initiated abort.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }
}

/// Result type for pair-file operations.
pub type PairResult<T> = Result<T, PairError>;

//! Creation of new header/source pairs.

use crate::config::Settings;
use crate::error::{PairError, PairResult};
use crate::filesystem::FileSystem;
use crate::guard::{creation_token, header_template};
use crate::include::source_template;
use std::io;
use std::path::{Path, PathBuf};

/// What happened to one file of a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was written.
    Created(PathBuf),
    /// A file was already present and was left untouched.
    AlreadyExists(PathBuf),
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Created(path) | FileOutcome::AlreadyExists(path) => path,
        }
    }
}

/// Writes the initial content of new pair files, never overwriting.
pub struct PairFileCreator<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    settings: &'a Settings,
}

impl<'a, F: FileSystem + ?Sized> PairFileCreator<'a, F> {
    pub fn new(fs: &'a F, settings: &'a Settings) -> Self {
        Self { fs, settings }
    }

    /// Creates a header guarded according to the configured style.
    ///
    /// # Errors
    ///
    /// [`PairError::AlreadyExists`] if `path` is present; the file is not touched.
    pub fn create_header(
        &self,
        path: &Path,
        base_name: &str,
        header_extension: &str,
    ) -> PairResult<PathBuf> {
        let token = creation_token(base_name, header_extension, self.settings.guard_suffix);
        let contents = header_template(self.settings.guard_style, &token);
        self.write_new(path, &contents)
    }

    /// Creates a source file that includes `<base_name><header_extension>`.
    ///
    /// # Errors
    ///
    /// [`PairError::AlreadyExists`] if `path` is present; the file is not touched.
    pub fn create_source(
        &self,
        path: &Path,
        base_name: &str,
        header_extension: &str,
    ) -> PairResult<PathBuf> {
        if header_extension.is_empty() {
            return Err(PairError::HeaderExtensionMissing);
        }
        let contents = source_template(base_name, header_extension);
        self.write_new(path, &contents)
    }

    /// Creates `dir` and its parents if missing. Only used for the default folders.
    pub fn ensure_directory(&self, dir: &Path) -> PairResult<()> {
        if self.fs.is_dir(dir) {
            return Ok(());
        }
        if !self.settings.create_missing_folders {
            return Err(PairError::MissingDirectory(dir.to_path_buf()));
        }
        tracing::info!(dir = %dir.display(), "creating directory");
        self.fs
            .create_dir_all(dir)
            .map_err(|e| PairError::io(dir, e))
    }

    fn write_new(&self, path: &Path, contents: &str) -> PairResult<PathBuf> {
        match self.fs.create_new(path, contents) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "created file");
                Ok(path.to_path_buf())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::warn!(path = %path.display(), "file already exists, not overwriting");
                Err(PairError::AlreadyExists(path.to_path_buf()))
            }
            Err(e) => Err(PairError::io(path, e)),
        }
    }
}

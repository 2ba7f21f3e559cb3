//! Renaming a header/source pair.
//!
//! [`PairRenamer`] walks a fixed sequence of stages:
//!
//! `Start → Located → Matched → Classified → GuardUpdated → IncludeUpdated → Renamed → Done`
//!
//! Contents are rewritten before either file is renamed. Every mutation is
//! recorded in a [`Journal`]; if a later step fails, the recorded steps are
//! undone in reverse order before the error is returned.

use crate::config::Settings;
use crate::error::{PairError, PairResult};
use crate::filesystem::FileSystem;
use crate::guard::rewrite_guard;
use crate::include::rewrite_include;
use crate::matcher::{FileClass, find_counterparts, split_file_name};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Where a rename currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameStage {
    Start,
    Located,
    Matched,
    Classified,
    GuardUpdated,
    IncludeUpdated,
    Renamed,
    Done,
}

/// A single recorded mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// File content replaced in place.
    Rewrote {
        path: PathBuf,
        previous: String,
        written: String,
    },
    /// File moved from one path to another.
    Renamed { from: PathBuf, to: PathBuf },
}

impl Step {
    /// Reverses this step unconditionally.
    fn compensate<F: FileSystem + ?Sized>(&self, fs: &F) -> io::Result<()> {
        match self {
            Step::Rewrote { path, previous, .. } => fs.write(path, previous),
            Step::Renamed { from, to } => fs.rename(to, from),
        }
    }

    /// The path this step leaves behind.
    pub fn current_path(&self) -> &Path {
        match self {
            Step::Rewrote { path, .. } => path,
            Step::Renamed { to, .. } => to,
        }
    }
}

/// Ordered record of the mutations performed by one rename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    steps: Vec<Step>,
}

impl Journal {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn record(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Undoes every recorded step, newest first.
    ///
    /// Returns the steps that could not be reverted.
    pub fn rollback<F: FileSystem + ?Sized>(&self, fs: &F) -> Vec<(PathBuf, String)> {
        let mut failures = Vec::new();
        for step in self.steps.iter().rev() {
            if let Err(e) = step.compensate(fs) {
                tracing::error!(path = %step.current_path().display(), error = %e, "rollback step failed");
                failures.push((step.current_path().to_path_buf(), e.to_string()));
            }
        }
        failures
    }
}

/// The active file, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub path: PathBuf,
    pub base_name: String,
    pub extension: String,
}

/// A pair whose header and source roles are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPair {
    pub header: PathBuf,
    pub source: PathBuf,
}

/// Result of a completed rename.
#[derive(Debug, Clone)]
pub struct RenameOutcome {
    pub old_base: String,
    pub new_base: String,
    /// New header path.
    pub header: PathBuf,
    /// New source path.
    pub source: PathBuf,
    /// Everything that was changed, for the rename history.
    pub journal: Journal,
}

/// Sequences a single pair rename.
pub struct PairRenamer<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    settings: &'a Settings,
    stage: RenameStage,
    journal: Journal,
}

impl<'a, F: FileSystem + ?Sized> PairRenamer<'a, F> {
    pub fn new(fs: &'a F, settings: &'a Settings) -> Self {
        Self {
            fs,
            settings,
            stage: RenameStage::Start,
            journal: Journal::default(),
        }
    }

    pub fn stage(&self) -> RenameStage {
        self.stage
    }

    fn advance(&mut self, next: RenameStage) {
        tracing::debug!(from = ?self.stage, to = ?next, "rename stage");
        self.stage = next;
    }

    /// Resolves the active file.
    ///
    /// # Errors
    ///
    /// [`PairError::MissingFile`] if the file does not exist.
    pub fn locate(&mut self, active: &Path) -> PairResult<Located> {
        if !self.fs.exists(active) || self.fs.is_dir(active) {
            return Err(PairError::MissingFile(active.to_path_buf()));
        }
        let (base_name, extension) = split_file_name(active);
        self.advance(RenameStage::Located);
        Ok(Located {
            path: active.to_path_buf(),
            base_name,
            extension,
        })
    }

    /// Finds counterpart candidates for the active file under `root`,
    /// excluding the active file itself.
    pub fn candidates(&self, root: &Path, located: &Located) -> Vec<PathBuf> {
        let search = find_counterparts(
            self.fs,
            root,
            &located.base_name,
            &located.extension,
            &self.settings.extensions,
            |name| self.settings.is_excluded_dir(name),
        );
        for (dir, reason) in &search.errors {
            tracing::warn!(dir = %dir.display(), reason = %reason, "directory skipped during search");
        }
        search
            .matches
            .into_iter()
            .filter(|path| path != &located.path)
            .collect()
    }

    /// Records the chosen counterpart and decides which file is the header.
    ///
    /// # Errors
    ///
    /// [`PairError::NotAHeader`] or [`PairError::NotASource`] if the two
    /// files are not one of each class.
    pub fn classify(&mut self, located: &Located, pair: &Path) -> PairResult<ClassifiedPair> {
        self.advance(RenameStage::Matched);

        let sets = &self.settings.extensions;
        let (_, pair_extension) = split_file_name(pair);
        let classified = match (sets.classify(&located.extension), sets.classify(&pair_extension)) {
            (Some(FileClass::Header), Some(FileClass::Source)) => ClassifiedPair {
                header: located.path.clone(),
                source: pair.to_path_buf(),
            },
            (Some(FileClass::Source), Some(FileClass::Header)) => ClassifiedPair {
                header: pair.to_path_buf(),
                source: located.path.clone(),
            },
            (Some(FileClass::Header), _) => return Err(PairError::NotASource(pair_extension)),
            (Some(FileClass::Source), _) => return Err(PairError::NotAHeader(pair_extension)),
            (None, _) => return Err(PairError::NotAHeader(located.extension.clone())),
        };

        self.advance(RenameStage::Classified);
        Ok(classified)
    }

    /// Rewrites and renames both files to `new_base`.
    ///
    /// Nothing is touched if either target name is already taken by another
    /// file. A target that is the file itself under a different case is not
    /// a conflict. If a step
    /// fails after the first mutation, the journal is rolled back.
    ///
    /// # Errors
    ///
    /// [`PairError::AlreadyExists`] for a taken target, the failing step's
    /// error after a clean rollback, or [`PairError::RollbackIncomplete`].
    pub fn execute(&mut self, pair: &ClassifiedPair, new_base: &str) -> PairResult<RenameOutcome> {
        let (old_base, header_ext) = split_file_name(&pair.header);
        let (_, source_ext) = split_file_name(&pair.source);
        let header_target = sibling(&pair.header, new_base, &header_ext);
        let source_target = sibling(&pair.source, new_base, &source_ext);

        for (from, to) in [(&pair.header, &header_target), (&pair.source, &source_target)] {
            if from != to && self.fs.exists(to) && !self.fs.same_file(from, to) {
                return Err(PairError::AlreadyExists(to.clone()));
            }
        }

        let applied = self.apply(pair, new_base, &header_ext, &header_target, &source_target);
        if let Err(cause) = applied {
            return Err(self.roll_back(cause));
        }

        self.advance(RenameStage::Done);
        Ok(RenameOutcome {
            old_base,
            new_base: new_base.to_string(),
            header: header_target,
            source: source_target,
            journal: std::mem::take(&mut self.journal),
        })
    }

    fn apply(
        &mut self,
        pair: &ClassifiedPair,
        new_base: &str,
        header_ext: &str,
        header_target: &Path,
        source_target: &Path,
    ) -> PairResult<()> {
        let header_text = self.read(&pair.header)?;
        let rewritten = rewrite_guard(&header_text, new_base, header_ext, &self.settings.extensions)?;
        self.rewrite(&pair.header, header_text, rewritten)?;
        self.advance(RenameStage::GuardUpdated);

        let source_text = self.read(&pair.source)?;
        let rewritten = rewrite_include(&source_text, new_base, header_ext)?;
        self.rewrite(&pair.source, source_text, rewritten)?;
        self.advance(RenameStage::IncludeUpdated);

        self.move_file(&pair.header, header_target)?;
        self.move_file(&pair.source, source_target)?;
        self.advance(RenameStage::Renamed);
        Ok(())
    }

    fn read(&self, path: &Path) -> PairResult<String> {
        self.fs.read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PairError::MissingFile(path.to_path_buf()),
            _ => PairError::io(path, e),
        })
    }

    fn rewrite(&mut self, path: &Path, previous: String, written: String) -> PairResult<()> {
        if previous == written {
            tracing::debug!(path = %path.display(), "content unchanged");
            return Ok(());
        }
        self.fs
            .write(path, &written)
            .map_err(|e| PairError::io(path, e))?;
        self.journal.record(Step::Rewrote {
            path: path.to_path_buf(),
            previous,
            written,
        });
        Ok(())
    }

    fn move_file(&mut self, from: &Path, to: &Path) -> PairResult<()> {
        if from == to {
            return Ok(());
        }
        self.fs.rename(from, to).map_err(|e| PairError::io(from, e))?;
        tracing::info!(from = %from.display(), to = %to.display(), "renamed");
        self.journal.record(Step::Renamed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        Ok(())
    }

    fn roll_back(&mut self, cause: PairError) -> PairError {
        tracing::warn!(stage = ?self.stage, error = %cause, "rename failed, rolling back");
        let journal = std::mem::take(&mut self.journal);
        let failures = journal.rollback(self.fs);
        if failures.is_empty() {
            cause
        } else {
            PairError::RollbackIncomplete {
                cause: Box::new(cause),
                failures,
            }
        }
    }
}

/// `<dir of path>/<new_base><extension>`.
fn sibling(path: &Path, new_base: &str, extension: &str) -> PathBuf {
    path.with_file_name(format!("{new_base}{extension}"))
}

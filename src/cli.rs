//! Command-line interface module for pairfile.
//!
//! This module handles all CLI-related functionality including:
//! - Command parsing
//! - The create, rename and undo workflows
//! - Reporting errors at the command boundary

use crate::catalog::{display_name, list_directories};
use crate::config::{PairConfig, Settings};
use crate::creator::{FileOutcome, PairFileCreator};
use crate::error::{PairError, PairResult};
use crate::filesystem::{FileSystem, RealFs};
use crate::history::{RenameLog, UndoManager, UndoReport};
use crate::matcher::FileClass;
use crate::output::OutputFormatter;
use crate::prompt::{Prompter, TerminalPrompter};
use crate::rename::{PairRenamer, RenameOutcome};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Create and rename paired C/C++ header and source files.
#[derive(Debug, Parser)]
#[command(name = "pairfile", version, about)]
pub struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Configuration file (defaults to <root>/.pairfilerc.toml, then ~/.config/pairfile/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: PairCommand,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Subcommand)]
pub enum PairCommand {
    /// Create a new header/source pair
    Create(CreateRequest),
    /// Rename a file together with its pair
    Rename(RenameRequest),
    /// Revert the last rename
    Undo,
}

/// Arguments of `pairfile create`. Anything omitted is prompted for.
#[derive(Debug, Clone, Default, Args)]
pub struct CreateRequest {
    /// Base name for the new files
    pub name: Option<String>,

    /// Header extension, one of the configured header extensions
    #[arg(long, value_name = "EXT")]
    pub header_ext: Option<String>,

    /// Source extension, one of the configured source extensions
    #[arg(long, value_name = "EXT")]
    pub source_ext: Option<String>,

    /// Existing directory for the header, relative to the project root
    #[arg(long, value_name = "DIR")]
    pub header_dir: Option<PathBuf>,

    /// Existing directory for the source, relative to the project root
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,
}

/// Arguments of `pairfile rename`.
#[derive(Debug, Clone, Default, Args)]
pub struct RenameRequest {
    /// The header or source file to rename
    pub file: Option<PathBuf>,

    /// New base name (prompted for if omitted)
    #[arg(long = "to", value_name = "NAME")]
    pub new_name: Option<String>,
}

/// What `create` did to each file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReport {
    pub header: FileOutcome,
    pub source: FileOutcome,
}

/// Runs a command against the real filesystem with terminal prompts.
///
/// `UserCancelled` is returned like any other error; callers decide to stay
/// silent about it (see [`report_error`]).
pub fn run_cli(command: PairCommand, root: &Path, config_path: Option<&Path>) -> PairResult<()> {
    let root = root
        .canonicalize()
        .map_err(|_| PairError::NoWorkspace(root.to_path_buf()))?;
    let fs = RealFs;
    if !fs.is_dir(&root) {
        return Err(PairError::NoWorkspace(root));
    }
    tracing::debug!(root = %root.display(), "project root");

    let load_settings = || -> PairResult<Settings> {
        Ok(PairConfig::load(config_path, &root)?.compile()?)
    };

    match command {
        PairCommand::Create(request) => {
            let settings = load_settings()?;
            let mut prompter = TerminalPrompter::stdio();
            let report = create_pair_files(&fs, &settings, &root, &request, &mut prompter)?;
            OutputFormatter::file_outcome("Header file", &report.header);
            OutputFormatter::file_outcome("Source file", &report.source);
        }
        PairCommand::Rename(mut request) => {
            let settings = load_settings()?;
            if let Some(file) = &request.file
                && let Ok(absolute) = file.canonicalize()
            {
                request.file = Some(absolute);
            }
            let mut prompter = TerminalPrompter::stdio();
            let outcome = rename_pair_files(&fs, &settings, &root, &request, &mut prompter)?;
            OutputFormatter::rename_summary(&outcome);
        }
        PairCommand::Undo => {
            OutputFormatter::info("Undoing previous rename...");
            let report = undo_last_rename(&fs, &root)?;
            OutputFormatter::undo_summary(&report);
        }
    }

    Ok(())
}

/// Prints an error from [`run_cli`]. Cancellation prints nothing.
pub fn report_error(error: &PairError) {
    if error.is_cancellation() {
        tracing::debug!("operation cancelled by user");
        return;
    }
    OutputFormatter::error(&error.to_string());
    if let PairError::RollbackIncomplete { failures, .. } = error {
        for (path, reason) in failures {
            eprintln!("    - {}: {}", path.display(), reason);
        }
        OutputFormatter::warning("Some files were left partially renamed. Please check them.");
    }
}

/// Creates a new header/source pair.
///
/// Prompts for whatever `request` leaves out: base name, header and source
/// extensions, and, with manual folder selection, the two directories. All
/// prompts happen before anything is written. Each file is created only if
/// absent; an existing file is reported as [`FileOutcome::AlreadyExists`].
pub fn create_pair_files<F, P>(
    fs: &F,
    settings: &Settings,
    root: &Path,
    request: &CreateRequest,
    prompter: &mut P,
) -> PairResult<CreateReport>
where
    F: FileSystem + ?Sized,
    P: Prompter + ?Sized,
{
    let base_name = match &request.name {
        Some(name) => name.clone(),
        None => prompter
            .input("Base name for the new header and source files", None)?
            .ok_or(PairError::UserCancelled)?,
    };
    validate_base_name(&base_name)?;

    let header_ext = pick_extension(
        prompter,
        settings,
        FileClass::Header,
        request.header_ext.as_deref(),
        "Select the extension for the header file",
    )?;
    let source_ext = pick_extension(
        prompter,
        settings,
        FileClass::Source,
        request.source_ext.as_deref(),
        "Select the extension for the source file",
    )?;

    let mut picker = DirectoryPicker::new(fs, settings, root);
    let (header_dir, create_header_dir) = picker.pick(
        prompter,
        request.header_dir.as_deref(),
        &settings.include_folder,
        "Select the directory for the header file",
    )?;
    let (source_dir, create_source_dir) = picker.pick(
        prompter,
        request.source_dir.as_deref(),
        &settings.src_folder,
        "Select the directory for the source file",
    )?;

    let creator = PairFileCreator::new(fs, settings);
    if create_header_dir {
        creator.ensure_directory(&header_dir)?;
    }
    if create_source_dir {
        creator.ensure_directory(&source_dir)?;
    }

    let header_path = header_dir.join(format!("{base_name}{header_ext}"));
    let source_path = source_dir.join(format!("{base_name}{source_ext}"));

    let header = file_outcome(creator.create_header(&header_path, &base_name, &header_ext))?;
    let source = file_outcome(creator.create_source(&source_path, &base_name, &header_ext))?;

    Ok(CreateReport { header, source })
}

/// Renames the active file and its pair to a new base name.
///
/// The counterpart is searched for under `root`; several candidates are
/// offered through the prompter. A successful rename is recorded in the
/// project's rename history so it can be undone.
pub fn rename_pair_files<F, P>(
    fs: &F,
    settings: &Settings,
    root: &Path,
    request: &RenameRequest,
    prompter: &mut P,
) -> PairResult<RenameOutcome>
where
    F: FileSystem + ?Sized,
    P: Prompter + ?Sized,
{
    let active = request.file.as_deref().ok_or(PairError::NoActiveFile)?;
    let mut renamer = PairRenamer::new(fs, settings);
    let located = renamer.locate(active)?;

    let new_base = match &request.new_name {
        Some(name) => name.clone(),
        None => prompter
            .input("New base name for the pair", Some(&located.base_name))?
            .ok_or(PairError::UserCancelled)?,
    };
    validate_base_name(&new_base)?;

    let spinner = OutputFormatter::create_spinner("Searching for pair files...");
    let mut candidates = renamer.candidates(root, &located);
    spinner.finish_and_clear();

    let pair = match candidates.len() {
        0 => return Err(PairError::NoCounterpartFound(located.base_name.clone())),
        1 => candidates.swap_remove(0),
        _ => {
            let labels: Vec<String> = candidates.iter().map(|c| display_name(root, c)).collect();
            let index = prompter
                .choose("Select the correct pair file", &labels)?
                .filter(|&i| i < candidates.len())
                .ok_or(PairError::UserCancelled)?;
            candidates.swap_remove(index)
        }
    };

    let classified = renamer.classify(&located, &pair)?;
    let outcome = renamer.execute(&classified, &new_base)?;

    if !outcome.journal.is_empty()
        && let Err(e) = RenameLog::from_outcome(&outcome).save(fs, root)
    {
        tracing::warn!(error = %e, "could not save rename history");
        OutputFormatter::warning(&format!("Could not save rename history: {e}"));
    }

    Ok(outcome)
}

/// Reverts the last rename recorded under `root`.
pub fn undo_last_rename<F: FileSystem + ?Sized>(fs: &F, root: &Path) -> PairResult<UndoReport> {
    UndoManager::undo(fs, root)
}

/// Checks that a base name can be used as a file name inside one directory.
pub fn validate_base_name(name: &str) -> PairResult<()> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name.trim() != name {
        "must not start or end with whitespace"
    } else if name.contains(['/', '\\']) {
        "must not contain path separators"
    } else if name == "." || name == ".." {
        "is not a valid file name"
    } else {
        return Ok(());
    };
    Err(PairError::InvalidBaseName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Takes the extension given on the command line or prompts for one.
fn pick_extension<P: Prompter + ?Sized>(
    prompter: &mut P,
    settings: &Settings,
    class: FileClass,
    given: Option<&str>,
    prompt: &str,
) -> PairResult<String> {
    let sets = &settings.extensions;
    let choices = match class {
        FileClass::Header => sets.header(),
        FileClass::Source => sets.source(),
    };

    let Some(given) = given else {
        let index = prompter
            .choose(prompt, choices)?
            .filter(|&i| i < choices.len())
            .ok_or(PairError::UserCancelled)?;
        return Ok(choices[index].clone());
    };

    let ext = if given.starts_with('.') {
        given.to_string()
    } else {
        format!(".{given}")
    };
    match class {
        FileClass::Header if !sets.is_header(&ext) => Err(PairError::NotAHeader(ext)),
        FileClass::Source if !sets.is_source(&ext) => Err(PairError::NotASource(ext)),
        _ => Ok(ext),
    }
}

fn file_outcome(result: PairResult<PathBuf>) -> PairResult<FileOutcome> {
    match result {
        Ok(path) => Ok(FileOutcome::Created(path)),
        Err(PairError::AlreadyExists(path)) => Ok(FileOutcome::AlreadyExists(path)),
        Err(e) => Err(e),
    }
}

/// Resolves target directories for `create`, listing the tree at most once.
struct DirectoryPicker<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    settings: &'a Settings,
    root: &'a Path,
    catalog: Option<Vec<PathBuf>>,
}

impl<'a, F: FileSystem + ?Sized> DirectoryPicker<'a, F> {
    fn new(fs: &'a F, settings: &'a Settings, root: &'a Path) -> Self {
        Self {
            fs,
            settings,
            root,
            catalog: None,
        }
    }

    /// Returns the directory and whether it may be created when missing.
    ///
    /// Explicit and manually selected directories must already exist; only
    /// the configured default folder may be created.
    fn pick<P: Prompter + ?Sized>(
        &mut self,
        prompter: &mut P,
        explicit: Option<&Path>,
        default: &Path,
        prompt: &str,
    ) -> PairResult<(PathBuf, bool)> {
        if let Some(dir) = explicit {
            let dir = self.root.join(dir);
            return self.existing(dir);
        }

        if !self.settings.manual_folder_selection {
            return Ok((self.root.join(default), true));
        }

        let (fs, settings, root) = (self.fs, self.settings, self.root);
        let dirs = self.catalog.get_or_insert_with(|| {
            let listing = list_directories(fs, root, settings);
            for (dir, reason) in &listing.errors {
                OutputFormatter::warning(&format!(
                    "Error reading directory {}: {}",
                    dir.display(),
                    reason
                ));
            }
            listing.directories
        });

        let labels: Vec<String> = dirs.iter().map(|d| display_name(root, d)).collect();
        let dir = prompter
            .choose(prompt, &labels)?
            .and_then(|i| dirs.get(i).cloned())
            .ok_or(PairError::UserCancelled)?;
        self.existing(dir)
    }

    fn existing(&self, dir: PathBuf) -> PairResult<(PathBuf, bool)> {
        if self.fs.is_dir(&dir) {
            Ok((dir, false))
        } else {
            Err(PairError::MissingDirectory(dir))
        }
    }
}

//! Directory traversal over a [`FileSystem`].
//!
//! [`walk`] is the shared traversal used both for listing candidate
//! directories and for finding counterpart files. Which directories are
//! skipped is decided by a caller-supplied predicate on the directory name.

use crate::config::Settings;
use crate::filesystem::{Entry, EntryKind, FileSystem};
use std::path::{Path, PathBuf};

/// A directory that could not be read, with the reason.
pub type TraversalError = (PathBuf, String);

/// Result of [`list_directories`].
#[derive(Debug, Default)]
pub struct DirectoryListing {
    /// Directories in pre-order, starting with the root.
    pub directories: Vec<PathBuf>,
    /// Directories that could not be read.
    pub errors: Vec<TraversalError>,
}

/// Recursively visits every entry below `root`.
///
/// Directories are visited before their children. A directory for which
/// `should_skip` returns true is neither visited nor descended into. Read
/// failures are collected and the walk continues with the next sibling.
pub fn walk<F, S, V>(fs: &F, root: &Path, should_skip: S, mut visit: V) -> Vec<TraversalError>
where
    F: FileSystem + ?Sized,
    S: Fn(&str) -> bool,
    V: FnMut(&Entry),
{
    let mut errors = Vec::new();
    walk_dir(fs, root, &should_skip, &mut visit, &mut errors);
    errors
}

fn walk_dir<F, S, V>(
    fs: &F,
    dir: &Path,
    should_skip: &S,
    visit: &mut V,
    errors: &mut Vec<TraversalError>,
) where
    F: FileSystem + ?Sized,
    S: Fn(&str) -> bool,
    V: FnMut(&Entry),
{
    let entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "could not read directory");
            errors.push((dir.to_path_buf(), e.to_string()));
            return;
        }
    };

    for entry in entries {
        match entry.kind {
            EntryKind::Directory => {
                if should_skip(&entry.name) {
                    tracing::trace!(dir = %entry.path.display(), "skipping excluded directory");
                    continue;
                }
                visit(&entry);
                walk_dir(fs, &entry.path, should_skip, visit, errors);
            }
            _ => visit(&entry),
        }
    }
}

/// Lists `root` and every directory below it, honouring the configured denylist.
///
/// An unreadable root yields an empty listing with one error.
pub fn list_directories<F: FileSystem + ?Sized>(
    fs: &F,
    root: &Path,
    settings: &Settings,
) -> DirectoryListing {
    let mut directories = vec![root.to_path_buf()];
    let errors = walk(
        fs,
        root,
        |name| settings.is_excluded_dir(name),
        |entry| {
            if entry.kind == EntryKind::Directory {
                directories.push(entry.path.clone());
            }
        },
    );

    if errors.iter().any(|(path, _)| path == root) {
        directories.clear();
    }

    tracing::debug!(
        root = %root.display(),
        count = directories.len(),
        errors = errors.len(),
        "listed directories"
    );

    DirectoryListing {
        directories,
        errors,
    }
}

/// Formats a catalog directory for display in a choice prompt.
///
/// The root itself is shown as `[<root-name> - Root]`.
pub fn display_name(root: &Path, dir: &Path) -> String {
    match dir.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => {
            let name = root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| root.display().to_string());
            format!("[{name} - Root]")
        }
        Ok(rel) => rel.display().to_string(),
        Err(_) => dir.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{FailOn, MemoryFs};

    fn project() -> MemoryFs {
        let fs = MemoryFs::with_root("/proj");
        fs.add_dir("/proj/include/detail");
        fs.add_dir("/proj/src");
        fs.add_dir("/proj/node_modules/pkg");
        fs.add_dir("/proj/.git/objects");
        fs.add_dir("/proj/build/debug");
        fs.add_file("/proj/src/main.cpp", "");
        fs
    }

    #[test]
    fn test_root_listed_first() {
        let fs = project();
        let listing = list_directories(&fs, Path::new("/proj"), &Settings::default());

        assert_eq!(listing.directories[0], PathBuf::from("/proj"));
        assert!(listing.errors.is_empty());
    }

    #[test]
    fn test_excluded_directories_not_listed_or_descended() {
        let fs = project();
        let listing = list_directories(&fs, Path::new("/proj"), &Settings::default());

        assert_eq!(listing.directories.len(), 4);
        for dir in &listing.directories {
            let s = dir.to_string_lossy();
            assert!(!s.contains("node_modules"));
            assert!(!s.contains(".git"));
            assert!(!s.contains("build"));
        }
    }

    #[test]
    fn test_parent_before_children() {
        let fs = project();
        let listing = list_directories(&fs, Path::new("/proj"), &Settings::default());

        let pos = |p: &str| {
            listing
                .directories
                .iter()
                .position(|d| d == Path::new(p))
                .unwrap()
        };
        assert!(pos("/proj/include") < pos("/proj/include/detail"));
    }

    #[test]
    fn test_unreadable_subtree_is_collected_not_fatal() {
        let fs = project();
        fs.fail_on("/proj/include", FailOn::Read);

        let listing = list_directories(&fs, Path::new("/proj"), &Settings::default());

        assert_eq!(listing.errors.len(), 1);
        assert_eq!(listing.errors[0].0, PathBuf::from("/proj/include"));
        assert!(listing.directories.contains(&PathBuf::from("/proj/src")));
        assert!(!listing.directories.contains(&PathBuf::from("/proj/include/detail")));
    }

    #[test]
    fn test_unreadable_root_yields_empty_listing() {
        let fs = MemoryFs::default();
        let listing = list_directories(&fs, Path::new("/missing"), &Settings::default());

        assert!(listing.directories.is_empty());
        assert_eq!(listing.errors.len(), 1);
    }

    #[test]
    fn test_walk_uses_supplied_predicate() {
        let fs = project();
        let mut seen = Vec::new();
        walk(&fs, Path::new("/proj"), |name| name == "src", |e| seen.push(e.path.clone()));

        assert!(!seen.contains(&PathBuf::from("/proj/src")));
        assert!(!seen.contains(&PathBuf::from("/proj/src/main.cpp")));
        assert!(seen.contains(&PathBuf::from("/proj/node_modules/pkg")));
    }

    #[test]
    fn test_display_name() {
        let root = Path::new("/work/engine");
        assert_eq!(display_name(root, root), "[engine - Root]");
        assert_eq!(display_name(root, &root.join("src/core")), "src/core");
    }
}

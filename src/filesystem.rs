//! Filesystem abstraction used by every pair-file operation.
//!
//! [`RealFs`] forwards to `std::fs`. [`MemoryFs`] keeps a tree in memory and
//! can be told to fail on chosen paths, which lets the catalog, the matcher
//! and the rename rollback be exercised without touching the disk.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// A single entry returned by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The entry's file name.
    pub name: String,
    /// The full path to the entry.
    pub path: PathBuf,
    /// What the entry is.
    pub kind: EntryKind,
}

/// The filesystem operations pair-file handling needs.
pub trait FileSystem {
    /// Lists the direct children of a directory, sorted by name.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<Entry>>;

    /// Reads a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Writes a file, replacing any previous content.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Writes a new file, failing with `AlreadyExists` if the path is taken.
    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Renames a file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Deletes a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Creates a directory and all of its missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Returns true if anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Returns true if `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns true if both paths name the same existing file, as with a
    /// case-only difference on a case-insensitive filesystem.
    fn same_file(&self, a: &Path, b: &Path) -> bool;
}

/// [`FileSystem`] backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<Entry>> {
        let entries = fs::read_dir(path)?.map(|entry| -> io::Result<Entry> {
            let entry = entry?;
            Ok(Entry {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.path(),
                kind: entry_kind(&entry)?,
            })
        });
        Ok(collect_entries(path, entries))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(contents.as_bytes())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    #[cfg(unix)]
    fn same_file(&self, a: &Path, b: &Path) -> bool {
        use std::os::unix::fs::MetadataExt;
        match (fs::metadata(a), fs::metadata(b)) {
            (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
            _ => false,
        }
    }

    #[cfg(not(unix))]
    fn same_file(&self, a: &Path, b: &Path) -> bool {
        match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// Classifies a directory entry. A symlink to a file counts as a file; a
/// symlink to a directory is never descended into.
fn entry_kind(entry: &fs::DirEntry) -> io::Result<EntryKind> {
    let file_type = entry.file_type()?;
    let kind = if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_symlink() {
        match fs::metadata(entry.path()) {
            Ok(target) if target.is_file() => EntryKind::File,
            _ => EntryKind::Other,
        }
    } else {
        EntryKind::Other
    };
    Ok(kind)
}

/// Sorts the readable entries of `dir` by name, skipping unreadable ones.
fn collect_entries<I>(dir: &Path, entries: I) -> Vec<Entry>
where
    I: IntoIterator<Item = io::Result<Entry>>,
{
    let mut listed: Vec<Entry> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .collect();
    listed.sort_by(|a, b| a.name.cmp(&b.name));
    listed
}

/// Operations [`MemoryFs`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailOn {
    Read,
    Write,
    Rename,
}

/// In-memory [`FileSystem`] for tests.
///
/// Paths are stored exactly as given; callers should build them from a
/// common root with `Path::join`.
#[derive(Debug, Default)]
pub struct MemoryFs {
    dirs: RefCell<BTreeSet<PathBuf>>,
    files: RefCell<BTreeMap<PathBuf, String>>,
    failures: RefCell<HashSet<(PathBuf, FailOn)>>,
    aliases: RefCell<BTreeMap<PathBuf, PathBuf>>,
}

impl MemoryFs {
    /// Creates an empty filesystem containing only `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let fs = Self::default();
        fs.dirs.borrow_mut().insert(root.into());
        fs
    }

    /// Adds a directory and its missing parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    /// Adds a file, creating its parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: &str) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
    }

    /// Makes the given operation on `path` fail with `PermissionDenied`.
    pub fn fail_on(&self, path: impl Into<PathBuf>, op: FailOn) {
        self.failures.borrow_mut().insert((path.into(), op));
    }

    /// Makes `alias` name the same file as `target`, the way `Foo.h` and
    /// `foo.h` do on a case-insensitive filesystem.
    pub fn add_alias(&self, alias: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        self.aliases.borrow_mut().insert(alias.into(), target.into());
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.aliases
            .borrow()
            .get(path)
            .cloned()
            .unwrap_or_else(|| path.to_path_buf())
    }

    /// Returns the content of a file, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// Returns every file path currently stored.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }

    fn check(&self, path: &Path, op: FailOn) -> io::Result<()> {
        if self.failures.borrow().contains(&(path.to_path_buf(), op)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("simulated {op:?} failure"),
            ));
        }
        Ok(())
    }

    fn require_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !self.dirs.borrow().contains(parent) => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("parent directory missing: {}", parent.display()),
            )),
            _ => Ok(()),
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

impl FileSystem for MemoryFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<Entry>> {
        self.check(path, FailOn::Read)?;
        if !self.dirs.borrow().contains(path) {
            return Err(not_found(path));
        }

        let child = |p: &PathBuf, kind| {
            (p.parent() == Some(path)).then(|| Entry {
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                path: p.clone(),
                kind,
            })
        };

        let mut entries: Vec<Entry> = self
            .dirs
            .borrow()
            .iter()
            .filter_map(|d| child(d, EntryKind::Directory))
            .collect();
        entries.extend(
            self.files
                .borrow()
                .keys()
                .filter_map(|f| child(f, EntryKind::File)),
        );
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.check(path, FailOn::Read)?;
        self.contents(path).ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.check(path, FailOn::Write)?;
        self.require_parent(path)?;
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()> {
        if self.exists(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("already exists: {}", path.display()),
            ));
        }
        self.write(path, contents)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.check(from, FailOn::Rename)?;
        self.require_parent(to)?;
        let contents = self
            .files
            .borrow_mut()
            .remove(from)
            .ok_or_else(|| not_found(from))?;
        self.files.borrow_mut().insert(to.to_path_buf(), contents);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.check(path, FailOn::Write)?;
        self.files
            .borrow_mut()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.check(path, FailOn::Write)?;
        self.add_dir(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let path = self.resolve(path);
        self.dirs.borrow().contains(&path) || self.files.borrow().contains_key(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.borrow().contains(path)
    }

    fn same_file(&self, a: &Path, b: &Path) -> bool {
        let a = self.resolve(a);
        self.files.borrow().contains_key(&a) && a == self.resolve(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_fs_lists_direct_children_only() {
        let fs = MemoryFs::with_root("/p");
        fs.add_file("/p/src/a.cpp", "");
        fs.add_file("/p/src/nested/b.cpp", "");
        fs.add_file("/p/top.h", "");

        let names: Vec<_> = fs
            .read_dir(Path::new("/p/src"))
            .unwrap()
            .into_iter()
            .map(|e| (e.name, e.kind))
            .collect();

        assert_eq!(names.len(), 2);
        assert!(names.contains(&("a.cpp".to_string(), EntryKind::File)));
        assert!(names.contains(&("nested".to_string(), EntryKind::Directory)));
    }

    #[test]
    fn test_memory_fs_create_new_refuses_existing() {
        let fs = MemoryFs::with_root("/p");
        fs.add_file("/p/a.h", "keep");

        let err = fs.create_new(Path::new("/p/a.h"), "clobber").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs.contents("/p/a.h").as_deref(), Some("keep"));
    }

    #[test]
    fn test_memory_fs_simulated_failure() {
        let fs = MemoryFs::with_root("/p");
        fs.add_file("/p/a.h", "x");
        fs.fail_on("/p/a.h", FailOn::Rename);

        assert!(fs.rename(Path::new("/p/a.h"), Path::new("/p/b.h")).is_err());
        assert!(fs.exists(Path::new("/p/a.h")));
    }

    #[test]
    fn test_memory_fs_write_needs_parent() {
        let fs = MemoryFs::with_root("/p");
        assert!(fs.write(Path::new("/p/missing/a.h"), "").is_err());
    }

    #[test]
    fn test_unreadable_entry_is_skipped() {
        let entry = |name: &str| Entry {
            name: name.to_string(),
            path: PathBuf::from("/p").join(name),
            kind: EntryKind::File,
        };
        let listed = collect_entries(
            Path::new("/p"),
            vec![
                Ok(entry("b.h")),
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
                Ok(entry("a.cpp")),
            ],
        );

        let names: Vec<_> = listed.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.cpp", "b.h"]);
    }

    #[test]
    fn test_memory_fs_alias_is_same_file() {
        let fs = MemoryFs::with_root("/p");
        fs.add_file("/p/foo.h", "");
        fs.add_file("/p/bar.h", "");
        fs.add_alias("/p/Foo.h", "/p/foo.h");

        assert!(fs.exists(Path::new("/p/Foo.h")));
        assert!(fs.same_file(Path::new("/p/foo.h"), Path::new("/p/Foo.h")));
        assert!(!fs.same_file(Path::new("/p/foo.h"), Path::new("/p/bar.h")));
    }

    #[test]
    fn test_real_fs_same_file_through_hard_link() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let original = temp_dir.path().join("foo.h");
        let link = temp_dir.path().join("link.h");
        let other = temp_dir.path().join("bar.h");
        fs::write(&original, "").unwrap();
        fs::write(&other, "").unwrap();
        fs::hard_link(&original, &link).unwrap();

        assert!(RealFs.same_file(&original, &link));
        assert!(!RealFs.same_file(&original, &other));
        assert!(!RealFs.same_file(&original, &temp_dir.path().join("missing.h")));
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_symlinks() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("real.h"), "").unwrap();
        symlink(root.join("real.h"), root.join("linked.h")).unwrap();
        fs::create_dir(root.join("dir")).unwrap();
        symlink(root.join("dir"), root.join("dir_link")).unwrap();
        symlink(root.join("gone.h"), root.join("dangling.h")).unwrap();

        let kinds: Vec<_> = RealFs
            .read_dir(root)
            .unwrap()
            .into_iter()
            .map(|e| (e.name, e.kind))
            .collect();

        assert_eq!(
            kinds,
            [
                ("dangling.h".to_string(), EntryKind::Other),
                ("dir".to_string(), EntryKind::Directory),
                ("dir_link".to_string(), EntryKind::Other),
                ("linked.h".to_string(), EntryKind::File),
                ("real.h".to_string(), EntryKind::File),
            ]
        );
    }

    #[test]
    fn test_real_fs_create_new_refuses_existing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("a.h");

        RealFs.create_new(&path, "first").expect("Failed to create file");
        let err = RealFs.create_new(&path, "second").unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");
    }
}

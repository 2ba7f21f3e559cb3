//! Header/source classification and counterpart discovery.

use crate::catalog::{TraversalError, walk};
use crate::filesystem::{EntryKind, FileSystem};
use std::path::{Path, PathBuf};

/// Whether a file is a header or a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileClass {
    Header,
    Source,
}

impl FileClass {
    /// The class a counterpart must have.
    pub fn opposite(self) -> Self {
        match self {
            FileClass::Header => FileClass::Source,
            FileClass::Source => FileClass::Header,
        }
    }
}

/// The configured header and source extensions, each with its leading `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSets {
    header: Vec<String>,
    source: Vec<String>,
}

impl ExtensionSets {
    /// Creates the sets. Order is kept for prompts.
    pub fn new(header: Vec<String>, source: Vec<String>) -> Self {
        Self { header, source }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn source(&self) -> &[String] {
        &self.source
    }

    pub fn is_header(&self, extension: &str) -> bool {
        self.header.iter().any(|e| e == extension)
    }

    pub fn is_source(&self, extension: &str) -> bool {
        self.source.iter().any(|e| e == extension)
    }

    /// Classifies an extension. The header test runs first, so an extension
    /// present in both sets counts as a header.
    pub fn classify(&self, extension: &str) -> Option<FileClass> {
        if self.is_header(extension) {
            Some(FileClass::Header)
        } else if self.is_source(extension) {
            Some(FileClass::Source)
        } else {
            None
        }
    }
}

/// Splits a path's file name into base name and extension (with its dot).
///
/// `include/foo.h` gives `("foo", ".h")`; a name without an extension, or a
/// dot-file such as `.clang-format`, gives an empty extension.
pub fn split_file_name(path: &Path) -> (String, String) {
    let base = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (base, extension)
}

/// Result of [`find_counterparts`].
#[derive(Debug, Default)]
pub struct CounterpartSearch {
    /// Matching files in traversal order.
    pub matches: Vec<PathBuf>,
    /// Directories that could not be read during the search.
    pub errors: Vec<TraversalError>,
}

/// Finds files under `root` named `base_name` whose extension is of the
/// class opposite to `known_extension`.
///
/// Returns no matches when `known_extension` is neither a header nor a
/// source extension.
pub fn find_counterparts<F, S>(
    fs: &F,
    root: &Path,
    base_name: &str,
    known_extension: &str,
    sets: &ExtensionSets,
    should_skip: S,
) -> CounterpartSearch
where
    F: FileSystem + ?Sized,
    S: Fn(&str) -> bool,
{
    let Some(wanted) = sets.classify(known_extension).map(FileClass::opposite) else {
        tracing::debug!(extension = known_extension, "extension has no class, nothing to match");
        return CounterpartSearch::default();
    };

    let mut matches = Vec::new();
    let errors = walk(fs, root, should_skip, |entry| {
        if entry.kind != EntryKind::File {
            return;
        }
        let (base, extension) = split_file_name(&entry.path);
        if base == base_name && sets.classify(&extension) == Some(wanted) {
            tracing::debug!(path = %entry.path.display(), "counterpart candidate");
            matches.push(entry.path.clone());
        }
    });

    CounterpartSearch { matches, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::filesystem::MemoryFs;
    use proptest::prelude::*;

    fn search(fs: &MemoryFs, base: &str, ext: &str) -> Vec<PathBuf> {
        let settings = Settings::default();
        find_counterparts(fs, Path::new("/p"), base, ext, &settings.extensions, |n| {
            settings.is_excluded_dir(n)
        })
        .matches
    }

    #[test]
    fn test_split_file_name() {
        assert_eq!(
            split_file_name(Path::new("include/foo.h")),
            ("foo".to_string(), ".h".to_string())
        );
        assert_eq!(
            split_file_name(Path::new("a/vec.h++")),
            ("vec".to_string(), ".h++".to_string())
        );
        assert_eq!(
            split_file_name(Path::new("Makefile")),
            ("Makefile".to_string(), String::new())
        );
        assert_eq!(
            split_file_name(Path::new(".clang-format")),
            (".clang-format".to_string(), String::new())
        );
    }

    #[test]
    fn test_classify_header_wins_on_overlap() {
        let sets = ExtensionSets::new(vec![".inl".into()], vec![".inl".into(), ".cpp".into()]);
        assert_eq!(sets.classify(".inl"), Some(FileClass::Header));
        assert_eq!(sets.classify(".cpp"), Some(FileClass::Source));
        assert_eq!(sets.classify(".txt"), None);
    }

    #[test]
    fn test_header_finds_source() {
        let fs = MemoryFs::with_root("/p");
        fs.add_file("/p/include/foo.h", "");
        fs.add_file("/p/src/foo.cpp", "");
        fs.add_file("/p/src/foobar.cpp", "");

        assert_eq!(search(&fs, "foo", ".h"), vec![PathBuf::from("/p/src/foo.cpp")]);
    }

    #[test]
    fn test_source_finds_every_header() {
        let fs = MemoryFs::with_root("/p");
        fs.add_file("/p/src/foo.cpp", "");
        fs.add_file("/p/include/foo.h", "");
        fs.add_file("/p/legacy/foo.hpp", "");

        let found = search(&fs, "foo", ".cpp");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_same_class_files_skipped() {
        let fs = MemoryFs::with_root("/p");
        fs.add_file("/p/include/foo.h", "");
        fs.add_file("/p/include/foo.hpp", "");

        assert!(search(&fs, "foo", ".h").is_empty());
    }

    #[test]
    fn test_excluded_directories_not_searched() {
        let fs = MemoryFs::with_root("/p");
        fs.add_file("/p/include/foo.h", "");
        fs.add_file("/p/build/foo.cpp", "");
        fs.add_file("/p/node_modules/x/foo.c", "");

        assert!(search(&fs, "foo", ".h").is_empty());
    }

    #[test]
    fn test_unknown_extension_matches_nothing() {
        let fs = MemoryFs::with_root("/p");
        fs.add_file("/p/foo.txt", "");
        fs.add_file("/p/foo.cpp", "");

        assert!(search(&fs, "foo", ".txt").is_empty());
    }

    proptest! {
        #[test]
        fn test_never_returns_same_class(
            names in prop::collection::vec(
                (prop::sample::select(vec!["foo", "bar"]),
                 prop::sample::select(vec![".h", ".hpp", ".c", ".cpp", ".cc", ".txt"]),
                 prop::sample::select(vec!["src", "include", "lib/sub"])),
                1..12),
            query in prop::sample::select(vec![".h", ".hpp", ".cpp", ".c"]),
        ) {
            let fs = MemoryFs::with_root("/p");
            for (base, ext, dir) in &names {
                fs.add_file(format!("/p/{dir}/{base}{ext}"), "");
            }
            let settings = Settings::default();
            let query_class = settings.extensions.classify(query);

            for found in search(&fs, "foo", query) {
                let (base, ext) = split_file_name(&found);
                prop_assert_eq!(base, "foo");
                prop_assert_ne!(settings.extensions.classify(&ext), query_class);
            }
        }
    }
}

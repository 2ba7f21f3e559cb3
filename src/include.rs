//! Quoted include directives in source files.

use crate::error::{PairError, PairResult};
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

static QUOTED_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"#include\s+"[\w-]+\.[A-Za-z0-9+]+""#).expect("valid #include pattern")
});

const SOURCE_BODY: &str = "// Your source content goes here";

/// The directive a source uses to include its header.
pub fn include_directive(base_name: &str, header_extension: &str) -> String {
    format!("#include \"{base_name}{header_extension}\"")
}

/// Points every quoted `#include "name.ext"` at the renamed header.
///
/// This is a plain textual substitution: all quoted includes of a bare file
/// name are rewritten, not only the one naming the old header. Includes with
/// a directory component and angle-bracket includes are left alone.
///
/// # Errors
///
/// Returns [`PairError::HeaderExtensionMissing`] if `header_extension` is empty.
pub fn rewrite_include(
    source_text: &str,
    new_base_name: &str,
    header_extension: &str,
) -> PairResult<String> {
    if header_extension.is_empty() {
        return Err(PairError::HeaderExtensionMissing);
    }

    let directive = include_directive(new_base_name, header_extension);
    Ok(QUOTED_INCLUDE
        .replace_all(source_text, NoExpand(&directive))
        .into_owned())
}

/// Initial content of a new source file.
pub fn source_template(base_name: &str, header_extension: &str) -> String {
    format!(
        "{}\n\n{SOURCE_BODY}\n",
        include_directive(base_name, header_extension)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_include() {
        let text = "#include \"foo.h\"\n#include <vector>\n\nint main() {}\n";
        let out = rewrite_include(text, "bar", ".h").unwrap();
        assert_eq!(out, "#include \"bar.h\"\n#include <vector>\n\nint main() {}\n");
    }

    #[test]
    fn test_rewrite_include_switches_extension() {
        let out = rewrite_include("#include   \"old-name.hpp\"\n", "fresh", ".hxx").unwrap();
        assert_eq!(out, "#include \"fresh.hxx\"\n");
    }

    #[test]
    fn test_rewrite_include_finds_plus_extension() {
        let out = rewrite_include("#include \"vec.h++\"\n", "matrix", ".h++").unwrap();
        assert_eq!(out, "#include \"matrix.h++\"\n");
    }

    #[test]
    fn test_rewrite_include_rewrites_all_quoted_includes() {
        let text = "#include \"foo.h\"\n#include \"util.h\"\n";
        let out = rewrite_include(text, "bar", ".h").unwrap();
        assert_eq!(out, "#include \"bar.h\"\n#include \"bar.h\"\n");
    }

    #[test]
    fn test_rewrite_include_skips_paths() {
        let text = "#include \"detail/foo.h\"\n";
        assert_eq!(rewrite_include(text, "bar", ".h").unwrap(), text);
    }

    #[test]
    fn test_rewrite_include_requires_extension() {
        assert!(matches!(
            rewrite_include("#include \"foo.h\"\n", "bar", ""),
            Err(PairError::HeaderExtensionMissing)
        ));
    }

    #[test]
    fn test_source_template() {
        assert_eq!(
            source_template("widget", ".hpp"),
            "#include \"widget.hpp\"\n\n// Your source content goes here\n"
        );
    }
}

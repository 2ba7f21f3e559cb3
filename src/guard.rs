//! Header guard tokens, guard rewriting and header templates.

use crate::config::{GuardStyle, GuardSuffix};
use crate::error::{PairError, PairResult};
use crate::matcher::ExtensionSets;
use regex::{Captures, NoExpand, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

static IFNDEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#ifndef\s+([A-Z0-9_]+)").expect("valid #ifndef pattern"));
static DEFINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#define\s+[A-Z0-9_]+").expect("valid #define pattern"));
static ENDIF_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#endif[ \t]*//[ \t]*([A-Z0-9_]+)").expect("valid #endif pattern")
});

/// Placeholder line written into new headers.
const HEADER_BODY: &str = "// Your header content goes here";

/// Replaces every character outside `[A-Za-z0-9_]` with `_` and upper-cases
/// the result.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Guard token derived from a base name and a header extension.
///
/// `("foo", ".h")` gives `FOO_H_`, `("my-lib", ".hpp")` gives `MY_LIB_HPP_`.
pub fn guard_token(base_name: &str, extension: &str) -> String {
    format!("{}{}_", sanitize(base_name), sanitize(extension))
}

/// Guard token for a newly created header under the configured suffix policy.
pub fn creation_token(base_name: &str, extension: &str, suffix: GuardSuffix) -> String {
    match suffix {
        GuardSuffix::Fixed => format!("{}_H_", sanitize(base_name)),
        GuardSuffix::Extension => guard_token(base_name, extension),
    }
}

/// Rewrites the guard directives of a header for a new base name.
///
/// Every `#ifndef`/`#define` followed by an upper-case token is pointed at
/// the new token. An `#endif // TOKEN` trailer is rewritten only when its
/// token was one of the `#ifndef` tokens, so comments on unrelated
/// conditionals such as `#endif // _WIN32` are kept. Applying it twice with
/// the same name gives the same text.
///
/// # Errors
///
/// Returns [`PairError::NotAHeader`] if `extension` is not a configured
/// header extension.
pub fn rewrite_guard(
    header_text: &str,
    new_base_name: &str,
    extension: &str,
    sets: &ExtensionSets,
) -> PairResult<String> {
    if !sets.is_header(extension) {
        return Err(PairError::NotAHeader(extension.to_string()));
    }

    let token = guard_token(new_base_name, extension);
    let guarded: HashSet<&str> = IFNDEF
        .captures_iter(header_text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    let text = IFNDEF.replace_all(header_text, NoExpand(&format!("#ifndef {token}")));
    let text = DEFINE.replace_all(&text, NoExpand(&format!("#define {token}")));
    let text = ENDIF_COMMENT.replace_all(&text, |caps: &Captures| {
        if guarded.contains(&caps[1]) {
            format!("#endif // {token}")
        } else {
            caps[0].to_string()
        }
    });
    Ok(text.into_owned())
}

/// Initial content of a new header.
pub fn header_template(style: GuardStyle, token: &str) -> String {
    match style {
        GuardStyle::PragmaOnce => format!("#pragma once\n\n{HEADER_BODY}\n"),
        GuardStyle::IfndefDefine => format!(
            "#ifndef {token}\n#define {token}\n\n{HEADER_BODY}\n\n#endif // {token}\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use proptest::prelude::*;

    fn sets() -> ExtensionSets {
        Settings::default().extensions
    }

    #[test]
    fn test_guard_token_from_extension() {
        assert_eq!(guard_token("foo", ".h"), "FOO_H_");
        assert_eq!(guard_token("my-lib", ".hpp"), "MY_LIB_HPP_");
        assert_eq!(guard_token("vec", ".h++"), "VEC_H___");
    }

    #[test]
    fn test_creation_token_policies() {
        assert_eq!(creation_token("widget", ".hpp", GuardSuffix::Fixed), "WIDGET_H_");
        assert_eq!(
            creation_token("widget", ".hpp", GuardSuffix::Extension),
            "WIDGET_HPP_"
        );
    }

    #[test]
    fn test_rewrite_guard_replaces_triple() {
        let text = "#ifndef FOO_H_\n#define FOO_H_\n\nint f();\n\n#endif // FOO_H_\n";
        let out = rewrite_guard(text, "bar", ".h", &sets()).unwrap();

        assert_eq!(out, "#ifndef BAR_H_\n#define BAR_H_\n\nint f();\n\n#endif // BAR_H_\n");
    }

    #[test]
    fn test_rewrite_guard_keeps_unrelated_endif_comments() {
        let text = "#ifndef FOO_H_\n#define FOO_H_\n\n#ifdef _WIN32\n#include <windows.h>\n#endif // _WIN32\n\n#endif // FOO_H_\n";
        let out = rewrite_guard(text, "bar", ".h", &sets()).unwrap();

        assert_eq!(
            out,
            "#ifndef BAR_H_\n#define BAR_H_\n\n#ifdef _WIN32\n#include <windows.h>\n#endif // _WIN32\n\n#endif // BAR_H_\n"
        );
    }

    #[test]
    fn test_rewrite_guard_uses_extension() {
        let text = "#ifndef OLD_NAME_H_\n#define OLD_NAME_H_\n#endif\n";
        let out = rewrite_guard(text, "new.name", ".hpp", &sets()).unwrap();

        assert!(out.contains("#ifndef NEW_NAME_HPP_\n"));
        assert!(out.contains("#define NEW_NAME_HPP_\n"));
        assert!(out.ends_with("#endif\n"));
    }

    #[test]
    fn test_rewrite_guard_leaves_pragma_once_alone() {
        let text = "#pragma once\n\nint f();\n";
        assert_eq!(rewrite_guard(text, "bar", ".h", &sets()).unwrap(), text);
    }

    #[test]
    fn test_rewrite_guard_rejects_source_extension() {
        let result = rewrite_guard("#ifndef A_\n", "bar", ".cpp", &sets());
        assert!(matches!(result, Err(PairError::NotAHeader(ext)) if ext == ".cpp"));
    }

    #[test]
    fn test_pragma_once_template_has_no_guard() {
        let text = header_template(GuardStyle::PragmaOnce, "IGNORED_H_");
        assert!(text.starts_with("#pragma once\n"));
        assert!(!text.contains("#ifndef"));
        assert!(!text.contains("#define"));
    }

    #[test]
    fn test_ifndef_template() {
        let text = header_template(GuardStyle::IfndefDefine, "WIDGET_H_");
        assert!(text.starts_with("#ifndef WIDGET_H_\n#define WIDGET_H_\n"));
        assert!(text.ends_with("#endif // WIDGET_H_\n"));
    }

    proptest! {
        #[test]
        fn test_sanitized_token_charset(name in "[a-zA-Z0-9_\\-./\\\\ ]{1,24}") {
            let token = guard_token(&name, ".h");
            prop_assert!(token.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));
        }

        #[test]
        fn test_sanitize_any_unicode(name in "\\PC{0,16}") {
            prop_assert!(sanitize(&name).chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));
        }

        #[test]
        fn test_rewrite_guard_idempotent(
            name in "[a-zA-Z0-9_\\-. ]{1,16}",
            old in "[A-Z][A-Z0-9_]{0,12}",
            ext in prop::sample::select(vec![".h", ".hpp", ".hxx", ".h++"]),
        ) {
            let text = format!("#ifndef {old}\n#define {old}\n\nint x;\n\n#endif // {old}\n");
            let once = rewrite_guard(&text, &name, ext, &sets()).unwrap();
            let twice = rewrite_guard(&once, &name, ext, &sets()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}

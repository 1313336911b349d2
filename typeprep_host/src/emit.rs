//! Emit-time import path rewriting
//!
//! Emitted `.js` files still carry aliased specifiers in their
//! `import`/`export … from` clauses. This pass rewrites any specifier that
//! matches a configured alias into a path relative to the emitting file's
//! directory, `./`-prefixed when not already relative.

use crate::config::HostConfig;
use std::path::{Component, Path, PathBuf};

/// Rewrite aliased `from "…"` specifiers in emitted JavaScript
pub fn rewrite_emitted_imports(code: &str, emitted_file: &Path, config: &HostConfig) -> String {
    if config.aliases.is_empty() {
        return code.to_string();
    }

    let emit_dir = emitted_file.parent().unwrap_or_else(|| Path::new("."));
    let mut out = String::with_capacity(code.len());
    let mut rest = code;

    // In emitted JS the `from` keyword only occurs in import/export clauses,
    // so a word-boundary scan is enough
    while let Some(found) = find_from_clause(rest) {
        let FromClause {
            prefix_end,
            specifier,
            suffix_start,
        } = found;

        out.push_str(&rest[..prefix_end]);
        match rewrite_specifier(specifier, emit_dir, config) {
            Some(rewritten) => out.push_str(&rewritten),
            None => out.push_str(specifier),
        }
        rest = &rest[suffix_start..];
    }

    out.push_str(rest);
    out
}

struct FromClause<'a> {
    /// Byte offset just past the opening quote
    prefix_end: usize,
    specifier: &'a str,
    /// Byte offset of the closing quote
    suffix_start: usize,
}

fn find_from_clause(text: &str) -> Option<FromClause<'_>> {
    let mut search_at = 0;
    while let Some(pos) = text[search_at..].find("from") {
        let start = search_at + pos;
        search_at = start + 4;

        let before_ok = start == 0
            || !text[..start]
                .chars()
                .next_back()
                .map(is_ident_char)
                .unwrap_or(false);
        if !before_ok {
            continue;
        }

        let after = &text[start + 4..];
        let trimmed = after.trim_start();
        let quote = match trimmed.chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => continue,
        };
        let ws = after.len() - trimmed.len();
        let open = start + 4 + ws;
        let spec_start = open + 1;
        let close = match text[spec_start..].find(quote) {
            Some(i) => spec_start + i,
            None => continue,
        };

        return Some(FromClause {
            prefix_end: spec_start,
            specifier: &text[spec_start..close],
            suffix_start: close,
        });
    }
    None
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn rewrite_specifier(specifier: &str, emit_dir: &Path, config: &HostConfig) -> Option<String> {
    for rule in &config.aliases {
        if let Some(substituted) = rule.apply(specifier) {
            let target = config.base_dir.join(substituted);
            let relative = relative_path(emit_dir, &target);
            let mut text = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if !text.starts_with('.') {
                text = format!("./{}", text);
            }
            return Some(text);
        }
    }
    None
}

/// Path from `from_dir` to `to`, built by component comparison
fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component> = from_dir.components().collect();
    let to: Vec<Component> = to.components().collect();

    let mut shared = 0;
    while shared < from.len() && shared < to.len() && from[shared] == to[shared] {
        shared += 1;
    }

    let mut rel = PathBuf::new();
    for _ in shared..from.len() {
        rel.push("..");
    }
    for component in &to[shared..] {
        rel.push(component.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AliasRule;

    fn config() -> HostConfig {
        HostConfig {
            base_dir: PathBuf::from("proj"),
            aliases: vec![AliasRule {
                pattern: "app/*".to_string(),
                target: "src/app/*".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_aliased_import_rewritten() {
        let code = "import { widget } from \"app/widget\";\n";
        let out = rewrite_emitted_imports(code, Path::new("proj/dist/main.js"), &config());

        assert_eq!(out, "import { widget } from \"../src/app/widget\";\n");
    }

    #[test]
    fn test_export_from_rewritten() {
        let code = "export { thing } from 'app/thing';\n";
        let out = rewrite_emitted_imports(code, Path::new("proj/dist/main.js"), &config());

        assert_eq!(out, "export { thing } from '../src/app/thing';\n");
    }

    #[test]
    fn test_sibling_target_gets_dot_slash() {
        let code = "import { a } from \"app/a\";\n";
        let out = rewrite_emitted_imports(code, Path::new("proj/src/app/b.js"), &config());

        assert_eq!(out, "import { a } from \"./a\";\n");
    }

    #[test]
    fn test_relative_import_untouched() {
        let code = "import { b } from \"./b\";\nimport fs from \"fs\";\n";
        let out = rewrite_emitted_imports(code, Path::new("proj/dist/main.js"), &config());

        assert_eq!(out, code);
    }

    #[test]
    fn test_from_inside_identifier_ignored() {
        let code = "const takenfrom = \"app/x\";\n";
        let out = rewrite_emitted_imports(code, Path::new("proj/dist/main.js"), &config());

        assert_eq!(out, code);
    }

    #[test]
    fn test_relative_path_helper() {
        assert_eq!(
            relative_path(Path::new("proj/dist"), Path::new("proj/src/app/w")),
            PathBuf::from("../src/app/w")
        );
        assert_eq!(
            relative_path(Path::new("a/b"), Path::new("a/b/c")),
            PathBuf::from("c")
        );
        assert_eq!(relative_path(Path::new("a"), Path::new("a")), PathBuf::from("."));
    }
}

//! `#macro` directive extraction
//!
//! Walks classified batches and consumes Preprocessor batches that carry a
//! `#macro` directive. Consumed directives are removed from the batch list;
//! every other batch, including non-macro preprocessor lines, passes through
//! unchanged.

use super::{MacroDef, MacroError, MacroSet};
use crate::classify::{Batch, LexState, ScriptTokenizer, Tokenizer};
use crate::config::compile_time::macros::*;
use crate::logging::codes;
use crate::{log_error, log_success, log_warning};

/// Extract macro definitions from Preprocessor batches.
///
/// Returns the surviving batches and the collected macro set. A redefinition
/// replaces the earlier value and logs a warning; exceeding the compile-time
/// macro count is a hard error.
pub fn extract_macros(batches: Vec<Batch>) -> Result<(Vec<Batch>, MacroSet), MacroError> {
    let mut set = MacroSet::new();
    let mut kept = Vec::with_capacity(batches.len());

    for batch in batches {
        if batch.state != LexState::Preprocessor {
            kept.push(batch);
            continue;
        }

        match parse_directive(&batch.text) {
            Some(def) => {
                if def.args.len() > MAX_MACRO_ARGS {
                    log_warning!(
                        code = codes::macros::TOO_MANY_MACRO_ARGS,
                        "Macro has too many arguments, definition skipped",
                        "name" => def.name,
                        "args" => def.args.len(),
                        "max_args" => MAX_MACRO_ARGS
                    );
                    kept.push(batch);
                    continue;
                }
                if def.value.len() > MAX_MACRO_VALUE_LENGTH {
                    log_warning!(
                        code = codes::macros::MACRO_VALUE_TOO_LONG,
                        "Macro value too long, definition skipped",
                        "name" => def.name,
                        "length" => def.value.len(),
                        "max_length" => MAX_MACRO_VALUE_LENGTH
                    );
                    kept.push(batch);
                    continue;
                }
                if !set.contains(&def.name) && set.len() >= MAX_MACRO_COUNT {
                    let err = MacroError::MacroLimitExceeded { count: set.len() + 1 };
                    log_error!(err.error_code(), "Macro count limit exceeded",
                        span = batch.span,
                        "limit" => MAX_MACRO_COUNT
                    );
                    return Err(err);
                }
                if set.contains(&def.name) {
                    log_warning!(
                        code = codes::macros::DUPLICATE_MACRO,
                        "Macro redefined, later definition wins",
                        "name" => def.name
                    );
                }
                set.insert(def);
            }
            // Non-macro preprocessor lines stay in the source
            None => kept.push(batch),
        }
    }

    if !set.is_empty() {
        log_success!(
            codes::success::MACRO_EXTRACTION_COMPLETE,
            "Macro extraction completed",
            "count" => set.len()
        );
    }

    Ok((kept, set))
}

/// Parse one preprocessor span as a `#macro` directive.
///
/// Returns None when the span is some other directive. Backslash-newline
/// continuations are joined before parsing.
fn parse_directive(raw: &str) -> Option<MacroDef> {
    let joined = raw.replace("\\\r\n", "").replace("\\\n", "");
    let text = joined.trim_end();

    let rest = text.strip_prefix("#macro")?;
    // `#macrofoo` is not a macro directive
    let rest = match rest.chars().next() {
        Some(c) if c.is_whitespace() => rest.trim_start(),
        _ => return None,
    };

    let name_end = rest
        .char_indices()
        .find(|&(_, c)| !is_ident_char(c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if name_end == 0 {
        return None;
    }
    let name = rest[..name_end].to_string();
    let after_name = &rest[name_end..];

    let (args, value) = if let Some(list) = after_name.strip_prefix('(') {
        let close = top_level_close_paren(after_name)?;
        let args = split_top_level_args(&list[..close - 1]);
        (args, after_name[close + 1..].trim().to_string())
    } else {
        (Vec::new(), after_name.trim().to_string())
    };

    Some(MacroDef::new(name, args, value))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Byte offset of the `)` that closes the leading `(` of `text`, honoring
/// nested brackets, strings, regexes, and comments.
fn top_level_close_paren(text: &str) -> Option<usize> {
    let mut offset = 0usize;
    for sc in ScriptTokenizer::new().scan(text) {
        if sc.state == LexState::Code
            && sc.ch == ')'
            && sc.paren_depth == 1
            && sc.brace_depth == 0
            && sc.bracket_depth == 0
        {
            return Some(offset);
        }
        offset += sc.ch.len_utf8();
    }
    None
}

/// Split an argument list on top-level commas.
///
/// Commas nested inside `{}`, `()`, `[]`, strings, regexes, or comments do
/// not split. Each argument is trimmed; a fully quoted argument loses one
/// layer of quotes.
fn split_top_level_args(list: &str) -> Vec<String> {
    if list.trim().is_empty() {
        return Vec::new();
    }

    let mut args = Vec::new();
    let mut current = String::new();
    for sc in ScriptTokenizer::new().scan(list) {
        let top_level = sc.state == LexState::Code
            && sc.brace_depth == 0
            && sc.bracket_depth == 0
            && sc.paren_depth == 0;
        if sc.ch == ',' && top_level {
            args.push(clean_arg(&current));
            current.clear();
        } else {
            current.push(sc.ch);
        }
    }
    args.push(clean_arg(&current));
    args
}

fn clean_arg(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 {
        let first = trimmed.chars().next();
        let last = trimmed.chars().last();
        if first == last && matches!(first, Some('"') | Some('\'')) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;

    fn classify(source: &str) -> Vec<Batch> {
        Classifier::new().classify(source).unwrap()
    }

    #[test]
    fn test_simple_definition() {
        let batches = classify("#macro WIDTH 100\nlet w = WIDTH;\n");
        let (kept, set) = extract_macros(batches).unwrap();

        let def = set.get("WIDTH").unwrap();
        assert!(def.args.is_empty());
        assert_eq!(def.value, "100");
        // Directive removed from the stream
        assert!(!kept.iter().any(|b| b.text.contains("#macro")));
    }

    #[test]
    fn test_function_like_definition() {
        let batches = classify("#macro UNIT(n) n + \"px\"\n");
        let (_, set) = extract_macros(batches).unwrap();

        let def = set.get("UNIT").unwrap();
        assert_eq!(def.args, vec!["n".to_string()]);
        assert_eq!(def.value, "n + \"px\"");
    }

    #[test]
    fn test_comma_in_nested_braces_does_not_split() {
        let args = split_top_level_args("a, {x, y}, b");
        assert_eq!(args, vec!["a", "{x, y}", "b"]);
    }

    #[test]
    fn test_comma_in_string_does_not_split() {
        let args = split_top_level_args("\"a, b\", c");
        assert_eq!(args, vec!["a, b", "c"]);
    }

    #[test]
    fn test_quoted_arg_unwrapped_once() {
        assert_eq!(clean_arg("  \"size\"  "), "size");
        assert_eq!(clean_arg("'n'"), "n");
        assert_eq!(clean_arg("plain"), "plain");
        // Mismatched quotes stay
        assert_eq!(clean_arg("\"a'"), "\"a'");
    }

    #[test]
    fn test_continuation_joined() {
        let def = parse_directive("#macro LONG a +\\\n b\n").unwrap();
        assert_eq!(def.value, "a + b");
    }

    #[test]
    fn test_other_directive_passes_through() {
        let batches = classify("#pragma once\ncode();\n");
        let (kept, set) = extract_macros(batches).unwrap();

        assert!(set.is_empty());
        assert!(kept.iter().any(|b| b.text.contains("#pragma")));
    }

    #[test]
    fn test_redefinition_replaces_value() {
        let batches = classify("#macro W 1\n#macro W 2\n");
        let (_, set) = extract_macros(batches).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("W").unwrap().value, "2");
    }
}

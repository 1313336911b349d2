//! Macro invocation expansion
//!
//! Single-pass substitution over Code batches. Replacement text is emitted
//! directly and never rescanned, so macros cannot expand recursively.

use super::{MacroError, MacroSet};
use crate::classify::{Batch, LexState};
use crate::config::compile_time::macros::MAX_EXPANSIONS_PER_FILE;
use crate::logging::codes;
use crate::{log_error, log_success};

/// Expand macro invocations in place across all Code batches.
///
/// An invocation is the macro name at a word boundary, with an optional `#`
/// sigil before it and an optional non-nested parenthesized argument list
/// after it. Returns the number of expansions performed.
pub fn expand_macros(batches: &mut [Batch], set: &MacroSet) -> Result<usize, MacroError> {
    if set.is_empty() {
        return Ok(0);
    }

    let mut expansions = 0usize;
    for batch in batches.iter_mut() {
        if batch.state != LexState::Code {
            continue;
        }
        batch.text = expand_in_text(&batch.text, set, &mut expansions)?;
    }

    if expansions > 0 {
        log_success!(
            codes::success::MACRO_EXPANSION_COMPLETE,
            "Macro expansion completed",
            "expansions" => expansions
        );
    }

    Ok(expansions)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn expand_in_text(
    text: &str,
    set: &MacroSet,
    expansions: &mut usize,
) -> Result<String, MacroError> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0usize;

    while i < chars.len() {
        let ch = chars[i];

        // A `#` sigil directly before the name is part of the invocation
        let name_start = if ch == '#' && i + 1 < chars.len() && is_ident_start(chars[i + 1]) {
            i + 1
        } else if is_ident_start(ch) {
            i
        } else {
            out.push(ch);
            i += 1;
            continue;
        };

        // The character before the candidate (before the sigil, if present)
        // must not glue onto an identifier
        if i > 0 && is_ident_char(chars[i - 1]) {
            out.push(ch);
            i += 1;
            continue;
        }

        let mut name_end = name_start;
        while name_end < chars.len() && is_ident_char(chars[name_end]) {
            name_end += 1;
        }
        let name: String = chars[name_start..name_end].iter().collect();

        let def = match set.get(&name) {
            Some(def) => def,
            None => {
                // Copy the whole identifier so its tail is never rescanned
                for &c in &chars[i..name_end] {
                    out.push(c);
                }
                i = name_end;
                continue;
            }
        };

        let (call_args, after) = parse_invocation_args(&chars, name_end);

        *expansions += 1;
        if *expansions > MAX_EXPANSIONS_PER_FILE {
            let err = MacroError::ExpansionLimitExceeded {
                count: *expansions,
            };
            log_error!(err.error_code(), "Macro expansion limit exceeded",
                "macro" => name,
                "limit" => MAX_EXPANSIONS_PER_FILE
            );
            return Err(err);
        }

        let mut replacement = def.value.clone();
        for (position, param) in def.args.iter().enumerate() {
            let supplied = call_args
                .as_ref()
                .and_then(|args| args.get(position))
                .map(String::as_str)
                .unwrap_or("");
            replacement = replace_word(&replacement, param, supplied);
        }

        // Sigil consumed, replacement never rescanned
        out.push_str(&replacement);
        i = after;
    }

    Ok(out)
}

/// Parse a non-nested `(...)` argument list starting at `pos`.
///
/// Returns the parsed arguments and the index after the closing paren. When
/// `pos` is not an argument list (no `(`, a nested `(`, or no closing `)`),
/// returns None and `pos` unchanged so the text stays in place.
fn parse_invocation_args(chars: &[char], pos: usize) -> (Option<Vec<String>>, usize) {
    if pos >= chars.len() || chars[pos] != '(' {
        return (None, pos);
    }

    let mut j = pos + 1;
    while j < chars.len() {
        match chars[j] {
            ')' => {
                let list: String = chars[pos + 1..j].iter().collect();
                let args = if list.trim().is_empty() {
                    Vec::new()
                } else {
                    list.split(',').map(|a| a.trim().to_string()).collect()
                };
                return (Some(args), j + 1);
            }
            '(' => return (None, pos),
            _ => j += 1,
        }
    }
    (None, pos)
}

/// Replace standalone occurrences of `param` in `value` with `arg`
fn replace_word(value: &str, param: &str, arg: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut i = 0usize;

    while i < chars.len() {
        if !is_ident_start(chars[i]) || (i > 0 && is_ident_char(chars[i - 1])) {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let mut end = i;
        while end < chars.len() && is_ident_char(chars[end]) {
            end += 1;
        }
        let ident: String = chars[i..end].iter().collect();
        if ident == param {
            out.push_str(arg);
        } else {
            out.push_str(&ident);
        }
        i = end;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::extract_macros;
    use crate::classify::{reassemble, Classifier};

    fn preprocess(source: &str) -> String {
        let batches = Classifier::new().classify(source).unwrap();
        let (mut kept, set) = extract_macros(batches).unwrap();
        expand_macros(&mut kept, &set).unwrap();
        reassemble(&kept)
    }

    #[test]
    fn test_function_like_expansion() {
        let out = preprocess("#macro UNIT(n) n + \"px\"\nlet w = UNIT(10);\n");

        assert_eq!(out, "let w = 10 + \"px\";\n");
        assert!(!out.contains("#macro"));
    }

    #[test]
    fn test_object_like_expansion() {
        let out = preprocess("#macro WIDTH 100\nlet w = WIDTH;\n");
        assert_eq!(out, "let w = 100;\n");
    }

    #[test]
    fn test_sigil_consumed() {
        let out = preprocess("#macro WIDTH 100\nlet w = #WIDTH;\n");
        assert_eq!(out, "let w = 100;\n");
    }

    #[test]
    fn test_word_boundary_blocks_partial_match() {
        let out = preprocess("#macro W 1\nlet WX = W2 + aW;\n");
        assert_eq!(out, "let WX = W2 + aW;\n");
    }

    #[test]
    fn test_missing_args_default_empty() {
        let out = preprocess("#macro PAIR(a, b) [a, b]\nlet p = PAIR(1);\n");
        assert_eq!(out, "let p = [1, ];\n");
    }

    #[test]
    fn test_no_recursive_expansion() {
        let out = preprocess("#macro A B\n#macro B C\nlet x = A;\n");
        assert_eq!(out, "let x = B;\n");
    }

    #[test]
    fn test_strings_untouched() {
        let out = preprocess("#macro WIDTH 100\nlet s = \"WIDTH\";\n");
        assert_eq!(out, "let s = \"WIDTH\";\n");
    }

    #[test]
    fn test_param_boundary_inside_value() {
        let out = preprocess("#macro F(n) n + nn\nlet x = F(5);\n");
        assert_eq!(out, "let x = 5 + nn;\n");
    }

    #[test]
    fn test_unclosed_paren_expands_without_args() {
        let out = preprocess("#macro W 9\nlet x = W(1\n");
        // Plain macro still expands, the open paren stays in the text
        assert!(out.contains("9(1"));
    }

    #[test]
    fn test_replace_word_helper() {
        assert_eq!(replace_word("n + n2 + n", "n", "10"), "10 + n2 + 10");
        assert_eq!(replace_word("no n here", "n", "x"), "no x here");
    }
}

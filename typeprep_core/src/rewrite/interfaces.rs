//! Global interface rewriter
//!
//! Recognizes bracket-delimited interface markers anywhere in the source:
//!
//! ```text
//! [interface a.b.C { x: number }]
//! [export interface Config { url: string }]
//! ```
//!
//! Each marker is removed in place and re-emitted as a nested namespace
//! declaration collected into a prefix accumulator. The scan is a single
//! forward cursor pass over the tokenizer's character stream, so braces and
//! brackets inside strings, comments, or regexes never confuse the depth
//! tracking. A marker whose closing bracket cannot be found stops the pass;
//! everything after it is left untouched.

use crate::classify::{LexState, ScanChar, ScriptTokenizer, Tokenizer};
use crate::config::compile_time::rewriter::*;
use crate::logging::codes;
use crate::{log_debug, log_success, log_warning};

/// Result of one interface rewriting pass
#[derive(Debug, Clone, Default)]
pub struct InterfaceRewrite {
    /// Source text with all rewritten markers removed
    pub text: String,
    /// Namespace declarations to prefix onto the final output
    pub declarations: String,
    /// Number of markers successfully rewritten
    pub rewritten: usize,
}

/// Interface rewriting errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum RewriteError {
    #[error("Too many interface markers: {count} (max {MAX_INTERFACE_MARKERS})")]
    MarkerLimitExceeded { count: usize },
}

impl RewriteError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            RewriteError::MarkerLimitExceeded { .. } => codes::rewrite::MARKER_LIMIT_EXCEEDED,
        }
    }
}

/// Parsed marker header: `[` `export`? `interface` dotted.name
struct MarkerHeader {
    exported: bool,
    name: String,
    /// Index just past the dotted name
    after_name: usize,
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

fn skip_whitespace(scanned: &[ScanChar], mut i: usize) -> usize {
    while i < scanned.len() && scanned[i].ch.is_whitespace() {
        i += 1;
    }
    i
}

/// Match a bare keyword at `i`, returning the index just past it
fn match_keyword(scanned: &[ScanChar], i: usize, keyword: &str) -> Option<usize> {
    let mut j = i;
    for expected in keyword.chars() {
        if scanned.get(j).map(|sc| sc.ch) != Some(expected) {
            return None;
        }
        j += 1;
    }
    // Must end at a word boundary
    if scanned.get(j).map(|sc| is_ident_char(sc.ch)).unwrap_or(false) {
        return None;
    }
    Some(j)
}

/// Try to parse a marker header starting just after an opening `[`
fn parse_header(scanned: &[ScanChar], after_bracket: usize) -> Option<MarkerHeader> {
    let mut i = skip_whitespace(scanned, after_bracket);

    let exported = match match_keyword(scanned, i, "export") {
        Some(j) => {
            i = skip_whitespace(scanned, j);
            true
        }
        None => false,
    };

    i = match_keyword(scanned, i, "interface")?;
    i = skip_whitespace(scanned, i);

    if !scanned.get(i).map(|sc| is_ident_start(sc.ch)).unwrap_or(false) {
        return None;
    }

    let mut name = String::new();
    while let Some(sc) = scanned.get(i) {
        if is_ident_char(sc.ch) || sc.ch == '.' {
            name.push(sc.ch);
            i += 1;
        } else {
            break;
        }
    }

    // Reject malformed dotted chains like `a..b` or `a.`
    if name.split('.').any(|seg| seg.is_empty()) {
        return None;
    }

    Some(MarkerHeader {
        exported,
        name,
        after_name: i,
    })
}

/// Located marker body and end
struct MarkerSpan {
    body_start: usize,
    body_end: usize,
    marker_end: usize,
}

/// From just past the dotted name, locate the brace-delimited body and the
/// marker's closing `]`. Depth only moves on Code-state characters.
fn locate_marker_span(scanned: &[ScanChar], after_name: usize) -> Option<MarkerSpan> {
    let mut bracket_depth = 1i32; // the opening `[` already seen
    let mut brace_depth = 0i32;
    let mut body_start = None;
    let mut body_end = None;

    let mut i = after_name;
    while i < scanned.len() {
        let sc = &scanned[i];
        if sc.state == LexState::Code {
            match sc.ch {
                '{' => {
                    brace_depth += 1;
                    if brace_depth == 1 && body_start.is_none() {
                        body_start = Some(i);
                    }
                }
                '}' => {
                    brace_depth -= 1;
                    if brace_depth == 0 && body_start.is_some() && body_end.is_none() {
                        body_end = Some(i);
                    }
                }
                '[' => bracket_depth += 1,
                ']' => {
                    bracket_depth -= 1;
                    if bracket_depth == 0 {
                        return Some(MarkerSpan {
                            body_start: body_start?,
                            body_end: body_end?,
                            marker_end: i,
                        });
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }

    None
}

/// Build the nested namespace declaration for one marker
fn build_declaration(header: &MarkerHeader, body: &str) -> String {
    let segments: Vec<&str> = header.name.split('.').collect();
    let (interface_name, namespaces) = segments.split_last().unwrap_or((&"", &[]));

    let mut decl = String::new();
    for ns in namespaces {
        decl.push_str("export namespace ");
        decl.push_str(ns);
        decl.push_str(" { ");
    }

    if header.exported {
        decl.push_str("export ");
    }
    decl.push_str("interface ");
    decl.push_str(interface_name);
    decl.push(' ');
    decl.push_str(body);

    for _ in namespaces.iter() {
        decl.push_str(" }");
    }
    decl.push(';');
    decl.push('\n');

    decl
}

/// Rewrite all interface markers in `source`
pub fn rewrite_interfaces(source: &str) -> Result<InterfaceRewrite, RewriteError> {
    let scanned = ScriptTokenizer::new().scan(source);

    let mut result = InterfaceRewrite {
        text: String::with_capacity(source.len()),
        ..Default::default()
    };

    let mut i = 0;
    while i < scanned.len() {
        let sc = &scanned[i];

        if sc.ch != '[' || sc.state != LexState::Code {
            result.text.push(sc.ch);
            i += 1;
            continue;
        }

        let header = match parse_header(&scanned, i + 1) {
            Some(header) => header,
            None => {
                result.text.push(sc.ch);
                i += 1;
                continue;
            }
        };

        if result.rewritten + 1 > MAX_INTERFACE_MARKERS {
            let error = RewriteError::MarkerLimitExceeded {
                count: result.rewritten + 1,
            };
            return Err(error);
        }

        let span = match locate_marker_span(&scanned, header.after_name) {
            Some(span) => span,
            None => {
                // Best effort: a malformed marker ends the pass, the rest of
                // the text is copied through untouched
                log_warning!("Unterminated interface marker, rewriting stopped",
                    "name" => header.name
                );
                for sc in &scanned[i..] {
                    result.text.push(sc.ch);
                }
                return Ok(result);
            }
        };

        let depth = header.name.split('.').count();
        if depth > MAX_NAMESPACE_DEPTH {
            log_warning!("Interface namespace nests too deeply, marker left in place",
                "name" => header.name,
                "depth" => depth,
                "limit" => MAX_NAMESPACE_DEPTH
            );
            for sc in &scanned[i..=span.marker_end] {
                result.text.push(sc.ch);
            }
            i = span.marker_end + 1;
            continue;
        }

        let body: String = scanned[span.body_start..=span.body_end]
            .iter()
            .map(|sc| sc.ch)
            .collect();

        log_debug!("Rewriting interface marker",
            "name" => header.name,
            "exported" => header.exported
        );

        result.declarations.push_str(&build_declaration(&header, &body));
        result.rewritten += 1;
        i = span.marker_end + 1;
    }

    if result.rewritten > 0 {
        log_success!(
            codes::success::REWRITE_COMPLETE,
            "Interface markers rewritten",
            "count" => result.rewritten
        );
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_marker() {
        let result = rewrite_interfaces("[interface C { x: number }] rest").unwrap();
        assert_eq!(result.rewritten, 1);
        assert_eq!(result.declarations, "interface C { x: number };\n");
        assert_eq!(result.text, " rest");
    }

    #[test]
    fn test_dotted_namespace_chain() {
        let result = rewrite_interfaces("[interface a.b.C { x: number }]").unwrap();
        assert_eq!(
            result.declarations,
            "export namespace a { export namespace b { interface C { x: number } } };\n"
        );
        // Exactly two closing braces beyond the interface's own
        let after_body = result
            .declarations
            .split("x: number }")
            .nth(1)
            .unwrap();
        assert_eq!(after_body.matches('}').count(), 2);
    }

    #[test]
    fn test_export_keyword_carried() {
        let result = rewrite_interfaces("[export interface Cfg { url: string }]").unwrap();
        assert_eq!(result.declarations, "export interface Cfg { url: string };\n");
    }

    #[test]
    fn test_marker_removed_in_place() {
        let result = rewrite_interfaces("before [interface X { }] after").unwrap();
        assert_eq!(result.text, "before  after");
    }

    #[test]
    fn test_nested_braces_in_body() {
        let result =
            rewrite_interfaces("[interface X { fn: { a: number, b: string } }]").unwrap();
        assert_eq!(
            result.declarations,
            "interface X { fn: { a: number, b: string } };\n"
        );
    }

    #[test]
    fn test_braces_in_strings_ignored() {
        let source = "[interface X { note: \"}\" }]";
        let result = rewrite_interfaces(source).unwrap();
        assert_eq!(result.rewritten, 1);
        assert!(result.declarations.contains("note: \"}\""));
    }

    #[test]
    fn test_ordinary_brackets_untouched() {
        let source = "const a = [1, 2, 3]; const b = arr[idx];";
        let result = rewrite_interfaces(source).unwrap();
        assert_eq!(result.rewritten, 0);
        assert_eq!(result.text, source);
    }

    #[test]
    fn test_malformed_marker_stops_pass() {
        let source = "[interface Broken { x: number } no close [interface Y { }]";
        let result = rewrite_interfaces(source).unwrap();
        // Nothing rewritten; the rest (including the second marker) survives
        assert_eq!(result.rewritten, 0);
        assert_eq!(result.text, source);
    }

    #[test]
    fn test_multiple_markers() {
        let source = "[interface A { x: number }] mid [interface B { y: string }]";
        let result = rewrite_interfaces(source).unwrap();
        assert_eq!(result.rewritten, 2);
        assert!(result.declarations.contains("interface A"));
        assert!(result.declarations.contains("interface B"));
        assert_eq!(result.text, " mid ");
    }

    #[test]
    fn test_marker_in_string_literal_ignored() {
        let source = "const s = \"[interface A { }]\";";
        let result = rewrite_interfaces(source).unwrap();
        assert_eq!(result.rewritten, 0);
        assert_eq!(result.text, source);
    }
}

//! Per-character script tokenizer
//!
//! Walks source text once and tags every character with the lexical state it
//! belongs to, plus running nesting depths for braces, brackets, and parens.
//! The classifier and the interface rewriter both consume this stream; neither
//! re-implements string/comment/regex detection on its own.

use super::LexState;

/// Classification flags for a single input character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanChar {
    pub ch: char,
    pub state: LexState,
    pub brace_depth: i32,
    pub bracket_depth: i32,
    pub paren_depth: i32,
}

/// Tokenizer seam: yields per-character classification flags for source text
pub trait Tokenizer {
    fn scan(&mut self, source: &str) -> Vec<ScanChar>;
}

/// Internal scanner mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    SingleQuote,
    DoubleQuote,
    Template,
    FencedTemplate,
    LineComment,
    BlockComment,
    Regex,
    Preprocessor,
}

impl Mode {
    fn state(self) -> LexState {
        match self {
            Mode::Code => LexState::Code,
            Mode::SingleQuote | Mode::DoubleQuote | Mode::Template | Mode::FencedTemplate => {
                LexState::Str
            }
            Mode::LineComment | Mode::BlockComment => LexState::Comment,
            Mode::Regex => LexState::Regex,
            Mode::Preprocessor => LexState::Preprocessor,
        }
    }
}

/// Characters after which a `/` starts a regex literal rather than division
fn regex_can_follow(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => matches!(
            c,
            '(' | '[' | '{' | ',' | ';' | '=' | ':' | '!' | '&' | '|' | '?' | '+' | '-' | '*'
                | '%' | '<' | '>' | '~' | '^'
        ),
    }
}

/// Stateful single-pass scanner for TypeScript-flavored source
pub struct ScriptTokenizer {
    mode: Mode,
    escaped: bool,
    at_line_start: bool,
    block_comment_len: usize,
    prev_significant: Option<char>,
    brace_depth: i32,
    bracket_depth: i32,
    paren_depth: i32,
}

impl ScriptTokenizer {
    pub fn new() -> Self {
        Self {
            mode: Mode::Code,
            escaped: false,
            at_line_start: true,
            block_comment_len: 0,
            prev_significant: None,
            brace_depth: 0,
            bracket_depth: 0,
            paren_depth: 0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn emit(&self, ch: char, state: LexState, out: &mut Vec<ScanChar>) {
        out.push(ScanChar {
            ch,
            state,
            brace_depth: self.brace_depth,
            bracket_depth: self.bracket_depth,
            paren_depth: self.paren_depth,
        });
    }
}

impl Default for ScriptTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for ScriptTokenizer {
    fn scan(&mut self, source: &str) -> Vec<ScanChar> {
        self.reset();

        let chars: Vec<char> = source.chars().collect();
        let mut out = Vec::with_capacity(chars.len());
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            let next = chars.get(i + 1).copied();

            match self.mode {
                Mode::Code => {
                    match ch {
                        '\'' => {
                            self.mode = Mode::SingleQuote;
                            self.emit(ch, LexState::Str, &mut out);
                        }
                        '"' => {
                            self.mode = Mode::DoubleQuote;
                            self.emit(ch, LexState::Str, &mut out);
                        }
                        '`' => {
                            // Three backticks open a fenced multiline template
                            if next == Some('`') && chars.get(i + 2) == Some(&'`') {
                                self.mode = Mode::FencedTemplate;
                                self.emit(ch, LexState::Str, &mut out);
                                self.emit(chars[i + 1], LexState::Str, &mut out);
                                self.emit(chars[i + 2], LexState::Str, &mut out);
                                i += 3;
                                self.at_line_start = false;
                                self.prev_significant = Some('`');
                                continue;
                            }
                            self.mode = Mode::Template;
                            self.emit(ch, LexState::Str, &mut out);
                        }
                        '/' if next == Some('/') => {
                            self.mode = Mode::LineComment;
                            self.emit(ch, LexState::Comment, &mut out);
                        }
                        '/' if next == Some('*') => {
                            self.mode = Mode::BlockComment;
                            self.block_comment_len = 1;
                            self.emit(ch, LexState::Comment, &mut out);
                        }
                        '/' if regex_can_follow(self.prev_significant) => {
                            self.mode = Mode::Regex;
                            self.emit(ch, LexState::Regex, &mut out);
                        }
                        '#' if self.at_line_start
                            && next.map(|c| c.is_ascii_alphabetic()).unwrap_or(false) =>
                        {
                            self.mode = Mode::Preprocessor;
                            self.emit(ch, LexState::Preprocessor, &mut out);
                        }
                        '{' => {
                            self.brace_depth += 1;
                            self.emit(ch, LexState::Code, &mut out);
                        }
                        '}' => {
                            self.emit(ch, LexState::Code, &mut out);
                            self.brace_depth -= 1;
                        }
                        '[' => {
                            self.bracket_depth += 1;
                            self.emit(ch, LexState::Code, &mut out);
                        }
                        ']' => {
                            self.emit(ch, LexState::Code, &mut out);
                            self.bracket_depth -= 1;
                        }
                        '(' => {
                            self.paren_depth += 1;
                            self.emit(ch, LexState::Code, &mut out);
                        }
                        ')' => {
                            self.emit(ch, LexState::Code, &mut out);
                            self.paren_depth -= 1;
                        }
                        _ => self.emit(ch, LexState::Code, &mut out),
                    }

                    if ch == '\n' {
                        self.at_line_start = true;
                    } else if !ch.is_whitespace() {
                        self.at_line_start = false;
                        self.prev_significant = Some(ch);
                    }
                }

                Mode::SingleQuote | Mode::DoubleQuote => {
                    let terminator = if self.mode == Mode::SingleQuote { '\'' } else { '"' };
                    self.emit(ch, LexState::Str, &mut out);

                    if self.escaped {
                        self.escaped = false;
                    } else if ch == '\\' {
                        self.escaped = true;
                    } else if ch == terminator || ch == '\n' {
                        // Newline ends an unterminated single-line string
                        self.mode = Mode::Code;
                        self.prev_significant = Some(terminator);
                        self.at_line_start = ch == '\n';
                    }
                }

                Mode::Template => {
                    self.emit(ch, LexState::Str, &mut out);

                    if self.escaped {
                        self.escaped = false;
                    } else if ch == '\\' {
                        self.escaped = true;
                    } else if ch == '`' {
                        self.mode = Mode::Code;
                        self.prev_significant = Some('`');
                    }
                }

                Mode::FencedTemplate => {
                    if ch == '`' && next == Some('`') && chars.get(i + 2) == Some(&'`') {
                        self.emit(ch, LexState::Str, &mut out);
                        self.emit(chars[i + 1], LexState::Str, &mut out);
                        self.emit(chars[i + 2], LexState::Str, &mut out);
                        i += 3;
                        self.mode = Mode::Code;
                        self.prev_significant = Some('`');
                        self.at_line_start = false;
                        continue;
                    }
                    self.emit(ch, LexState::Str, &mut out);
                }

                Mode::LineComment => {
                    if ch == '\n' {
                        self.mode = Mode::Code;
                        self.at_line_start = true;
                        self.emit(ch, LexState::Code, &mut out);
                    } else {
                        self.emit(ch, LexState::Comment, &mut out);
                    }
                }

                Mode::BlockComment => {
                    self.emit(ch, LexState::Comment, &mut out);
                    self.block_comment_len += 1;
                    // `*/` closes, but the opener's own `*` never does
                    if ch == '/' && chars[i - 1] == '*' && self.block_comment_len >= 4 {
                        self.mode = Mode::Code;
                    }
                }

                Mode::Regex => {
                    self.emit(ch, LexState::Regex, &mut out);

                    if self.escaped {
                        self.escaped = false;
                    } else if ch == '\\' {
                        self.escaped = true;
                    } else if ch == '/' {
                        // Consume trailing regex flags
                        while let Some(&flag) = chars.get(i + 1) {
                            if flag.is_ascii_alphabetic() {
                                i += 1;
                                self.emit(flag, LexState::Regex, &mut out);
                            } else {
                                break;
                            }
                        }
                        self.mode = Mode::Code;
                        self.prev_significant = Some('/');
                    } else if ch == '\n' {
                        // Unterminated regex ends at the line break
                        self.mode = Mode::Code;
                        self.at_line_start = true;
                    }
                }

                Mode::Preprocessor => {
                    if ch == '\n' {
                        // Trailing backslash continues the directive onto the next line
                        let continued = chars.get(i.wrapping_sub(1)) == Some(&'\\');
                        self.emit(ch, LexState::Preprocessor, &mut out);
                        if !continued {
                            self.mode = Mode::Code;
                        }
                        self.at_line_start = true;
                    } else {
                        self.emit(ch, LexState::Preprocessor, &mut out);
                    }
                }
            }

            i += 1;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states(source: &str) -> Vec<(char, LexState)> {
        let mut tokenizer = ScriptTokenizer::new();
        tokenizer
            .scan(source)
            .into_iter()
            .map(|sc| (sc.ch, sc.state))
            .collect()
    }

    #[test]
    fn test_plain_code() {
        let scanned = states("let x = 1;");
        assert!(scanned.iter().all(|(_, s)| *s == LexState::Code));
    }

    #[test]
    fn test_double_quoted_string() {
        let scanned = states(r#"a = "hi";"#);
        let str_chars: String = scanned
            .iter()
            .filter(|(_, s)| *s == LexState::Str)
            .map(|(c, _)| *c)
            .collect();
        assert_eq!(str_chars, "\"hi\"");
    }

    #[test]
    fn test_escaped_quote_stays_in_string() {
        let scanned = states(r#""a\"b" + c"#);
        let str_chars: String = scanned
            .iter()
            .filter(|(_, s)| *s == LexState::Str)
            .map(|(c, _)| *c)
            .collect();
        assert_eq!(str_chars, r#""a\"b""#);
        assert_eq!(scanned.last().unwrap().1, LexState::Code);
    }

    #[test]
    fn test_line_comment_ends_at_newline() {
        let scanned = states("x // note\ny");
        assert_eq!(scanned[2].1, LexState::Comment);
        let newline = scanned.iter().find(|(c, _)| *c == '\n').unwrap();
        assert_eq!(newline.1, LexState::Code);
        assert_eq!(scanned.last().unwrap(), &('y', LexState::Code));
    }

    #[test]
    fn test_block_comment() {
        let scanned = states("a /* b */ c");
        let comment: String = scanned
            .iter()
            .filter(|(_, s)| *s == LexState::Comment)
            .map(|(c, _)| *c)
            .collect();
        assert_eq!(comment, "/* b */");
    }

    #[test]
    fn test_regex_after_equals() {
        let scanned = states("x = /ab+c/g;");
        let regex: String = scanned
            .iter()
            .filter(|(_, s)| *s == LexState::Regex)
            .map(|(c, _)| *c)
            .collect();
        assert_eq!(regex, "/ab+c/g");
    }

    #[test]
    fn test_division_is_not_regex() {
        let scanned = states("x = a / b / c;");
        assert!(scanned.iter().all(|(_, s)| *s != LexState::Regex));
    }

    #[test]
    fn test_preprocessor_directive() {
        let scanned = states("#macro W 100\nlet x = 1;");
        let pre: String = scanned
            .iter()
            .filter(|(_, s)| *s == LexState::Preprocessor)
            .map(|(c, _)| *c)
            .collect();
        assert_eq!(pre, "#macro W 100\n");
    }

    #[test]
    fn test_preprocessor_continuation() {
        let scanned = states("#macro W a \\\nb\nx");
        let pre: String = scanned
            .iter()
            .filter(|(_, s)| *s == LexState::Preprocessor)
            .map(|(c, _)| *c)
            .collect();
        assert_eq!(pre, "#macro W a \\\nb\n");
        assert_eq!(scanned.last().unwrap(), &('x', LexState::Code));
    }

    #[test]
    fn test_hex_color_mid_line_is_code() {
        let scanned = states("color: #fff;");
        assert!(scanned.iter().all(|(_, s)| *s == LexState::Code));
    }

    #[test]
    fn test_fenced_template() {
        let scanned = states("x = ```\n  a\n```;");
        let fenced: String = scanned
            .iter()
            .filter(|(_, s)| *s == LexState::Str)
            .map(|(c, _)| *c)
            .collect();
        assert_eq!(fenced, "```\n  a\n```");
        assert_eq!(scanned.last().unwrap(), &(';', LexState::Code));
    }

    #[test]
    fn test_depth_counters() {
        let mut tokenizer = ScriptTokenizer::new();
        let scanned = tokenizer.scan("[a {b} c]");

        assert_eq!(scanned[0].bracket_depth, 1);
        let brace_open = scanned.iter().find(|sc| sc.ch == '{').unwrap();
        assert_eq!(brace_open.brace_depth, 1);
        let close = scanned.last().unwrap();
        assert_eq!(close.ch, ']');
        assert_eq!(close.bracket_depth, 1);
    }

    #[test]
    fn test_braces_in_strings_not_counted() {
        let mut tokenizer = ScriptTokenizer::new();
        let scanned = tokenizer.scan(r#"x = "{" ; y"#);
        assert_eq!(scanned.last().unwrap().brace_depth, 0);
    }
}

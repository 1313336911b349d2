//! Literal normalizer for Code batches
//!
//! Two independent rewrite rules, both pure substring replacements with
//! word-boundary semantics:
//!   1. a numeric literal immediately followed by a unit suffix
//!      (`px`, `%`, `em`, `rem`, `vh`, `vw`) becomes a double-quoted string
//!   2. a 3/4/6/8-digit hex color prefixed by `#` becomes a double-quoted
//!      string
//! The classifier guarantees these never run over string, comment, or regex
//! text; the boundary checks below additionally keep the pass idempotent on
//! text it has already quoted.

const UNIT_SUFFIXES: [&str; 6] = ["rem", "px", "em", "vh", "vw", "%"];

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// True if `prev` cannot be the tail of an identifier or an existing literal
fn is_left_boundary(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => !is_word_char(c) && c != '"' && c != '\'' && c != '.' && c != '#',
    }
}

fn is_right_boundary(next: Option<char>) -> bool {
    match next {
        None => true,
        Some(c) => !is_word_char(c) && c != '"' && c != '\'',
    }
}

/// Try to match a numeric-unit literal starting at `chars[i]`.
/// Returns the matched length in chars and the literal text.
fn match_unit_literal(chars: &[char], i: usize) -> Option<(usize, String)> {
    let mut j = i;

    while j < chars.len() && chars[j].is_ascii_digit() {
        j += 1;
    }
    if j == i {
        return None;
    }

    // Optional decimal part
    if j < chars.len() && chars[j] == '.' {
        let mut k = j + 1;
        while k < chars.len() && chars[k].is_ascii_digit() {
            k += 1;
        }
        if k > j + 1 {
            j = k;
        }
    }

    let rest: String = chars[j..].iter().take(4).collect();
    let suffix = UNIT_SUFFIXES.iter().find(|s| rest.starts_with(**s))?;
    let end = j + suffix.len();

    if !is_right_boundary(chars.get(end).copied()) {
        return None;
    }

    let literal: String = chars[i..end].iter().collect();
    Some((end - i, literal))
}

/// Try to match a hex color literal starting at `chars[i]` (which is `#`)
fn match_hex_color(chars: &[char], i: usize) -> Option<(usize, String)> {
    let mut j = i + 1;
    while j < chars.len() && chars[j].is_ascii_hexdigit() {
        j += 1;
    }

    let digit_count = j - (i + 1);
    if !matches!(digit_count, 3 | 4 | 6 | 8) {
        return None;
    }

    if !is_right_boundary(chars.get(j).copied()) {
        return None;
    }

    let literal: String = chars[i..j].iter().collect();
    Some((j - i, literal))
}

/// Apply both normalization rules to one Code batch's text
pub fn normalize_code(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let prev = if i == 0 { None } else { Some(chars[i - 1]) };

        if ch.is_ascii_digit() && is_left_boundary(prev) {
            if let Some((len, literal)) = match_unit_literal(&chars, i) {
                out.push('"');
                out.push_str(&literal);
                out.push('"');
                i += len;
                continue;
            }
        }

        if ch == '#' && is_left_boundary(prev) {
            if let Some((len, literal)) = match_hex_color(&chars, i) {
                out.push('"');
                out.push_str(&literal);
                out.push('"');
                i += len;
                continue;
            }
        }

        out.push(ch);
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_literal_quoted() {
        assert_eq!(normalize_code("width: 10px;"), "width: \"10px\";");
        assert_eq!(normalize_code("margin: 1.5em,"), "margin: \"1.5em\",");
        assert_eq!(normalize_code("h = 50%;"), "h = \"50%\";");
        assert_eq!(normalize_code("size = 2rem"), "size = \"2rem\"");
    }

    #[test]
    fn test_hex_color_quoted() {
        assert_eq!(normalize_code("c = #fff;"), "c = \"#fff\";");
        assert_eq!(normalize_code("c = #A1B2C3;"), "c = \"#A1B2C3\";");
        assert_eq!(normalize_code("c = #12345678 "), "c = \"#12345678\" ");
    }

    #[test]
    fn test_wrong_hex_length_untouched() {
        assert_eq!(normalize_code("c = #12345;"), "c = #12345;");
        assert_eq!(normalize_code("c = #ab;"), "c = #ab;");
    }

    #[test]
    fn test_idempotent_on_quoted_literals() {
        let once = normalize_code("width: 10px;");
        assert_eq!(normalize_code(&once), once);

        assert_eq!(normalize_code("c = \"#fff\";"), "c = \"#fff\";");
        assert_eq!(normalize_code("w = \"10px\";"), "w = \"10px\";");
    }

    #[test]
    fn test_identifier_boundaries_respected() {
        // Inside identifiers, no match
        assert_eq!(normalize_code("grid10px = 1;"), "grid10px = 1;");
        assert_eq!(normalize_code("x10pxy"), "x10pxy");
        // Plain numbers without a unit stay bare
        assert_eq!(normalize_code("n = 100;"), "n = 100;");
    }

    #[test]
    fn test_modulo_not_a_unit() {
        assert_eq!(normalize_code("r = a % b;"), "r = a % b;");
        assert_eq!(normalize_code("r = 10 % 3;"), "r = 10 % 3;");
    }

    #[test]
    fn test_member_access_untouched() {
        // A trailing `.` dereference after digits is property access syntax
        assert_eq!(normalize_code("v.0px"), "v.0px");
    }

    #[test]
    fn test_multiple_matches_in_one_batch() {
        assert_eq!(
            normalize_code("pad(10px, 20px, #abc)"),
            "pad(\"10px\", \"20px\", \"#abc\")"
        );
    }
}

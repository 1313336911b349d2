//! Template dedenter for fenced string batches
//!
//! A triple-backtick fence inside string text marks a multiline template
//! whose indentation follows the surrounding code, not the intended output.
//! This pass strips leading/trailing blank lines, measures the base indent
//! from the first non-blank line, and removes exactly that prefix from every
//! line that carries it. Shallower lines pass through untouched; tab/space
//! mixing is deliberately not validated.

const FENCE: &str = "```";

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c.is_whitespace())
}

fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[..end]
}

/// Dedent the inner content of one fenced block
pub fn dedent_block(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();

    let first = lines.iter().position(|l| !is_blank(l));
    let last = lines.iter().rposition(|l| !is_blank(l));

    let (first, last) = match (first, last) {
        (Some(f), Some(l)) => (f, l),
        _ => return String::new(),
    };

    let base = leading_whitespace(lines[first]);

    let mut out = String::with_capacity(content.len());
    for (i, line) in lines[first..=last].iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match line.strip_prefix(base) {
            Some(stripped) => out.push_str(stripped),
            None => out.push_str(line),
        }
    }

    out
}

/// Rewrite a string batch: fenced templates become dedented single-backtick
/// template literals, anything else passes through unchanged
pub fn dedent_str_batch(text: &str) -> String {
    let inner = match text
        .strip_prefix(FENCE)
        .and_then(|rest| rest.strip_suffix(FENCE))
    {
        Some(inner) => inner,
        None => return text.to_string(),
    };

    format!("`{}`", dedent_block(inner))
}

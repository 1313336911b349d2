//! Source rewriting passes
//!
//! Three batch-aware transformations: literal normalization quotes bare unit
//! and hex-color literals in Code batches, dedenting reshapes fenced string
//! batches into template literals, and the interface rewriter hoists dotted
//! interface markers into namespace declarations.

pub mod dedent;
pub mod interfaces;
pub mod normalizer;

pub use dedent::{dedent_block, dedent_str_batch};
pub use interfaces::{rewrite_interfaces, InterfaceRewrite, RewriteError};
pub use normalizer::normalize_code;

use crate::classify::{Batch, LexState};

/// Apply the per-batch text rewrites in place.
///
/// Code batches get literal normalization, Str batches get fence dedenting.
/// Comment, Regex, and Preprocessor batches pass through untouched.
pub fn apply_text_rewrites(batches: &mut [Batch]) {
    for batch in batches.iter_mut() {
        match batch.state {
            LexState::Code => batch.text = normalize_code(&batch.text),
            LexState::Str => batch.text = dedent_str_batch(&batch.text),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{reassemble, Classifier};

    #[test]
    fn test_rewrites_respect_batch_states() {
        let source = "let w = 10px; // 20px stays\nlet s = \"5em\";\n";
        let mut batches = Classifier::new().classify(source).unwrap();
        apply_text_rewrites(&mut batches);
        let out = reassemble(&batches);

        assert!(out.contains("\"10px\""));
        // Comment and string content untouched
        assert!(out.contains("// 20px stays"));
        assert!(out.contains("\"5em\""));
    }

    #[test]
    fn test_non_fenced_strings_pass_through() {
        let source = "let s = \"  indented  \";\n";
        let mut batches = Classifier::new().classify(source).unwrap();
        apply_text_rewrites(&mut batches);

        assert_eq!(reassemble(&batches), source);
    }
}

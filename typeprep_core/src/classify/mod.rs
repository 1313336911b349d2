//! Lexical classification into state batches
//!
//! Splits source text into maximal runs of characters sharing one lexical
//! state. Downstream passes are gated on the batch state: the literal
//! normalizer only touches Code batches, the dedenter only Str batches, and
//! the macro engine reads Preprocessor batches. Classification never alters
//! text; reassembling the batches reproduces the input byte for byte.

pub mod tokenizer;

pub use tokenizer::{ScanChar, ScriptTokenizer, Tokenizer};

use crate::config::compile_time::lexical::*;
use crate::config::runtime::ClassifyPreferences;
use crate::logging::codes;
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_success};

/// Lexical state of a run of source characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexState {
    Code,
    Str,
    Comment,
    Regex,
    Preprocessor,
}

impl LexState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LexState::Code => "code",
            LexState::Str => "string",
            LexState::Comment => "comment",
            LexState::Regex => "regex",
            LexState::Preprocessor => "preprocessor",
        }
    }
}

impl std::fmt::Display for LexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A maximal contiguous run of characters sharing one lexical state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub state: LexState,
    pub text: String,
    pub span: Span,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }
}

/// Classification errors with compile-time security boundaries
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClassifyError {
    #[error("Source too large: {size} bytes (max {MAX_SOURCE_SIZE})")]
    SourceTooLarge { size: usize },

    #[error("Too many batches: {count} (max {MAX_BATCH_COUNT})")]
    BatchLimitExceeded { count: usize },
}

impl ClassifyError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ClassifyError::SourceTooLarge { .. } => codes::classify::SOURCE_TOO_LARGE,
            ClassifyError::BatchLimitExceeded { .. } => codes::classify::BATCH_LIMIT_EXCEEDED,
        }
    }
}

/// Explicit accumulator for in-progress batches
///
/// A state transition flushes the current batch before the new character is
/// appended; getting this ordering wrong splits multi-character tokens.
#[derive(Debug, Default)]
pub struct BatchOutput {
    batches: Vec<Batch>,
    current_state: Option<LexState>,
    current_text: String,
    current_start: Position,
    cursor: Position,
}

impl BatchOutput {
    pub fn new() -> Self {
        Self {
            batches: Vec::new(),
            current_state: None,
            current_text: String::new(),
            current_start: Position::start(),
            cursor: Position::start(),
        }
    }

    /// Append a classified character, flushing first on a state change
    pub fn push(&mut self, state: LexState, ch: char) {
        if self.current_state != Some(state) {
            self.flush();
            self.current_state = Some(state);
            self.current_start = self.cursor;
        }
        self.current_text.push(ch);
        self.cursor = self.cursor.advance(ch);
    }

    /// Flush the in-progress batch, if any
    pub fn flush(&mut self) {
        if let Some(state) = self.current_state.take() {
            let text = std::mem::take(&mut self.current_text);
            self.batches.push(Batch {
                state,
                text,
                span: Span::new(self.current_start, self.cursor),
            });
        }
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Finish accumulation, flushing whatever remains at end of input
    pub fn into_batches(mut self) -> Vec<Batch> {
        self.flush();
        self.batches
    }
}

/// Per-run classification metrics
#[derive(Debug, Default, Clone)]
pub struct ClassifyMetrics {
    pub total_chars: usize,
    pub batch_count: usize,
    pub code_batches: usize,
    pub string_batches: usize,
    pub comment_batches: usize,
    pub regex_batches: usize,
    pub preprocessor_batches: usize,
}

impl ClassifyMetrics {
    fn record_batches(&mut self, batches: &[Batch]) {
        self.batch_count = batches.len();
        for batch in batches {
            self.total_chars += batch.text.chars().count();
            match batch.state {
                LexState::Code => self.code_batches += 1,
                LexState::Str => self.string_batches += 1,
                LexState::Comment => self.comment_batches += 1,
                LexState::Regex => self.regex_batches += 1,
                LexState::Preprocessor => self.preprocessor_batches += 1,
            }
        }
    }
}

/// Classifier wrapping a per-character tokenizer
pub struct Classifier<T: Tokenizer> {
    tokenizer: T,
    metrics: ClassifyMetrics,
    preferences: ClassifyPreferences,
}

impl Classifier<ScriptTokenizer> {
    pub fn new() -> Self {
        Self::with_tokenizer(ScriptTokenizer::new())
    }
}

impl Default for Classifier<ScriptTokenizer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Tokenizer> Classifier<T> {
    pub fn with_tokenizer(tokenizer: T) -> Self {
        Self {
            tokenizer,
            metrics: ClassifyMetrics::default(),
            preferences: ClassifyPreferences::default(),
        }
    }

    pub fn with_preferences(tokenizer: T, preferences: ClassifyPreferences) -> Self {
        Self {
            tokenizer,
            metrics: ClassifyMetrics::default(),
            preferences,
        }
    }

    pub fn metrics(&self) -> &ClassifyMetrics {
        &self.metrics
    }

    /// Split source text into state batches
    pub fn classify(&mut self, source: &str) -> Result<Vec<Batch>, ClassifyError> {
        self.metrics = ClassifyMetrics::default();

        if source.len() > MAX_SOURCE_SIZE {
            let error = ClassifyError::SourceTooLarge {
                size: source.len(),
            };
            log_error!(error.error_code(), "Source exceeds classification limit",
                "size" => source.len(),
                "limit" => MAX_SOURCE_SIZE
            );
            return Err(error);
        }

        log_debug!("Starting lexical classification",
            "source_bytes" => source.len()
        );

        let mut output = BatchOutput::new();

        for scan_char in self.tokenizer.scan(source) {
            output.push(scan_char.state, scan_char.ch);

            if output.batch_count() > MAX_BATCH_COUNT {
                let error = ClassifyError::BatchLimitExceeded {
                    count: output.batch_count(),
                };
                log_error!(error.error_code(), "Batch limit exceeded",
                    "count" => output.batch_count(),
                    "limit" => MAX_BATCH_COUNT
                );
                return Err(error);
            }
        }

        let batches = output.into_batches();

        if self.preferences.collect_batch_metrics {
            self.metrics.record_batches(&batches);
        }

        if self.preferences.log_state_statistics {
            log_success!(
                codes::success::CLASSIFICATION_COMPLETE,
                "Classification completed",
                "batches" => batches.len(),
                "code" => self.metrics.code_batches,
                "strings" => self.metrics.string_batches,
                "comments" => self.metrics.comment_batches
            );
        }

        Ok(batches)
    }
}

/// Rejoin batches into a single string, preserving input order
pub fn reassemble(batches: &[Batch]) -> String {
    let total: usize = batches.iter().map(|b| b.text.len()).sum();
    let mut out = String::with_capacity(total);
    for batch in batches {
        out.push_str(&batch.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn classify(source: &str) -> Vec<Batch> {
        Classifier::new().classify(source).unwrap()
    }

    #[test]
    fn test_single_code_batch() {
        let batches = classify("let x = 1;");
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].state, LexState::Code);
        assert_eq!(batches[0].text, "let x = 1;");
    }

    #[test]
    fn test_batches_never_mix_states() {
        let batches = classify("let s = \"text\"; // done");
        for batch in &batches {
            assert!(!batch.is_empty());
        }
        // Adjacent batches always differ in state
        for pair in batches.windows(2) {
            assert_ne!(pair[0].state, pair[1].state);
        }
    }

    #[test]
    fn test_reassembly_is_lossless() {
        let source = "let a = \"x\"; // c\nconst r = /ab/g;\n#macro W 1\nlet b = W;\n";
        let batches = classify(source);
        assert_eq!(reassemble(&batches), source);
    }

    #[test]
    fn test_flush_before_append() {
        let batches = classify("a\"b\"c");
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].text, "a");
        assert_eq!(batches[1].text, "\"b\"");
        assert_eq!(batches[1].state, LexState::Str);
        assert_eq!(batches[2].text, "c");
    }

    #[test]
    fn test_unterminated_string_still_flushes() {
        let batches = classify("let s = \"never closed");
        assert_eq!(reassemble(&batches), "let s = \"never closed");
        assert_eq!(batches.last().unwrap().state, LexState::Str);
    }

    #[test]
    fn test_batch_spans_are_contiguous() {
        let batches = classify("a = \"b\";\nc");
        let mut offset = 0;
        for batch in &batches {
            assert_eq!(batch.span.start().offset, offset);
            offset += batch.text.len();
            assert_eq!(batch.span.end().offset, offset);
        }
    }

    #[test]
    fn test_source_size_limit() {
        let big = "x".repeat(MAX_SOURCE_SIZE + 1);
        let result = Classifier::new().classify(&big);
        assert_matches!(result, Err(ClassifyError::SourceTooLarge { .. }));
    }

    #[test]
    fn test_metrics_collection() {
        let prefs = ClassifyPreferences {
            collect_batch_metrics: true,
            ..Default::default()
        };
        let mut classifier = Classifier::with_preferences(ScriptTokenizer::new(), prefs);
        classifier.classify("a = \"s\"; // c").unwrap();

        let metrics = classifier.metrics();
        assert!(metrics.code_batches >= 1);
        assert_eq!(metrics.string_batches, 1);
        assert_eq!(metrics.comment_batches, 1);
    }
}

// Internal modules
pub mod classify;
pub mod config;
pub mod file_processor;
#[macro_use]
pub mod logging;
pub mod macro_engine;
pub mod pipeline;
pub mod rewrite;
pub mod utils;

// Re-export key types for library consumers
pub use classify::{Batch, Classifier, LexState, ScriptTokenizer, Tokenizer};
pub use macro_engine::MacroDef;
pub use pipeline::{PipelineError, PreprocessMetrics, ProcessedSource};

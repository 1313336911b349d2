//! Source preprocessing pipeline
//!
//! Runs the full pass sequence over one source text: lexical classification,
//! literal normalization and fence dedenting, interface marker rewriting,
//! macro extraction and expansion. Namespace declarations produced by the
//! interface rewriter are prefixed to the output.

mod error;
mod result;

pub use error::PipelineError;
pub use result::{PreprocessMetrics, ProcessedSource};

use crate::classify::{reassemble, Classifier};
use crate::logging;
use crate::macro_engine::{expand_macros, extract_macros};
use crate::rewrite::{apply_text_rewrites, rewrite_interfaces};
use std::path::PathBuf;
use std::time::Instant;

/// Preprocess a single source text through every pass
pub fn preprocess_source(source: &str) -> Result<ProcessedSource, PipelineError> {
    let start_time = Instant::now();
    let mut metrics = PreprocessMetrics {
        input_bytes: source.len(),
        ..Default::default()
    };

    // Pass 1: classify, then rewrite batch texts in place
    let mut classifier = Classifier::new();
    let mut batches = classifier.classify(source)?;
    metrics.batch_count = batches.len();
    apply_text_rewrites(&mut batches);
    let normalized = reassemble(&batches);

    // Pass 2: interface markers become namespace declarations
    let rewrite = rewrite_interfaces(&normalized)?;
    metrics.markers_rewritten = rewrite.rewritten;

    // Pass 3: re-classify the rewritten text, then run the macro engine
    let batches = Classifier::new().classify(&rewrite.text)?;
    let (mut batches, macro_set) = extract_macros(batches)?;
    metrics.macro_count = macro_set.len();
    metrics.expansion_count = expand_macros(&mut batches, &macro_set)?;

    let mut output = rewrite.declarations;
    output.push_str(&reassemble(&batches));

    metrics.output_bytes = output.len();
    metrics.duration = start_time.elapsed();

    Ok(ProcessedSource { output, metrics })
}

/// Preprocess a file on disk.
///
/// Declaration files (`.d.ts`) pass through unchanged; everything else runs
/// the full pass sequence.
pub fn preprocess_file(file_path: &str) -> Result<ProcessedSource, PipelineError> {
    logging::with_file_context(PathBuf::from(file_path), 0, || {
        crate::log_info!("Starting source preprocessing", "file" => file_path);

        let file_result = crate::file_processor::process_file(file_path)?;

        if file_result.metadata.is_declaration_file {
            let metrics = PreprocessMetrics {
                input_bytes: file_result.source.len(),
                output_bytes: file_result.source.len(),
                duration: file_result.processing_duration,
                ..Default::default()
            };
            return Ok(ProcessedSource {
                output: file_result.source,
                metrics,
            });
        }

        let result = preprocess_source(&file_result.source)?;
        result.log_success(file_path);
        Ok(result)
    })
}

use std::time::Duration;

/// Per-file preprocessing metrics
#[derive(Debug, Clone, Default)]
pub struct PreprocessMetrics {
    /// Batches produced by the initial classification
    pub batch_count: usize,
    /// Macro definitions extracted from the file
    pub macro_count: usize,
    /// Macro expansions performed
    pub expansion_count: usize,
    /// Interface markers rewritten into namespace declarations
    pub markers_rewritten: usize,
    /// Input size in bytes
    pub input_bytes: usize,
    /// Output size in bytes
    pub output_bytes: usize,
    /// Total preprocessing duration
    pub duration: Duration,
}

impl PreprocessMetrics {
    /// Processing rate in bytes per millisecond
    pub fn bytes_per_ms(&self) -> f64 {
        let duration_ms = self.duration.as_secs_f64() * 1000.0;
        if duration_ms > 0.0 {
            self.input_bytes as f64 / duration_ms
        } else {
            0.0
        }
    }

    /// Whether any pass changed the source at all
    pub fn transformed_anything(&self) -> bool {
        self.macro_count > 0 || self.expansion_count > 0 || self.markers_rewritten > 0
    }
}

/// Fully preprocessed source ready for compilation
#[derive(Debug, Clone)]
pub struct ProcessedSource {
    /// Transformed source text, namespace declarations first
    pub output: String,
    /// Metrics collected across all passes
    pub metrics: PreprocessMetrics,
}

impl ProcessedSource {
    pub fn log_success(&self, file_path: &str) {
        crate::log_success!(
            crate::logging::codes::success::PREPROCESS_COMPLETE,
            "Source preprocessing completed",
            "file" => file_path,
            "input_bytes" => self.metrics.input_bytes,
            "output_bytes" => self.metrics.output_bytes,
            "macros" => self.metrics.macro_count,
            "expansions" => self.metrics.expansion_count,
            "markers" => self.metrics.markers_rewritten,
            "duration_ms" => format!("{:.2}", self.metrics.duration.as_secs_f64() * 1000.0)
        );
    }
}

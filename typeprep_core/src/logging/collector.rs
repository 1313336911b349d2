//! Error collector for batch file processing with cargo-style output
//!
//! Provides organized error collection and reporting for multi-file runs

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

// ============================================================================
// FILE PROCESSING CONTEXT
// ============================================================================

/// Context information for file processing
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

/// Summary of batch processing results
#[derive(Debug, Clone)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
    pub average_file_time: Duration,
}

impl ProcessingSummary {
    pub fn new() -> Self {
        Self {
            total_files: 0,
            successful_files: 0,
            failed_files: 0,
            files_with_warnings: 0,
            total_errors: 0,
            total_warnings: 0,
            total_processing_time: Duration::new(0, 0),
            average_file_time: Duration::new(0, 0),
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.successful_files as f64 / self.total_files as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

impl Default for ProcessingSummary {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe error collector for batch processing
pub struct ErrorCollector {
    /// Events organized by file path for cargo-style output
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,

    /// Processing contexts for timing information
    file_contexts: Mutex<BTreeMap<PathBuf, FileProcessingContext>>,

    /// Global processing start time
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            file_contexts: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    /// Record an event for a specific file
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = self.file_events.lock().unwrap();

        let max_events_per_file = MAX_LOG_EVENTS_PER_FILE;

        let file_events = events
            .entry(file_path.to_path_buf())
            .or_insert_with(Vec::new);

        if file_events.len() < max_events_per_file {
            file_events.push(event);
        } else if file_events.len() == max_events_per_file {
            // At the limit, append a single summary marker
            let summary_event = LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                max_events_per_file
            ));
            file_events.push(summary_event);
        }
    }

    /// Record file processing context
    pub fn record_file_context(&self, context: FileProcessingContext) {
        let mut contexts = self.file_contexts.lock().unwrap();
        contexts.insert(context.file_path.clone(), context);
    }

    /// Get all events for a specific file
    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        let events = self.file_events.lock().unwrap();
        events.get(file_path).cloned().unwrap_or_default()
    }

    /// Get errors for a specific file
    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        let events = self.file_events.lock().unwrap();
        events
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    /// Get warnings for a specific file
    pub fn get_file_warnings(&self, file_path: &Path) -> Vec<LogEvent> {
        let events = self.file_events.lock().unwrap();
        events
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_warning()).cloned().collect())
            .unwrap_or_default()
    }

    /// Get all file events (for cargo-style output)
    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.file_events.lock().unwrap().clone()
    }

    /// Get processing summary
    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.file_events.lock().unwrap();
        let contexts = self.file_contexts.lock().unwrap();

        let mut summary = ProcessingSummary::new();
        summary.total_files = events.len();
        summary.total_processing_time = self.processing_start.elapsed();

        let mut total_file_time = Duration::new(0, 0);
        let mut file_count_with_timing = 0;

        for (file_path, file_events) in events.iter() {
            let has_errors = file_events.iter().any(|e| e.is_error());
            let has_warnings = file_events.iter().any(|e| e.is_warning());

            if has_errors {
                summary.failed_files += 1;
            } else if has_warnings {
                summary.files_with_warnings += 1;
            } else {
                summary.successful_files += 1;
            }

            for event in file_events {
                if event.is_error() {
                    summary.total_errors += 1;
                } else if event.is_warning() {
                    summary.total_warnings += 1;
                }
            }

            if let Some(context) = contexts.get(file_path) {
                total_file_time += context.elapsed();
                file_count_with_timing += 1;
            }
        }

        if file_count_with_timing > 0 {
            summary.average_file_time = total_file_time / file_count_with_timing as u32;
        }

        summary
    }

    /// Get error count for a specific file
    pub fn get_file_error_count(&self, file_path: &Path) -> usize {
        let events = self.file_events.lock().unwrap();
        events
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).count())
            .unwrap_or(0)
    }

    /// Get warning count for a specific file
    pub fn get_file_warning_count(&self, file_path: &Path) -> usize {
        let events = self.file_events.lock().unwrap();
        events
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_warning()).count())
            .unwrap_or(0)
    }

    /// Check if a file has any errors
    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        self.get_file_error_count(file_path) > 0
    }

    /// Check if a file has any warnings
    pub fn file_has_warnings(&self, file_path: &Path) -> bool {
        self.get_file_warning_count(file_path) > 0
    }

    /// Get files with errors
    pub fn get_files_with_errors(&self) -> Vec<PathBuf> {
        let events = self.file_events.lock().unwrap();
        events
            .iter()
            .filter(|(_, events)| events.iter().any(|e| e.is_error()))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Get files with warnings (but no errors)
    pub fn get_files_with_warnings(&self) -> Vec<PathBuf> {
        let events = self.file_events.lock().unwrap();
        events
            .iter()
            .filter(|(_, events)| {
                let has_warnings = events.iter().any(|e| e.is_warning());
                let has_errors = events.iter().any(|e| e.is_error());
                has_warnings && !has_errors
            })
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Get critical errors (errors that require halting)
    pub fn get_critical_errors(&self) -> Vec<(PathBuf, LogEvent)> {
        let events = self.file_events.lock().unwrap();
        let mut critical_errors = Vec::new();

        for (path, file_events) in events.iter() {
            for event in file_events {
                if event.is_error() && event.requires_halt() {
                    critical_errors.push((path.clone(), event.clone()));
                }
            }
        }

        critical_errors
    }

    /// Clear all collected data
    pub fn clear(&self) {
        let mut events = self.file_events.lock().unwrap();
        let mut contexts = self.file_contexts.lock().unwrap();
        events.clear();
        contexts.clear();
    }

    /// Get total event count across all files
    pub fn total_event_count(&self) -> usize {
        let events = self.file_events.lock().unwrap();
        events.values().map(|v| v.len()).sum()
    }

    /// Check if collector is near capacity (using compile-time constants)
    pub fn is_near_capacity(&self) -> bool {
        let total_events = self.total_event_count();
        let max_events = LOG_BUFFER_SIZE;
        total_events > (max_events * 80 / 100) // 80% threshold
    }

    /// Get capacity information (using compile-time constants)
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let current = self.total_event_count();
        let max = LOG_BUFFER_SIZE;
        let percentage = if max > 0 {
            current as f64 / max as f64
        } else {
            0.0
        };
        (current, max, percentage)
    }

    /// Get per-file capacity information
    pub fn get_file_capacity_info(&self, file_path: &Path) -> (usize, usize, f64) {
        let events = self.file_events.lock().unwrap();
        let current = events
            .get(file_path)
            .map(|events| events.len())
            .unwrap_or(0);
        let max = MAX_LOG_EVENTS_PER_FILE;
        let percentage = if max > 0 {
            current as f64 / max as f64
        } else {
            0.0
        };
        (current, max, percentage)
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

/// Format errors in cargo-style output
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();
    let all_events = collector.get_all_file_events();

    for (file_path, events) in &all_events {
        let error_events: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warning_events: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if !error_events.is_empty() || !warning_events.is_empty() {
            output.push_str(&format!("Checking {}...\n", file_path.display()));

            for event in error_events {
                let span_info = event
                    .span
                    .as_ref()
                    .map(|s| {
                        format!(
                            " --> {}:{}:{}",
                            file_path.display(),
                            s.start().line,
                            s.start().column
                        )
                    })
                    .unwrap_or_default();

                output.push_str(&format!(
                    "error[{}]: {}{}\n",
                    event.code.as_str(),
                    event.message,
                    span_info
                ));

                output.push_str(&format!(
                    "  = severity: {}, category: {}\n",
                    event.severity(),
                    event.category()
                ));

                if !event.context.is_empty() {
                    output.push_str("  |\n");
                    for (key, value) in &event.context {
                        if key != "file" && key != "file_id" {
                            output.push_str(&format!("  = {}: {}\n", key, value));
                        }
                    }
                }

                let action = event.recommended_action();
                if action != "No specific action available" {
                    output.push_str(&format!("  = help: {}\n", action));
                }
            }

            for event in warning_events {
                let span_info = event
                    .span
                    .as_ref()
                    .map(|s| {
                        format!(
                            " --> {}:{}:{}",
                            file_path.display(),
                            s.start().line,
                            s.start().column
                        )
                    })
                    .unwrap_or_default();

                output.push_str(&format!(
                    "warning[{}]: {}{}\n",
                    event.code.as_str(),
                    event.message,
                    span_info
                ));

                if !event.context.is_empty() {
                    for (key, value) in &event.context {
                        if key != "file" && key != "file_id" {
                            output.push_str(&format!("  = {}: {}\n", key, value));
                        }
                    }
                }
            }

            output.push('\n');
        }
    }

    let summary = collector.get_summary();

    if summary.total_errors > 0 {
        output.push_str(&format!("\nTotal errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use std::path::PathBuf;

    #[test]
    fn test_error_collector_basic() {
        let collector = ErrorCollector::new();

        let file_path = PathBuf::from("test.ts");
        let event = LogEvent::error(codes::file_processing::FILE_NOT_FOUND, "Test error");

        collector.record_event(&file_path, event);

        let events = collector.get_file_events(&file_path);
        assert_eq!(events.len(), 1);
        assert!(collector.file_has_errors(&file_path));
    }

    #[test]
    fn test_processing_summary() {
        let collector = ErrorCollector::new();

        let file1 = PathBuf::from("file1.ts");
        let file2 = PathBuf::from("file2.ts");

        collector.record_event(
            &file1,
            LogEvent::error(codes::classify::SOURCE_TOO_LARGE, "Error"),
        );
        collector.record_event(&file2, LogEvent::warning("Warning"));

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.files_with_warnings, 1);
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.total_warnings, 1);
    }

    #[test]
    fn test_critical_errors() {
        let collector = ErrorCollector::new();

        let file_path = PathBuf::from("test.ts");
        let critical_event = LogEvent::error(codes::system::INTERNAL_ERROR, "Critical error");
        let normal_event = LogEvent::error(codes::macros::DUPLICATE_MACRO, "Normal error");

        collector.record_event(&file_path, critical_event);
        collector.record_event(&file_path, normal_event);

        let critical_errors = collector.get_critical_errors();
        assert_eq!(critical_errors.len(), 1);
        assert_eq!(critical_errors[0].1.code.as_str(), "ERR001");
    }

    #[test]
    fn test_capacity_limits() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("test.ts");

        let (current, max, _) = collector.get_file_capacity_info(&file_path);
        assert_eq!(current, 0);
        assert_eq!(max, MAX_LOG_EVENTS_PER_FILE);

        let (current, max, _) = collector.get_capacity_info();
        assert_eq!(current, 0);
        assert_eq!(max, LOG_BUFFER_SIZE);
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("src/app.ts");

        collector.record_event(
            &file_path,
            LogEvent::error(codes::macros::DUPLICATE_MACRO, "Macro 'WIDTH' redefined"),
        );

        let formatted = format_cargo_style_errors(&collector);
        assert!(formatted.contains("error[E040]"));
        assert!(formatted.contains("src/app.ts"));
        assert!(formatted.contains("Total errors: 1"));
    }
}

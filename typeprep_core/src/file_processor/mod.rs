//! File processor module with compile-time constants and global logging integration

mod processor;

use crate::config::runtime::FileProcessorPreferences;
pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError,
    PROCESSABLE_EXTENSIONS,
};

/// Process a file with default settings
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

/// Create a file processor with default settings
pub fn create_processor() -> FileProcessor {
    FileProcessor::new()
}

/// Create a file processor from runtime preferences
pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}

/// Check if an error should halt processing
pub fn should_halt_on_error(error: &FileProcessorError) -> bool {
    error.requires_halt()
}

/// Get the compile-time maximum file size limit
///
/// This returns the security boundary that cannot be changed at runtime.
pub fn get_max_file_size() -> u64 {
    FileProcessor::max_file_size()
}

/// Get the compile-time large file threshold
pub fn get_large_file_threshold() -> u64 {
    FileProcessor::large_file_threshold()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_module_api() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.ts");
        fs::write(&file_path, "let a = 1;\n").unwrap();

        let result = process_file(file_path.to_str().unwrap());
        assert!(result.is_ok());
    }

    #[test]
    fn test_error_helpers() {
        let error = FileProcessorError::FileNotFound {
            path: "test.ts".to_string(),
        };

        assert!(should_halt_on_error(&error));
        assert_eq!(error.error_code().as_str(), "E005");
    }

    #[test]
    fn test_compile_time_constants_access() {
        assert!(get_max_file_size() > 0);
        assert!(get_large_file_threshold() > 0);
        assert!(get_large_file_threshold() <= get_max_file_size());
    }
}

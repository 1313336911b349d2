//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and the
//! classification functions the logging macros rely on.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Lexical classification error codes
pub mod classify {
    use super::Code;

    pub const SOURCE_TOO_LARGE: Code = Code::new("E020");
    pub const BATCH_LIMIT_EXCEEDED: Code = Code::new("E021");
}

/// Macro engine error codes
pub mod macros {
    use super::Code;

    pub const DUPLICATE_MACRO: Code = Code::new("E040");
    pub const MACRO_LIMIT_EXCEEDED: Code = Code::new("E041");
    pub const TOO_MANY_MACRO_ARGS: Code = Code::new("E042");
    pub const MACRO_VALUE_TOO_LONG: Code = Code::new("E043");
    pub const EXPANSION_LIMIT_EXCEEDED: Code = Code::new("E044");
}

/// Rewrite pass error codes
pub mod rewrite {
    use super::Code;

    pub const MALFORMED_MARKER: Code = Code::new("E060");
    pub const MARKER_LIMIT_EXCEEDED: Code = Code::new("E061");
    pub const NAMESPACE_TOO_DEEP: Code = Code::new("E062");
}

/// Compile host error codes
pub mod host {
    use super::Code;

    pub const CONFIG_INVALID: Code = Code::new("H001");
    pub const SOURCE_NOT_FOUND: Code = Code::new("H002");
    pub const NO_SOURCE_FILES: Code = Code::new("H003");
    pub const ASYNC_HOOK_IN_WATCH: Code = Code::new("H004");
    pub const COMPILER_DIAGNOSTIC: Code = Code::new("H010");
    pub const RESOLUTION_FAILED: Code = Code::new("H011");
}

/// Bundler collaborator codes
pub mod bundler {
    use super::Code;

    pub const BUNDLE_ERROR: Code = Code::new("B001");
    pub const BUNDLE_WARNING: Code = Code::new("B002");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const FILE_VALIDATION_PASSED: Code = Code::new("I007");

    pub const CLASSIFICATION_COMPLETE: Code = Code::new("I020");
    pub const MACRO_EXTRACTION_COMPLETE: Code = Code::new("I040");
    pub const MACRO_EXPANSION_COMPLETE: Code = Code::new("I041");
    pub const REWRITE_COMPLETE: Code = Code::new("I060");

    pub const PREPROCESS_COMPLETE: Code = Code::new("I080");
    pub const COMPILE_PASS_COMPLETE: Code = Code::new("I090");
    pub const WATCH_SESSION_STARTED: Code = Code::new("I091");
    pub const WATCH_SESSION_STOPPED: Code = Code::new("I092");
    pub const BUNDLE_COMPLETE: Code = Code::new("I093");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        registry.insert(
            "ERR001",
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal system error",
                "File a bug report with the preprocessor maintainers",
            ),
        );
        registry.insert(
            "ERR002",
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Check configuration profile and dependencies",
            ),
        );

        // File processing errors
        registry.insert(
            "E005",
            ErrorMetadata::new(
                "E005",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File not found at specified path",
                "Check file path and ensure file exists",
            ),
        );
        registry.insert(
            "E006",
            ErrorMetadata::new(
                "E006",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "File does not carry a processable source extension",
                "Rename with .ts/.tsx/.js extension or verify file type",
            ),
        );
        registry.insert(
            "E007",
            ErrorMetadata::new(
                "E007",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File exceeds maximum size limit",
                "Reduce file size or raise the compile-time limit",
            ),
        );
        registry.insert(
            "E008",
            ErrorMetadata::new(
                "E008",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File is empty when content expected",
                "Provide a file with content or check file integrity",
            ),
        );
        registry.insert(
            "E009",
            ErrorMetadata::new(
                "E009",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Permission denied accessing file",
                "Check file permissions and user access rights",
            ),
        );
        registry.insert(
            "E010",
            ErrorMetadata::new(
                "E010",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File content is not valid UTF-8",
                "Re-encode the file as UTF-8",
            ),
        );
        registry.insert(
            "E011",
            ErrorMetadata::new(
                "E011",
                "FileProcessing",
                Severity::Medium,
                true,
                false,
                "I/O error while reading file",
                "Retry the operation or check disk health",
            ),
        );
        registry.insert(
            "E012",
            ErrorMetadata::new(
                "E012",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "Path is not a regular file",
                "Pass a file path, not a directory",
            ),
        );

        // Classification errors
        registry.insert(
            "E020",
            ErrorMetadata::new(
                "E020",
                "Classify",
                Severity::Medium,
                false,
                true,
                "Source text exceeds maximum classification size",
                "Split the file or raise the compile-time limit",
            ),
        );
        registry.insert(
            "E021",
            ErrorMetadata::new(
                "E021",
                "Classify",
                Severity::Medium,
                false,
                true,
                "Batch count exceeded the classification limit",
                "The input alternates states pathologically; inspect the source",
            ),
        );

        // Macro errors
        registry.insert(
            "E040",
            ErrorMetadata::new(
                "E040",
                "Macros",
                Severity::Low,
                true,
                false,
                "Macro name defined more than once in one file",
                "Remove or rename the duplicate #macro directive",
            ),
        );
        registry.insert(
            "E041",
            ErrorMetadata::new(
                "E041",
                "Macros",
                Severity::Medium,
                false,
                true,
                "Too many macros defined in one file",
                "Reduce macro count or raise the compile-time limit",
            ),
        );
        registry.insert(
            "E042",
            ErrorMetadata::new(
                "E042",
                "Macros",
                Severity::Low,
                true,
                false,
                "Macro declares more arguments than permitted",
                "Reduce argument count",
            ),
        );
        registry.insert(
            "E043",
            ErrorMetadata::new(
                "E043",
                "Macros",
                Severity::Low,
                true,
                false,
                "Macro value exceeds maximum length",
                "Shorten the macro value",
            ),
        );
        registry.insert(
            "E044",
            ErrorMetadata::new(
                "E044",
                "Macros",
                Severity::Medium,
                false,
                true,
                "Macro expansion count exceeded per-file limit",
                "Inspect the source for runaway invocations",
            ),
        );

        // Rewrite errors
        registry.insert(
            "E060",
            ErrorMetadata::new(
                "E060",
                "Rewrite",
                Severity::Low,
                true,
                false,
                "Interface marker could not be terminated",
                "Balance the brackets and braces of the [interface ...] marker",
            ),
        );
        registry.insert(
            "E061",
            ErrorMetadata::new(
                "E061",
                "Rewrite",
                Severity::Medium,
                false,
                true,
                "Too many interface markers in one file",
                "Reduce marker count or raise the compile-time limit",
            ),
        );
        registry.insert(
            "E062",
            ErrorMetadata::new(
                "E062",
                "Rewrite",
                Severity::Low,
                true,
                false,
                "Dotted interface name nests too deeply",
                "Flatten the namespace path",
            ),
        );

        // Host errors
        registry.insert(
            "H001",
            ErrorMetadata::new(
                "H001",
                "Host",
                Severity::Critical,
                false,
                true,
                "Malformed compile host configuration",
                "Fix the host configuration TOML before compiling",
            ),
        );
        registry.insert(
            "H002",
            ErrorMetadata::new(
                "H002",
                "Host",
                Severity::High,
                false,
                true,
                "Entry source file does not exist",
                "Check the entry path passed to compile()",
            ),
        );
        registry.insert(
            "H003",
            ErrorMetadata::new(
                "H003",
                "Host",
                Severity::High,
                false,
                true,
                "Resolved source file set is empty",
                "Verify entries and exact-file restrictions",
            ),
        );
        registry.insert(
            "H004",
            ErrorMetadata::new(
                "H004",
                "Host",
                Severity::Critical,
                false,
                true,
                "Background post-process hook used in watch mode",
                "Use an inline hook while watching",
            ),
        );
        registry.insert(
            "H010",
            ErrorMetadata::new(
                "H010",
                "Host",
                Severity::Low,
                true,
                false,
                "Compiler reported a diagnostic",
                "Fix the reported source problem",
            ),
        );
        registry.insert(
            "H011",
            ErrorMetadata::new(
                "H011",
                "Host",
                Severity::Low,
                true,
                false,
                "Module specifier could not be resolved",
                "Check alias configuration and file layout",
            ),
        );

        // Bundler codes
        registry.insert(
            "B001",
            ErrorMetadata::new(
                "B001",
                "Bundler",
                Severity::Medium,
                true,
                false,
                "Bundler reported an error",
                "Fix the reported bundle problem",
            ),
        );
        registry.insert(
            "B002",
            ErrorMetadata::new(
                "B002",
                "Bundler",
                Severity::Low,
                true,
                false,
                "Bundler reported a warning",
                "Review the bundle warning",
            ),
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|m| m.severity)
        .unwrap_or(Severity::Medium)
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code).map(|m| m.category).unwrap_or("Unknown")
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code).map(|m| m.recoverable).unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|m| m.requires_halt)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display() {
        assert_eq!(file_processing::FILE_NOT_FOUND.as_str(), "E005");
        assert_eq!(format!("{}", macros::DUPLICATE_MACRO), "E040");
    }

    #[test]
    fn test_registry_lookup() {
        assert_eq!(get_category("E005"), "FileProcessing");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("H001"));
        assert!(is_recoverable("E060"));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_category("Z999"), "Unknown");
        assert!(!requires_halt("Z999"));
    }

    #[test]
    fn test_host_codes_registered() {
        for code in ["H001", "H002", "H003", "H004"] {
            assert!(get_error_metadata(code).is_some(), "missing {}", code);
            assert!(requires_halt(code));
        }
    }
}

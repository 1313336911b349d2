// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Whether to require a processable source extension (user preference, not security)
    pub require_source_extension: bool,

    /// Whether to enable detailed performance logging
    pub enable_performance_logging: bool,

    /// Whether to log debug information for declaration files passed through untouched
    pub log_declaration_passthrough: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_source_extension: env::var("TYPEPREP_REQUIRE_SOURCE_EXTENSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_performance_logging: env::var("TYPEPREP_ENABLE_PERFORMANCE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_declaration_passthrough: env::var("TYPEPREP_LOG_DECLARATION_PASSTHROUGH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyPreferences {
    /// Whether to collect per-state batch metrics
    pub collect_batch_metrics: bool,

    /// Whether to log state-transition statistics after classification
    pub log_state_statistics: bool,

    /// Whether to show position information in error messages
    pub include_position_in_errors: bool,
}

impl Default for ClassifyPreferences {
    fn default() -> Self {
        Self {
            collect_batch_metrics: env::var("TYPEPREP_CLASSIFY_BATCH_METRICS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_state_statistics: env::var("TYPEPREP_CLASSIFY_LOG_STATS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            include_position_in_errors: env::var("TYPEPREP_CLASSIFY_INCLUDE_POSITIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroPreferences {
    /// Whether to log every macro definition as it is extracted
    pub log_extracted_macros: bool,

    /// Whether to warn when a macro is defined but never invoked
    pub warn_unused_macros: bool,

    /// Whether to warn when an invocation supplies fewer arguments than declared
    pub warn_missing_arguments: bool,
}

impl Default for MacroPreferences {
    fn default() -> Self {
        Self {
            log_extracted_macros: env::var("TYPEPREP_MACRO_LOG_EXTRACTED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            warn_unused_macros: env::var("TYPEPREP_MACRO_WARN_UNUSED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            warn_missing_arguments: env::var("TYPEPREP_MACRO_WARN_MISSING_ARGS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn to_events_log_level(self) -> crate::logging::LogLevel {
        match self {
            LogLevel::Error => crate::logging::LogLevel::Error,
            LogLevel::Warning => crate::logging::LogLevel::Warning,
            LogLevel::Info => crate::logging::LogLevel::Info,
            LogLevel::Debug => crate::logging::LogLevel::Debug,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Minimum level written to the configured logger
    pub min_log_level: LogLevel,

    /// Whether to emit structured (JSON) log lines instead of console text
    pub use_structured_logging: bool,

    /// Whether console logging is enabled at all
    pub enable_console_logging: bool,

    /// Whether to log per-stage performance events
    pub log_performance_events: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        let min_log_level = match env::var("TYPEPREP_LOG_LEVEL").ok().as_deref() {
            Some("error") => LogLevel::Error,
            Some("warn") | Some("warning") => LogLevel::Warning,
            Some("debug") => LogLevel::Debug,
            _ => LogLevel::Info,
        };

        Self {
            min_log_level,
            use_structured_logging: env::var("TYPEPREP_STRUCTURED_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("TYPEPREP_CONSOLE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_performance_events: env::var("TYPEPREP_LOG_PERFORMANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

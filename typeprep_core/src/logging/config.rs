//! Configuration module for logging - using compile-time constants
//!
//! Security boundaries are enforced at compile time; user preferences only
//! adjust behavior within those bounds.

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;
type RuntimeLogLevel = crate::config::runtime::LogLevel;

// ============================================================================
// RUNTIME PREFERENCES STORAGE
// ============================================================================

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Initialize runtime preferences
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    validate_preferences(&preferences)?;

    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized")?;

    Ok(())
}

/// Get runtime preferences (with fallback to defaults)
fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

/// Validate runtime preferences against security constraints
fn validate_preferences(preferences: &LoggingPreferences) -> Result<(), String> {
    // Errors can never be silenced below the compiled-in floor
    if (preferences.min_log_level as u8) > SECURITY_MIN_LOG_LEVEL
        && SECURITY_MIN_LOG_LEVEL == 0
    {
        return Err(format!(
            "Error logging cannot be disabled: minimum level {} required",
            SECURITY_MIN_LOG_LEVEL
        ));
    }

    Ok(())
}

// ============================================================================
// CONFIGURATION ACCESS FUNCTIONS
// ============================================================================

/// Get minimum log level (user preference within security bounds)
pub fn get_min_log_level() -> EventsLogLevel {
    let preferences = get_runtime_preferences();
    let user_level = preferences.min_log_level.to_events_log_level();
    let floor = security_floor_level();

    // Use the more permissive of the user's level and the enforced floor
    if (user_level as u8) >= (floor as u8) {
        user_level
    } else {
        floor
    }
}

/// Check if structured logging is enabled (user preference)
pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

/// Check if console logging is enabled (user preference)
pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

/// Check if performance events should be logged (user preference)
pub fn log_performance_events() -> bool {
    get_runtime_preferences().log_performance_events
}

/// Minimum level that is always logged (compile-time enforced)
pub fn security_floor_level() -> EventsLogLevel {
    match SECURITY_MIN_LOG_LEVEL {
        0 => EventsLogLevel::Error,
        1 => EventsLogLevel::Warning,
        2 => EventsLogLevel::Info,
        _ => EventsLogLevel::Debug,
    }
}

/// Get error buffer size (compile-time security constant)
pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

/// Get maximum log events per file (compile-time security constant)
pub fn get_max_log_events_per_file() -> usize {
    MAX_LOG_EVENTS_PER_FILE
}

/// Get maximum log message length (compile-time security constant)
pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

// ============================================================================
// CONFIGURATION VALIDATION
// ============================================================================

/// Validate current configuration settings
pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE > 100_000 {
        return Err(format!("Log buffer size too large: {}", LOG_BUFFER_SIZE));
    }

    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }

    if MAX_LOG_EVENTS_PER_FILE > LOG_BUFFER_SIZE {
        return Err("Max log events per file exceeds total buffer size".to_string());
    }

    if let Some(preferences) = RUNTIME_PREFERENCES.get() {
        validate_preferences(preferences)?;
    }

    Ok(())
}

/// Get configuration summary for diagnostics
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         === Security Constants (Compile-time) ===\n\
         - Log buffer size: {}\n\
         - Max events per file: {}\n\
         - Max message length: {}\n\
         - Security min level: {}\n\
         === User Preferences (Runtime) ===\n\
         - Min log level: {:?}\n\
         - Structured logging: {}\n\
         - Console logging: {}\n\
         - Performance events: {}",
        LOG_BUFFER_SIZE,
        MAX_LOG_EVENTS_PER_FILE,
        MAX_LOG_MESSAGE_LENGTH,
        SECURITY_MIN_LOG_LEVEL,
        preferences.min_log_level,
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.log_performance_events,
    )
}

/// Get recommended configuration for development
pub fn get_development_preferences() -> LoggingPreferences {
    LoggingPreferences {
        min_log_level: RuntimeLogLevel::Debug,
        use_structured_logging: false,
        enable_console_logging: true,
        log_performance_events: true,
    }
}

/// Get recommended configuration for production
pub fn get_production_preferences() -> LoggingPreferences {
    LoggingPreferences {
        min_log_level: RuntimeLogLevel::Info,
        use_structured_logging: true,
        enable_console_logging: false,
        log_performance_events: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_security_floor() {
        let floor = security_floor_level();
        assert!(floor <= EventsLogLevel::Info);

        // Minimum level never drops below the floor
        let effective = get_min_log_level();
        assert!((effective as u8) >= (floor as u8));
    }

    #[test]
    fn test_compile_time_constants() {
        assert!(LOG_BUFFER_SIZE > 0);
        assert!(MAX_LOG_EVENTS_PER_FILE > 0);
        assert!(SECURITY_MIN_LOG_LEVEL <= 2);
    }

    #[test]
    fn test_profile_presets() {
        let dev = get_development_preferences();
        let prod = get_production_preferences();

        assert_eq!(dev.min_log_level, RuntimeLogLevel::Debug);
        assert!(prod.use_structured_logging);
        assert!(!prod.enable_console_logging);
    }
}

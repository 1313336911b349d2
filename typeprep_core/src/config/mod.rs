//! Configuration module for the preprocessor
//! Automatically uses generated constants from TOML configuration

// Include generated constants from build.rs
// This file is generated at compile time from the workspace TOML configuration
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("TYPEPREP_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("TYPEPREP_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_time_constants_present() {
        assert!(compile_time::file_processing::MAX_FILE_SIZE > 0);
        assert!(compile_time::macros::MAX_MACRO_COUNT > 0);
        assert!(compile_time::diagnostics::MAX_DISPLAYED_DIAGNOSTICS > 0);
    }

    #[test]
    fn test_build_info() {
        assert!(build_info::source_info().contains(".toml"));
    }
}

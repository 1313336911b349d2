// build.rs - TOML-driven compile-time constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    lexical: LexicalLimits,
    macros: MacroLimits,
    rewriter: RewriterLimits,
    diagnostics: DiagnosticLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    large_file_threshold: u64,
    max_line_count_for_analysis: usize,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_source_size: usize,
    max_batch_count: usize,
}

#[derive(serde::Deserialize)]
struct MacroLimits {
    max_macro_count: usize,
    max_macro_args: usize,
    max_macro_value_length: usize,
    max_expansions_per_file: usize,
}

#[derive(serde::Deserialize)]
struct RewriterLimits {
    max_interface_markers: usize,
    max_namespace_depth: usize,
}

#[derive(serde::Deserialize)]
struct DiagnosticLimits {
    max_displayed_diagnostics: usize,
    max_collected_diagnostics: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_events_per_file: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=TYPEPREP_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=TYPEPREP_CONFIG_DIR");

    let profile = env::var("TYPEPREP_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("TYPEPREP_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of typeprep_core directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_security_constraints(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_security_constraints(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_MACRO_COUNT: usize = 1_000_000;
    const ABSOLUTE_MAX_EXPANSIONS: usize = 100_000_000;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("SECURITY: max_file_size exceeds absolute maximum");
    }

    if config.macros.max_macro_count > ABSOLUTE_MAX_MACRO_COUNT {
        panic!("SECURITY: max_macro_count exceeds absolute maximum");
    }

    if config.macros.max_expansions_per_file > ABSOLUTE_MAX_EXPANSIONS {
        panic!("SECURITY: max_expansions_per_file exceeds absolute maximum");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if profile == "production" {
        if config.file_processing.max_file_size > 50_000_000 {
            panic!("PRODUCTION: max_file_size too high for production");
        }
        if config.diagnostics.max_collected_diagnostics > 100_000 {
            panic!("PRODUCTION: max_collected_diagnostics too high for production");
        }
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const LARGE_FILE_THRESHOLD: u64 = {};
        pub const MAX_LINE_COUNT_FOR_ANALYSIS: usize = {};
    }}

    pub mod lexical {{
        pub const MAX_SOURCE_SIZE: usize = {};
        pub const MAX_BATCH_COUNT: usize = {};
    }}

    pub mod macros {{
        pub const MAX_MACRO_COUNT: usize = {};
        pub const MAX_MACRO_ARGS: usize = {};
        pub const MAX_MACRO_VALUE_LENGTH: usize = {};
        pub const MAX_EXPANSIONS_PER_FILE: usize = {};
    }}

    pub mod rewriter {{
        pub const MAX_INTERFACE_MARKERS: usize = {};
        pub const MAX_NAMESPACE_DEPTH: usize = {};
    }}

    pub mod diagnostics {{
        pub const MAX_DISPLAYED_DIAGNOSTICS: usize = {};
        pub const MAX_COLLECTED_DIAGNOSTICS: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        config.file_processing.max_file_size,
        config.file_processing.large_file_threshold,
        config.file_processing.max_line_count_for_analysis,
        config.lexical.max_source_size,
        config.lexical.max_batch_count,
        config.macros.max_macro_count,
        config.macros.max_macro_args,
        config.macros.max_macro_value_length,
        config.macros.max_expansions_per_file,
        config.rewriter.max_interface_markers,
        config.rewriter.max_namespace_depth,
        config.diagnostics.max_displayed_diagnostics,
        config.diagnostics.max_collected_diagnostics,
        config.logging.log_buffer_size,
        config.logging.max_log_events_per_file,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}

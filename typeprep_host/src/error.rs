use typeprep_core::logging::{codes, Code};
use typeprep_core::PipelineError;

/// Compile host errors
///
/// The first four variants are fatal: they short-circuit a compile pass and
/// come back as the only error in the result. Per-file compiler and bundler
/// diagnostics are not errors of this type; they accumulate as
/// [`Diagnostic`](crate::diagnostics::Diagnostic) values instead.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Invalid host configuration: {message}")]
    Config { message: String },

    #[error("Source file not found: {path}")]
    SourceNotFound { path: String },

    #[error("No source files resolved from the entry set")]
    NoSourceFiles,

    #[error("Host misuse: {message}")]
    Misuse { message: String },

    #[error("Preprocessing failed: {0}")]
    Preprocess(#[from] PipelineError),

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl HostError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn misuse(message: impl Into<String>) -> Self {
        Self::Misuse {
            message: message.into(),
        }
    }

    pub fn io(err: &std::io::Error, path: &std::path::Path) -> Self {
        Self::Io {
            message: format!("{}: {}", path.display(), err),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            HostError::Config { .. } => codes::host::CONFIG_INVALID,
            HostError::SourceNotFound { .. } => codes::host::SOURCE_NOT_FOUND,
            HostError::NoSourceFiles => codes::host::NO_SOURCE_FILES,
            HostError::Misuse { .. } => codes::host::ASYNC_HOOK_IN_WATCH,
            HostError::Preprocess(e) => e.error_code(),
            HostError::Io { .. } => codes::file_processing::IO_ERROR,
        }
    }

    /// Fatal errors abort the pass before or instead of per-file processing
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HostError::Config { .. }
                | HostError::SourceNotFound { .. }
                | HostError::NoSourceFiles
                | HostError::Misuse { .. }
        )
    }
}

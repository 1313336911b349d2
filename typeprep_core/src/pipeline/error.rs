use crate::classify::ClassifyError;
use crate::file_processor::FileProcessorError;
use crate::macro_engine::MacroError;
use crate::rewrite::RewriteError;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical classification failed: {0}")]
    Classification(#[from] ClassifyError),

    #[error("Interface rewriting failed: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("Macro processing failed: {0}")]
    Macro(#[from] MacroError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    /// Error code of the underlying stage failure
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            PipelineError::FileProcessing(e) => e.error_code(),
            PipelineError::Classification(e) => e.error_code(),
            PipelineError::Rewrite(e) => e.error_code(),
            PipelineError::Macro(e) => e.error_code(),
            PipelineError::Pipeline { .. } => crate::logging::codes::system::INTERNAL_ERROR,
        }
    }
}

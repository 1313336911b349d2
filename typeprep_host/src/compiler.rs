//! External collaborator contracts
//!
//! The type checker and bundler are consumed as opaque services. They see
//! the world only through [`CompileHost`]'s hooks and hand back diagnostics
//! and outputs in the shapes defined here.

use crate::diagnostics::Diagnostic;
use crate::error::HostError;
use crate::vfs::CompileHost;
use std::collections::HashMap;
use std::path::PathBuf;

/// Result of one checker pass
#[derive(Debug, Clone, Default)]
pub struct CheckerOutput {
    /// Resolved source files in import order
    pub source_files: Vec<PathBuf>,
    /// Per-file diagnostics collected across the pass
    pub diagnostics: Vec<Diagnostic>,
    /// Exported names per file
    pub exports: HashMap<PathBuf, Vec<String>>,
}

/// Status reported by the checker's watch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    /// Starting a new compilation
    Starting,
    /// File change detected, re-checking
    Rechecking,
    /// "Found N errors. Watching for file changes."
    Stable { error_count: usize },
}

impl WatchStatus {
    /// Numeric status code as reported by the checker
    pub fn code(&self) -> u32 {
        match self {
            WatchStatus::Starting => 6031,
            WatchStatus::Rechecking => 6032,
            WatchStatus::Stable { .. } => 6194,
        }
    }

    /// The stable point where accumulated diagnostics get dumped
    pub fn is_stable(&self) -> bool {
        matches!(self, WatchStatus::Stable { .. })
    }
}

/// A type-checking compiler driven through the host's virtual file system
pub trait TypeChecker {
    /// Run one full pass over the root file set
    fn check(
        &mut self,
        host: &CompileHost,
        root_names: &[PathBuf],
    ) -> Result<CheckerOutput, HostError>;

    /// Run the incremental watch loop, reporting status transitions.
    ///
    /// The default implementation performs a single pass and immediately
    /// reports it stable; real checkers keep calling back on file changes.
    fn watch(
        &mut self,
        host: &CompileHost,
        root_names: &[PathBuf],
        on_status: &mut dyn FnMut(WatchStatus, &CheckerOutput),
    ) -> Result<(), HostError> {
        let output = self.check(host, root_names)?;
        let error_count = output.diagnostics.len();
        on_status(WatchStatus::Stable { error_count }, &output);
        Ok(())
    }
}

/// Bundler invocation options
#[derive(Debug, Clone, Default)]
pub struct BundleOptions {
    pub target: String,
    pub format: String,
    pub platform: String,
    /// Modules excluded from the bundle
    pub externals: Vec<String>,
}

/// Raw bundler output before diagnostics normalization
#[derive(Debug, Clone, Default)]
pub struct BundlerOutput {
    pub code: String,
    pub source_map: Option<String>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

/// A module bundler consumed as an opaque service
pub trait Bundler {
    fn bundle(
        &mut self,
        entries: &[PathBuf],
        options: &BundleOptions,
    ) -> Result<BundlerOutput, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_status_codes() {
        assert_eq!(WatchStatus::Starting.code(), 6031);
        assert_eq!(WatchStatus::Rechecking.code(), 6032);
        assert_eq!(WatchStatus::Stable { error_count: 3 }.code(), 6194);
        assert!(WatchStatus::Stable { error_count: 0 }.is_stable());
        assert!(!WatchStatus::Starting.is_stable());
    }
}

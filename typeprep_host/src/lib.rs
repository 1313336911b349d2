// Internal modules
pub mod api;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod vfs;
pub mod watch;

// Re-export key types for library consumers
pub use api::{bundle, compile, compile_watch, BundleResult, CompileResult};
pub use compiler::{BundleOptions, Bundler, BundlerOutput, CheckerOutput, TypeChecker, WatchStatus};
pub use config::{AliasRule, HostConfig};
pub use diagnostics::{Diagnostic, DiagnosticsAggregator, ImportOrderMap};
pub use error::HostError;
pub use vfs::{CompileHost, PostProcess};
pub use watch::{WatchHandle, WatchSession};

//! Top-level compile and bundle entry points
//!
//! These orchestrate a collaborator checker or bundler against the virtual
//! file system host, normalize all failure shapes into ordered diagnostics,
//! and hand back a single result value per invocation.

use crate::compiler::{BundleOptions, Bundler, CheckerOutput, TypeChecker};
use crate::diagnostics::{Diagnostic, DiagnosticsAggregator, ImportOrderMap};
use crate::error::HostError;
use crate::vfs::CompileHost;
use crate::watch::{WatchHandle, WatchSession};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use typeprep_core::logging::codes;
use typeprep_core::{log_error, log_success, log_warning};

/// Outcome of one compile invocation
pub struct CompileResult {
    /// Source files that participated, in import order
    pub inputs: Vec<PathBuf>,
    /// Files written through the host
    pub outputs: Vec<PathBuf>,
    /// Ordered, deduplicated diagnostics
    pub errors: Vec<Diagnostic>,
    /// Exported names per input file
    pub exports: HashMap<PathBuf, Vec<String>>,
    /// Present only for watch-mode compilations
    pub watch: Option<WatchHandle>,
}

impl CompileResult {
    fn fatal(error: HostError) -> Self {
        log_error!(
            error.error_code(),
            "Compilation aborted",
            "error" => error.to_string()
        );
        CompileResult {
            inputs: Vec::new(),
            outputs: Vec::new(),
            errors: vec![Diagnostic::new(error.to_string())],
            exports: HashMap::new(),
            watch: None,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Stop the underlying watch session, if any
    pub fn stop(&self) {
        if let Some(handle) = &self.watch {
            handle.stop();
        }
    }

    /// Machine-readable error list for tooling integrations
    pub fn errors_json(&self) -> serde_json::Value {
        serde_json::json!(self.errors)
    }

    /// Human-readable summary for troubleshooting sessions
    pub fn debug_report(&self) -> String {
        let mut report = String::new();
        let _ = writeln!(
            report,
            "compile report @ {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(report, "inputs: {}", self.inputs.len());
        for input in &self.inputs {
            let _ = writeln!(report, "  {}", input.display());
        }
        let _ = writeln!(report, "outputs: {}", self.outputs.len());
        for output in &self.outputs {
            let _ = writeln!(report, "  {}", output.display());
        }
        let _ = writeln!(report, "errors: {}", self.errors.len());
        for error in &self.errors {
            let _ = writeln!(report, "  {}", error);
        }
        report
    }
}

/// Run one full type-checked compilation over the entry files.
///
/// The fatal taxonomy short-circuits: a missing entry or an empty resolved
/// file set yields a result carrying only that error. Checker diagnostics
/// never abort the pass; they come back ordered by import rank.
pub fn compile(
    checker: &mut dyn TypeChecker,
    host: &CompileHost,
    entries: &[PathBuf],
) -> CompileResult {
    if entries.is_empty() {
        return CompileResult::fatal(HostError::NoSourceFiles);
    }
    for entry in entries {
        if !host.file_exists(entry) {
            return CompileResult::fatal(HostError::SourceNotFound {
                path: entry.display().to_string(),
            });
        }
    }

    let output = match checker.check(host, entries) {
        Ok(output) => output,
        Err(error) => return CompileResult::fatal(error),
    };
    if output.source_files.is_empty() {
        return CompileResult::fatal(HostError::NoSourceFiles);
    }

    finish_pass(host, output, None)
}

/// Run an incremental watch compilation.
///
/// The checker drives the session through status callbacks; each stable
/// point dumps the accumulated diagnostics. The returned result reflects
/// the last stable pass and carries a handle for stopping the session.
pub fn compile_watch(
    checker: &mut dyn TypeChecker,
    host: &CompileHost,
    entries: &[PathBuf],
) -> CompileResult {
    if entries.is_empty() {
        return CompileResult::fatal(HostError::NoSourceFiles);
    }
    for entry in entries {
        if !host.file_exists(entry) {
            return CompileResult::fatal(HostError::SourceNotFound {
                path: entry.display().to_string(),
            });
        }
    }

    let handle = WatchHandle::new({
        let mut session = WatchSession::new(host.config());
        session.start();
        session
    });
    if let Some(flag) = handle.activity_flag() {
        host.gate_change_callback(flag);
    }

    let mut last_output: Option<CheckerOutput> = None;
    let watch_result = {
        let callback_handle = handle.clone();
        checker.watch(host, entries, &mut |status, output| {
            callback_handle.with_session(|session| {
                session.on_status(status, output);
            });
            if status.is_stable() {
                last_output = Some(output.clone());
            }
        })
    };
    if let Err(error) = watch_result {
        handle.stop();
        return CompileResult::fatal(error);
    }

    let output = match last_output {
        Some(output) if !output.source_files.is_empty() => output,
        _ => {
            handle.stop();
            return CompileResult::fatal(HostError::NoSourceFiles);
        }
    };

    finish_pass(host, output, Some(handle))
}

fn finish_pass(
    host: &CompileHost,
    output: CheckerOutput,
    watch: Option<WatchHandle>,
) -> CompileResult {
    let order = ImportOrderMap::from_source_files(&output.source_files);
    let mut aggregator = DiagnosticsAggregator::new(host.config().max_displayed_diagnostics)
        .with_debug_file(host.config().debug_file.clone());
    aggregator.extend(output.diagnostics);
    let errors = aggregator.ordered(&order);

    log_success!(
        codes::success::COMPILE_PASS_COMPLETE,
        "Compilation pass completed",
        "inputs" => output.source_files.len(),
        "errors" => errors.len()
    );

    CompileResult {
        inputs: output.source_files,
        outputs: host.output_paths(),
        errors,
        exports: output.exports,
        watch,
    }
}

/// Outcome of one bundle invocation
pub struct BundleResult {
    pub code: String,
    pub source_map: Option<String>,
    /// Bundler errors followed by warnings, normalized into one shape
    pub errors: Vec<Diagnostic>,
    pub inputs: Vec<PathBuf>,
}

impl BundleResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Bundle the entry files through a collaborator bundler.
pub fn bundle(
    bundler: &mut dyn Bundler,
    entries: &[PathBuf],
    options: &BundleOptions,
) -> BundleResult {
    if entries.is_empty() {
        let error = HostError::NoSourceFiles;
        log_error!(
            error.error_code(),
            "Bundle aborted",
            "error" => error.to_string()
        );
        return BundleResult {
            code: String::new(),
            source_map: None,
            errors: vec![Diagnostic::new(error.to_string())],
            inputs: Vec::new(),
        };
    }

    match bundler.bundle(entries, options) {
        Ok(output) => {
            for warning in &output.warnings {
                log_warning!(
                    code = codes::bundler::BUNDLE_WARNING,
                    "Bundler warning",
                    "message" => warning.to_string()
                );
            }
            let mut errors = output.errors;
            errors.extend(output.warnings);
            log_success!(
                codes::success::BUNDLE_COMPLETE,
                "Bundle completed",
                "entries" => entries.len(),
                "bytes" => output.code.len(),
                "errors" => errors.len()
            );
            BundleResult {
                code: output.code,
                source_map: output.source_map,
                errors,
                inputs: entries.to_vec(),
            }
        }
        Err(error) => {
            log_error!(
                codes::bundler::BUNDLE_ERROR,
                "Bundle failed",
                "error" => error.to_string()
            );
            BundleResult {
                code: String::new(),
                source_map: None,
                errors: vec![Diagnostic::new(error.to_string())],
                inputs: entries.to_vec(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{BundlerOutput, WatchStatus};
    use crate::config::HostConfig;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FixedChecker {
        output: CheckerOutput,
    }

    impl TypeChecker for FixedChecker {
        fn check(
            &mut self,
            _host: &CompileHost,
            _root_names: &[PathBuf],
        ) -> Result<CheckerOutput, HostError> {
            Ok(self.output.clone())
        }
    }

    struct FailingChecker;

    impl TypeChecker for FailingChecker {
        fn check(
            &mut self,
            _host: &CompileHost,
            _root_names: &[PathBuf],
        ) -> Result<CheckerOutput, HostError> {
            Err(HostError::config("checker exploded"))
        }
    }

    fn host_with_entry(dir: &TempDir) -> (CompileHost, PathBuf) {
        let entry = dir.path().join("main.ts");
        fs::write(&entry, "const x: number = 1").unwrap();
        let mut config = HostConfig::default();
        config.base_dir = dir.path().to_path_buf();
        (CompileHost::new(config).unwrap(), entry)
    }

    #[test]
    fn test_compile_orders_diagnostics_by_import_rank() {
        let dir = TempDir::new().unwrap();
        let (host, entry) = host_with_entry(&dir);

        let mut output = CheckerOutput::default();
        output.source_files = vec![
            PathBuf::from("a.ts"),
            PathBuf::from("b.ts"),
            PathBuf::from("c.ts"),
        ];
        output.diagnostics = vec![
            Diagnostic::in_file("late", "c.ts"),
            Diagnostic::in_file("early", "a.ts"),
        ];
        let mut checker = FixedChecker { output };

        let result = compile(&mut checker, &host, &[entry]);
        assert_eq!(result.error_count(), 2);
        assert_eq!(result.errors[0].message, "early");
        assert_eq!(result.errors[1].message, "late");
        assert_eq!(result.inputs.len(), 3);
        assert!(result.watch.is_none());
    }

    #[test]
    fn test_compile_missing_entry_is_fatal() {
        let dir = TempDir::new().unwrap();
        let (host, _) = host_with_entry(&dir);
        let mut checker = FixedChecker {
            output: CheckerOutput::default(),
        };

        let result = compile(&mut checker, &host, &[dir.path().join("absent.ts")]);
        assert_eq!(result.error_count(), 1);
        assert!(result.errors[0].message.contains("absent.ts"));
        assert!(result.inputs.is_empty());
    }

    #[test]
    fn test_compile_no_entries_is_fatal() {
        let dir = TempDir::new().unwrap();
        let (host, _) = host_with_entry(&dir);
        let mut checker = FixedChecker {
            output: CheckerOutput::default(),
        };

        let result = compile(&mut checker, &host, &[]);
        assert_eq!(result.error_count(), 1);
    }

    #[test]
    fn test_compile_empty_resolution_is_fatal() {
        let dir = TempDir::new().unwrap();
        let (host, entry) = host_with_entry(&dir);
        let mut checker = FixedChecker {
            output: CheckerOutput::default(),
        };

        let result = compile(&mut checker, &host, &[entry]);
        assert_eq!(result.error_count(), 1);
        assert!(result.inputs.is_empty());
    }

    #[test]
    fn test_compile_checker_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let (host, entry) = host_with_entry(&dir);

        let result = compile(&mut FailingChecker, &host, &[entry]);
        assert_eq!(result.error_count(), 1);
        assert!(result.errors[0].message.contains("checker exploded"));
    }

    #[test]
    fn test_compile_watch_returns_stoppable_handle() {
        let dir = TempDir::new().unwrap();
        let (host, entry) = host_with_entry(&dir);

        let mut output = CheckerOutput::default();
        output.source_files = vec![entry.clone()];
        output
            .diagnostics
            .push(Diagnostic::in_file("unused variable", &entry));
        let mut checker = FixedChecker { output };

        let result = compile_watch(&mut checker, &host, &[entry]);
        assert_eq!(result.error_count(), 1);
        let handle = result.watch.as_ref().unwrap();
        assert!(handle.is_active());
        result.stop();
        assert!(!handle.is_active());
    }

    #[test]
    fn test_stop_silences_change_callbacks_from_inflight_passes() {
        let dir = TempDir::new().unwrap();
        let entry = dir.path().join("main.ts");
        fs::write(&entry, "const x: number = 1").unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut config = HostConfig::default();
        config.base_dir = dir.path().to_path_buf();
        let host = CompileHost::new(config)
            .unwrap()
            .with_watch_mode(true)
            .unwrap()
            .with_change_callback(Box::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }));

        let mut output = CheckerOutput::default();
        output.source_files = vec![entry.clone()];
        let mut checker = FixedChecker { output };
        let result = compile_watch(&mut checker, &host, &[entry]);

        let emitted = dir.path().join("dist/main.js");
        host.write_file(&emitted, "export {};").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        result.stop();

        // A checker pass still in flight keeps writing, but the stopped
        // session suppresses its rebuild notifications
        host.write_file(&emitted, "export { changed };").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_watch_default_impl_reports_single_stable_pass() {
        let dir = TempDir::new().unwrap();
        let (host, entry) = host_with_entry(&dir);

        let mut output = CheckerOutput::default();
        output.source_files = vec![entry.clone()];
        let mut checker = FixedChecker { output };

        let mut statuses = Vec::new();
        checker
            .watch(&host, &[entry], &mut |status, _| statuses.push(status))
            .unwrap();
        assert_eq!(statuses, vec![WatchStatus::Stable { error_count: 0 }]);
    }

    #[test]
    fn test_debug_report_lists_errors() {
        let result = CompileResult::fatal(HostError::NoSourceFiles);
        let report = result.debug_report();
        assert!(report.contains("compile report @"));
        assert!(report.contains("errors: 1"));

        let json = result.errors_json();
        assert_eq!(json.as_array().map(|errors| errors.len()), Some(1));
    }

    struct FixedBundler {
        output: BundlerOutput,
    }

    impl Bundler for FixedBundler {
        fn bundle(
            &mut self,
            _entries: &[PathBuf],
            _options: &BundleOptions,
        ) -> Result<BundlerOutput, HostError> {
            Ok(self.output.clone())
        }
    }

    #[test]
    fn test_bundle_normalizes_errors_and_warnings() {
        let mut bundler = FixedBundler {
            output: BundlerOutput {
                code: "export {};".into(),
                source_map: None,
                errors: vec![Diagnostic::new("unresolved import")],
                warnings: vec![Diagnostic::new("circular dependency")],
            },
        };

        let result = bundle(
            &mut bundler,
            &[PathBuf::from("main.ts")],
            &BundleOptions::default(),
        );
        assert_eq!(result.code, "export {};");
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].message, "unresolved import");
        assert_eq!(result.errors[1].message, "circular dependency");
        assert_eq!(result.inputs, vec![PathBuf::from("main.ts")]);
    }

    #[test]
    fn test_bundle_no_entries_is_fatal() {
        let mut bundler = FixedBundler {
            output: BundlerOutput::default(),
        };
        let result = bundle(&mut bundler, &[], &BundleOptions::default());
        assert!(result.has_errors());
        assert!(result.code.is_empty());
    }
}

//! Watch session lifecycle
//!
//! A session accumulates diagnostics across incremental checker passes and
//! dumps the ordered set each time the checker reports a stable state.
//! Stopping a session suppresses all further dumps, recording, and
//! host change notifications.

use crate::compiler::{CheckerOutput, WatchStatus};
use crate::config::HostConfig;
use crate::diagnostics::{Diagnostic, DiagnosticsAggregator, ImportOrderMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use typeprep_core::{log_info, log_success};

/// Accumulated state of one watch session
///
/// The active flag is shared: the compile host holds a clone of it and
/// checks it before firing change callbacks, so `stop()` silences both
/// diagnostic dumps and change notifications from any thread.
#[derive(Debug)]
pub struct WatchSession {
    aggregator: DiagnosticsAggregator,
    import_order: ImportOrderMap,
    active: Arc<AtomicBool>,
    passes: usize,
}

impl WatchSession {
    pub fn new(config: &HostConfig) -> Self {
        WatchSession {
            aggregator: DiagnosticsAggregator::new(config.max_displayed_diagnostics)
                .with_debug_file(config.debug_file.clone()),
            import_order: ImportOrderMap::new(),
            active: Arc::new(AtomicBool::new(false)),
            passes: 0,
        }
    }

    /// Begin the session. Calling start on an active session is a no-op.
    pub fn start(&mut self) {
        if self.active.swap(true, Ordering::SeqCst) {
            return;
        }
        log_success!(
            typeprep_core::logging::codes::success::WATCH_SESSION_STARTED,
            "Watch session started"
        );
    }

    /// End the session. Later status reports, diagnostics, and change
    /// notifications gated on [`activity_flag`](Self::activity_flag) are
    /// all suppressed.
    pub fn stop(&mut self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        log_success!(
            typeprep_core::logging::codes::success::WATCH_SESSION_STOPPED,
            "Watch session stopped",
            "passes" => self.passes
        );
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Shared view of the active flag, for gating host-side notifications
    pub fn activity_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active)
    }

    /// Replace the ordering map after a checker pass resolved the file set
    pub fn update_source_files(&mut self, files: &[PathBuf]) {
        if self.is_active() {
            self.import_order = ImportOrderMap::from_source_files(files);
        }
    }

    /// Record a diagnostic. Dropped when the session is stopped.
    pub fn record_diagnostic(&mut self, diagnostic: Diagnostic) {
        if self.is_active() {
            self.aggregator.push(diagnostic);
        }
    }

    pub fn record_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        if self.is_active() {
            self.aggregator.extend(diagnostics);
        }
    }

    /// Diagnostics in display order for the current pass
    pub fn ordered_diagnostics(&self) -> Vec<Diagnostic> {
        self.aggregator.ordered(&self.import_order)
    }

    /// React to a checker status transition.
    ///
    /// Stable states dump the accumulated diagnostics and clear the
    /// accumulator for the next incremental pass. Returns the rendered
    /// report when a dump happened.
    pub fn on_status(&mut self, status: WatchStatus, output: &CheckerOutput) -> Option<String> {
        if !self.is_active() {
            return None;
        }
        match status {
            WatchStatus::Starting | WatchStatus::Rechecking => {
                log_info!("Watch status changed", "code" => status.code());
                None
            }
            WatchStatus::Stable { error_count } => {
                self.passes += 1;
                self.update_source_files(&output.source_files);
                self.record_diagnostics(output.diagnostics.iter().cloned());
                let report = self.aggregator.render(&self.import_order);
                log_info!(
                    "Watch pass stable",
                    "code" => status.code(),
                    "errors" => error_count,
                    "pass" => self.passes
                );
                self.aggregator.clear();
                Some(report)
            }
        }
    }
}

/// Shared handle for stopping a running watch session
#[derive(Clone)]
pub struct WatchHandle(Arc<Mutex<WatchSession>>);

impl WatchHandle {
    pub fn new(session: WatchSession) -> Self {
        WatchHandle(Arc::new(Mutex::new(session)))
    }

    pub fn stop(&self) {
        if let Ok(mut session) = self.0.lock() {
            session.stop();
        }
    }

    pub fn is_active(&self) -> bool {
        self.0.lock().map(|session| session.is_active()).unwrap_or(false)
    }

    /// Shared active flag of the underlying session
    pub fn activity_flag(&self) -> Option<Arc<AtomicBool>> {
        self.0.lock().ok().map(|session| session.activity_flag())
    }

    pub(crate) fn with_session<R>(&self, f: impl FnOnce(&mut WatchSession) -> R) -> Option<R> {
        self.0.lock().ok().map(|mut session| f(&mut session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;

    fn session() -> WatchSession {
        WatchSession::new(&HostConfig::default())
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut session = session();
        session.start();
        session.start();
        assert!(session.is_active());
        session.stop();
        session.stop();
        assert!(!session.is_active());
    }

    #[test]
    fn test_diagnostics_ignored_when_stopped() {
        let mut session = session();
        session.record_diagnostic(Diagnostic::new("before start"));
        assert!(session.ordered_diagnostics().is_empty());

        session.start();
        session.record_diagnostic(Diagnostic::new("while active"));
        assert_eq!(session.ordered_diagnostics().len(), 1);

        session.stop();
        session.record_diagnostic(Diagnostic::new("after stop"));
        assert_eq!(session.ordered_diagnostics().len(), 1);
    }

    #[test]
    fn test_stable_status_dumps_and_clears() {
        let mut session = session();
        session.start();

        let mut output = CheckerOutput::default();
        output.source_files = vec![PathBuf::from("main.ts")];
        output
            .diagnostics
            .push(Diagnostic::in_file("type mismatch", "main.ts"));

        assert!(session
            .on_status(WatchStatus::Starting, &CheckerOutput::default())
            .is_none());

        let report = session
            .on_status(WatchStatus::Stable { error_count: 1 }, &output)
            .unwrap();
        assert!(report.contains("type mismatch"));
        assert!(report.contains("displayed 1 of 1 diagnostics"));

        // accumulator was cleared at the stable point
        assert!(session.ordered_diagnostics().is_empty());
    }

    #[test]
    fn test_stopped_session_suppresses_dumps() {
        let mut session = session();
        session.start();
        session.stop();
        let result = session.on_status(
            WatchStatus::Stable { error_count: 0 },
            &CheckerOutput::default(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_activity_flag_is_shared() {
        let mut session = session();
        session.start();
        let flag = session.activity_flag();
        assert!(flag.load(Ordering::SeqCst));

        session.stop();
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_handle_stop_across_clones() {
        let handle = WatchHandle::new({
            let mut session = session();
            session.start();
            session
        });
        let other = handle.clone();
        assert!(other.is_active());
        handle.stop();
        assert!(!other.is_active());
    }
}

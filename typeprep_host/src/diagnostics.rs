//! Diagnostic collection and ordered, bounded output
//!
//! Diagnostics are sorted by the rank of their file in the compiler's
//! resolved source-file list, deduplicated, and truncated to a display
//! limit. Files the compiler never resolved, and diagnostics with no file
//! at all, sort last in insertion order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use typeprep_core::config::compile_time;
use typeprep_core::log_warning;

/// One compiler or bundler diagnostic, location optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: None,
            line: None,
            column: None,
        }
    }

    pub fn in_file(message: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            message: message.into(),
            file: Some(file.into()),
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line, self.column) {
            (Some(file), Some(line), Some(column)) => {
                write!(f, "{}:{}:{}: {}", file.display(), line, column, self.message)
            }
            (Some(file), _, _) => write!(f, "{}: {}", file.display(), self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Case-normalized cache/map key for a path
pub fn normalize_path_key(path: &Path) -> String {
    path.display().to_string().replace('\\', "/").to_lowercase()
}

/// Dense rank per source file, in the compiler's resolved import order
#[derive(Debug, Default, Clone)]
pub struct ImportOrderMap {
    ranks: HashMap<String, usize>,
}

impl ImportOrderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build ranks 0.. from the compiler's source-file list
    pub fn from_source_files(files: &[PathBuf]) -> Self {
        let mut ranks = HashMap::with_capacity(files.len());
        for (rank, file) in files.iter().enumerate() {
            ranks.entry(normalize_path_key(file)).or_insert(rank);
        }
        Self { ranks }
    }

    pub fn rank(&self, path: &Path) -> Option<usize> {
        self.ranks.get(&normalize_path_key(path)).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// Collects diagnostics across one compile pass and renders bounded output
///
/// Collection is capped at the compile-time `MAX_COLLECTED_DIAGNOSTICS`
/// limit so long watch sessions cannot grow without bound; diagnostics
/// beyond the cap are dropped with a warning.
#[derive(Debug)]
pub struct DiagnosticsAggregator {
    diagnostics: Vec<Diagnostic>,
    max_displayed: usize,
    max_collected: usize,
    dropped: usize,
    debug_file: Option<String>,
}

impl DiagnosticsAggregator {
    pub fn new(max_displayed: usize) -> Self {
        Self {
            diagnostics: Vec::new(),
            max_displayed,
            max_collected: compile_time::diagnostics::MAX_COLLECTED_DIAGNOSTICS,
            dropped: 0,
            debug_file: None,
        }
    }

    pub fn with_debug_file(mut self, debug_file: Option<String>) -> Self {
        self.debug_file = debug_file;
        self
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics.len() >= self.max_collected {
            if self.dropped == 0 {
                log_warning!("Diagnostic collection limit reached, dropping further diagnostics",
                    "limit" => self.max_collected
                );
            }
            self.dropped += 1;
            return;
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    /// Diagnostics discarded after the collection limit was hit
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.dropped = 0;
    }

    /// Sorted, deduplicated diagnostics; does not truncate
    pub fn ordered(&self, order: &ImportOrderMap) -> Vec<Diagnostic> {
        let mut sorted = self.diagnostics.clone();
        // Stable sort keyed only on rank keeps insertion order within a file
        // and among unranked diagnostics
        sorted.sort_by_key(|d| {
            d.file
                .as_deref()
                .and_then(|f| order.rank(f))
                .unwrap_or(usize::MAX)
        });

        let mut seen = HashSet::new();
        sorted.retain(|d| {
            let key = (
                d.file.as_deref().map(normalize_path_key),
                d.message.clone(),
                d.line,
                d.column,
            );
            seen.insert(key)
        });
        sorted
    }

    /// Render the bounded diagnostic report
    pub fn render(&self, order: &ImportOrderMap) -> String {
        let ordered = self.ordered(order);
        let total = ordered.len();

        let filtered: Vec<&Diagnostic> = match &self.debug_file {
            Some(filter) => {
                let needle = filter.to_lowercase();
                let matched: Vec<&Diagnostic> = ordered
                    .iter()
                    .filter(|d| {
                        d.file
                            .as_deref()
                            .map(|f| normalize_path_key(f).contains(&needle))
                            .unwrap_or(false)
                    })
                    .collect();
                if matched.is_empty() && !ordered.is_empty() {
                    let mut names: Vec<String> = ordered
                        .iter()
                        .filter_map(|d| d.file.as_deref().map(normalize_path_key))
                        .collect();
                    names.sort();
                    names.dedup();
                    log_warning!("Debug file filter matched no diagnostics",
                        "filter" => filter,
                        "valid_files" => names.join(", ")
                    );
                }
                matched
            }
            None => ordered.iter().collect(),
        };

        let displayed = filtered.len().min(self.max_displayed);
        let mut out = String::new();
        for diagnostic in filtered.iter().take(self.max_displayed) {
            out.push_str(&diagnostic.to_string());
            out.push('\n');
        }

        if !filtered.is_empty() {
            out.push('\n');
            out.push_str(&self.per_file_summary(&filtered));
            out.push_str(&format!("displayed {} of {} diagnostics\n", displayed, total));
        }

        out
    }

    fn per_file_summary(&self, diagnostics: &[&Diagnostic]) -> String {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for diagnostic in diagnostics {
            let key = diagnostic
                .file
                .as_deref()
                .map(normalize_path_key)
                .unwrap_or_else(|| "<no file>".to_string());
            *counts.entry(key).or_insert(0) += 1;
        }

        let mut out = String::new();
        for (file, count) in counts {
            out.push_str(&format!("{}: {} error(s)\n", file, count));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked_order() -> ImportOrderMap {
        ImportOrderMap::from_source_files(&[
            PathBuf::from("fileA.ts"),
            PathBuf::from("fileX.ts"),
            PathBuf::from("fileC.ts"),
            PathBuf::from("fileB.ts"),
        ])
    }

    #[test]
    fn test_dense_ranks_from_source_order() {
        let order = ranked_order();
        assert_eq!(order.rank(Path::new("fileA.ts")), Some(0));
        assert_eq!(order.rank(Path::new("fileC.ts")), Some(2));
        assert_eq!(order.rank(Path::new("FILEA.TS")), Some(0));
        assert_eq!(order.rank(Path::new("other.ts")), None);
    }

    #[test]
    fn test_import_order_sort() {
        // fileA rank 0, fileB rank 3, fileC rank 2
        let order = ranked_order();
        let mut agg = DiagnosticsAggregator::new(50);
        agg.push(Diagnostic::in_file("b", "fileB.ts"));
        agg.push(Diagnostic::in_file("a", "fileA.ts"));
        agg.push(Diagnostic::in_file("c", "fileC.ts"));

        let ordered = agg.ordered(&order);
        let files: Vec<_> = ordered
            .iter()
            .map(|d| d.file.as_ref().unwrap().display().to_string())
            .collect();
        assert_eq!(files, vec!["fileA.ts", "fileC.ts", "fileB.ts"]);
    }

    #[test]
    fn test_unranked_sort_last_in_insertion_order() {
        let order = ranked_order();
        let mut agg = DiagnosticsAggregator::new(50);
        agg.push(Diagnostic::new("global one"));
        agg.push(Diagnostic::in_file("a", "fileA.ts"));
        agg.push(Diagnostic::new("global two"));

        let ordered = agg.ordered(&order);
        assert_eq!(ordered[0].message, "a");
        assert_eq!(ordered[1].message, "global one");
        assert_eq!(ordered[2].message, "global two");
    }

    #[test]
    fn test_dedup() {
        let order = ranked_order();
        let mut agg = DiagnosticsAggregator::new(50);
        agg.push(Diagnostic::in_file("dup", "fileA.ts").at(1, 2));
        agg.push(Diagnostic::in_file("dup", "fileA.ts").at(1, 2));
        agg.push(Diagnostic::in_file("dup", "fileA.ts").at(3, 4));

        assert_eq!(agg.ordered(&order).len(), 2);
    }

    #[test]
    fn test_truncation_notice() {
        let order = ranked_order();
        let mut agg = DiagnosticsAggregator::new(2);
        for i in 0..5 {
            agg.push(Diagnostic::in_file(format!("error {}", i), "fileA.ts"));
        }

        let report = agg.render(&order);
        assert!(report.contains("displayed 2 of 5 diagnostics"));
        assert!(report.contains("error 0"));
        assert!(!report.contains("error 3"));
    }

    #[test]
    fn test_debug_file_filter() {
        let order = ranked_order();
        let mut agg = DiagnosticsAggregator::new(50).with_debug_file(Some("FileC".to_string()));
        agg.push(Diagnostic::in_file("a", "fileA.ts"));
        agg.push(Diagnostic::in_file("c", "fileC.ts"));

        let report = agg.render(&order);
        assert!(report.contains("c"));
        assert!(!report.contains("fileA.ts:"));
    }

    #[test]
    fn test_collection_capped_at_compile_time_limit() {
        let limit = compile_time::diagnostics::MAX_COLLECTED_DIAGNOSTICS;
        let mut agg = DiagnosticsAggregator::new(50);
        agg.extend((0..limit + 25).map(|i| Diagnostic::new(format!("error {}", i))));

        assert_eq!(agg.len(), limit);
        assert_eq!(agg.dropped(), 25);

        // clearing at a dump point makes room again
        agg.clear();
        assert_eq!(agg.dropped(), 0);
        agg.push(Diagnostic::new("after clear"));
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn test_per_file_summary() {
        let order = ranked_order();
        let mut agg = DiagnosticsAggregator::new(50);
        agg.push(Diagnostic::in_file("one", "fileA.ts"));
        agg.push(Diagnostic::in_file("two", "fileA.ts"));
        agg.push(Diagnostic::in_file("three", "fileB.ts"));

        let report = agg.render(&order);
        assert!(report.contains("filea.ts: 2 error(s)"));
        assert!(report.contains("fileb.ts: 1 error(s)"));
    }
}

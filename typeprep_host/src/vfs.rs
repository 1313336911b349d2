//! Virtual file system served to the external compiler
//!
//! The compiler never touches the real filesystem directly: `file_exists`,
//! `read_file`, `write_file`, and `resolve_module` mediate every access.
//! Reads of processable sources go through the full preprocessing pipeline
//! and land in the cache; writes of `.js` outputs get their aliased imports
//! rewritten and, in watch mode, are deduplicated by content.

use crate::config::HostConfig;
use crate::diagnostics::normalize_path_key;
use crate::emit::rewrite_emitted_imports;
use crate::error::HostError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use typeprep_core::file_processor::PROCESSABLE_EXTENSIONS;
use typeprep_core::{log_debug, pipeline};

/// Module resolution tries these in order
const RESOLUTION_EXTENSIONS: &[&str] = &[".ts", ".tsx", "", ".js"];

pub type PostProcessFn = Box<dyn Fn(&str, &Path) -> String + Send + Sync>;
pub type ChangeCallback = Box<dyn Fn(&Path) + Send + Sync>;

/// Caller-supplied hook run over preprocessed text before caching
pub enum PostProcess {
    /// Runs synchronously on the calling thread
    Inline(PostProcessFn),
    /// Runs on a worker thread and is joined; rejected in watch mode
    Background(PostProcessFn),
}

/// The compile host backing one compile pass or watch session
pub struct CompileHost {
    config: HostConfig,
    watch_mode: bool,
    /// Path key -> fully preprocessed text
    cache: RwLock<HashMap<String, String>>,
    /// Path key -> last written content, for watch-mode write dedup
    written: Mutex<HashMap<String, String>>,
    outputs: Mutex<Vec<PathBuf>>,
    post_process: Option<PostProcess>,
    change_callback: Option<ChangeCallback>,
    /// Watch-session active flag; once it goes false no change callback fires
    change_gate: Mutex<Option<Arc<AtomicBool>>>,
}

impl std::fmt::Debug for CompileHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileHost")
            .field("config", &self.config)
            .field("watch_mode", &self.watch_mode)
            .finish_non_exhaustive()
    }
}

impl CompileHost {
    pub fn new(config: HostConfig) -> Result<Self, HostError> {
        config.validate()?;
        Ok(Self {
            config,
            watch_mode: false,
            cache: RwLock::new(HashMap::new()),
            written: Mutex::new(HashMap::new()),
            outputs: Mutex::new(Vec::new()),
            post_process: None,
            change_callback: None,
            change_gate: Mutex::new(None),
        })
    }

    pub fn with_watch_mode(mut self, watch_mode: bool) -> Result<Self, HostError> {
        if watch_mode && matches!(self.post_process, Some(PostProcess::Background(_))) {
            return Err(HostError::misuse(
                "background post-processing hook cannot be used in watch mode",
            ));
        }
        self.watch_mode = watch_mode;
        Ok(self)
    }

    pub fn with_post_process(mut self, hook: PostProcess) -> Result<Self, HostError> {
        if self.watch_mode && matches!(hook, PostProcess::Background(_)) {
            return Err(HostError::misuse(
                "background post-processing hook cannot be used in watch mode",
            ));
        }
        self.post_process = Some(hook);
        Ok(self)
    }

    pub fn with_change_callback(mut self, callback: ChangeCallback) -> Self {
        self.change_callback = Some(callback);
        self
    }

    /// Tie change notifications to a watch session's active flag; once the
    /// session stops, writes still go to disk but fire no callback
    pub fn gate_change_callback(&self, flag: Arc<AtomicBool>) {
        if let Ok(mut gate) = self.change_gate.lock() {
            *gate = Some(flag);
        }
    }

    fn change_callback_allowed(&self) -> bool {
        match self.change_gate.lock() {
            Ok(gate) => gate
                .as_ref()
                .map(|flag| flag.load(Ordering::SeqCst))
                .unwrap_or(true),
            Err(_) => false,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn is_watch_mode(&self) -> bool {
        self.watch_mode
    }

    /// Paths written so far, in first-write order
    pub fn output_paths(&self) -> Vec<PathBuf> {
        match self.outputs.lock() {
            Ok(outputs) => outputs.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Drop all cached preprocessed content (per-invocation invalidation)
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// True for cached entries, else for real files passing the
    /// exact-files gate
    pub fn file_exists(&self, path: &Path) -> bool {
        if let Ok(cache) = self.cache.read() {
            if cache.contains_key(&normalize_path_key(path)) {
                return true;
            }
        }
        self.config.allows_path(path) && path.is_file()
    }

    /// Serve preprocessed content to the compiler
    pub fn read_file(&self, path: &Path) -> Result<String, HostError> {
        let key = normalize_path_key(path);

        if let Ok(cache) = self.cache.read() {
            if let Some(content) = cache.get(&key) {
                return Ok(content.clone());
            }
        }

        if !self.file_exists(path) {
            return Err(HostError::SourceNotFound {
                path: path.display().to_string(),
            });
        }

        let content = if is_processable_source(path) {
            let path_str = path.display().to_string();
            let processed = pipeline::preprocess_file(&path_str)?;
            self.run_post_process(&processed.output, path)?
        } else {
            fs::read_to_string(path).map_err(|e| HostError::io(&e, path))?
        };

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, content.clone());
        }
        Ok(content)
    }

    /// Alias for [`read_file`](Self::read_file), mirroring the compiler's
    /// source-text hook
    pub fn get_source(&self, path: &Path) -> Result<String, HostError> {
        self.read_file(path)
    }

    fn run_post_process(&self, text: &str, path: &Path) -> Result<String, HostError> {
        match &self.post_process {
            None => Ok(text.to_string()),
            Some(PostProcess::Inline(hook)) => Ok(hook(text, path)),
            Some(PostProcess::Background(hook)) => {
                if self.watch_mode {
                    return Err(HostError::misuse(
                        "background post-processing hook cannot be used in watch mode",
                    ));
                }
                let joined = std::thread::scope(|s| s.spawn(|| hook(text, path)).join());
                joined.map_err(|_| HostError::Io {
                    message: format!(
                        "post-processing hook panicked for '{}'",
                        path.display()
                    ),
                })
            }
        }
    }

    /// Write an emitted file through to disk.
    ///
    /// Returns true when content was actually written. In watch mode a write
    /// whose content matches the previous write for the same path is skipped
    /// along with its change notification.
    pub fn write_file(&self, path: &Path, data: &str) -> Result<bool, HostError> {
        let key = normalize_path_key(path);
        let is_js = path.extension().and_then(|e| e.to_str()) == Some("js");

        let content = if is_js {
            rewrite_emitted_imports(data, path, &self.config)
        } else {
            data.to_string()
        };

        if self.watch_mode {
            if let Ok(written) = self.written.lock() {
                if written.get(&key) == Some(&content) {
                    log_debug!("Skipping unchanged output", "path" => path.display());
                    return Ok(false);
                }
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| HostError::io(&e, path))?;
        }
        fs::write(path, &content).map_err(|e| HostError::io(&e, path))?;

        if let Ok(mut written) = self.written.lock() {
            written.insert(key, content);
        }
        if let Ok(mut outputs) = self.outputs.lock() {
            if !outputs.iter().any(|p| p == path) {
                outputs.push(path.to_path_buf());
            }
        }

        if is_js && self.change_callback_allowed() {
            if let Some(callback) = &self.change_callback {
                callback(path);
            }
        }
        Ok(true)
    }

    /// Resolve a module specifier: alias rules first, then a relative lookup
    /// for `./`/`../` specifiers, then an upward directory walk for bare
    /// names, all through this host's own `file_exists`
    pub fn resolve_module(&self, specifier: &str, containing_file: &Path) -> Option<PathBuf> {
        for rule in &self.config.aliases {
            if let Some(substituted) = rule.apply(specifier) {
                let base = self.config.base_dir.join(substituted);
                if let Some(resolved) = self.try_extensions(&base) {
                    return Some(resolved);
                }
            }
        }

        if specifier.starts_with("./") || specifier.starts_with("../") {
            let trimmed = specifier.strip_prefix("./").unwrap_or(specifier);
            let base = containing_file
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(trimmed);
            return self.try_extensions(&base);
        }

        // Bare specifiers walk upward from the containing directory
        let mut dir = containing_file.parent();
        while let Some(current) = dir {
            if let Some(resolved) = self.try_extensions(&current.join(specifier)) {
                return Some(resolved);
            }
            dir = current.parent();
        }

        None
    }

    fn try_extensions(&self, base: &Path) -> Option<PathBuf> {
        for ext in RESOLUTION_EXTENSIONS {
            let candidate = if ext.is_empty() {
                base.to_path_buf()
            } else {
                PathBuf::from(format!("{}{}", base.display(), ext))
            };
            if self.file_exists(&candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

/// Sources the pipeline transforms; declaration files still preprocess via
/// the pipeline's passthrough path
fn is_processable_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| PROCESSABLE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

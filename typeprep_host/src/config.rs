//! Host configuration loaded from TOML
//!
//! Malformed configuration is fatal and aborts before any file processing.

use crate::error::HostError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use typeprep_core::config::compile_time;
use typeprep_core::log_debug;

/// One path alias, `pattern` and `target` with matching `/*` wildcards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasRule {
    /// Import specifier pattern, e.g. `app/*`
    pub pattern: String,
    /// Replacement path relative to the project base, e.g. `src/app/*`
    pub target: String,
}

impl AliasRule {
    /// Match `specifier` against this rule; returns the substituted target
    pub fn apply(&self, specifier: &str) -> Option<String> {
        match self.pattern.split_once('*') {
            Some((prefix, suffix)) => {
                let rest = specifier.strip_prefix(prefix)?;
                let rest = rest.strip_suffix(suffix)?;
                Some(self.target.replacen('*', rest, 1))
            }
            None => {
                if specifier == self.pattern {
                    Some(self.target.clone())
                } else {
                    None
                }
            }
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_max_displayed_diagnostics() -> usize {
    compile_time::diagnostics::MAX_DISPLAYED_DIAGNOSTICS
}

/// Compile host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Project base directory alias targets resolve against
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Output directory for emitted files
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Path aliases tried before classic module resolution
    #[serde(default)]
    pub aliases: Vec<AliasRule>,

    /// When set, only these files exist as far as the compiler can tell
    #[serde(default)]
    pub exact_files: Option<Vec<PathBuf>>,

    /// Display limit for dumped diagnostics
    #[serde(default = "default_max_displayed_diagnostics")]
    pub max_displayed_diagnostics: usize,

    /// Restrict diagnostic dumps to one file (case-insensitive match)
    #[serde(default)]
    pub debug_file: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            out_dir: default_out_dir(),
            aliases: Vec::new(),
            exact_files: None,
            max_displayed_diagnostics: default_max_displayed_diagnostics(),
            debug_file: None,
        }
    }
}

impl HostConfig {
    /// Parse configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, HostError> {
        let config: HostConfig = toml::from_str(content)
            .map_err(|e| HostError::config(format!("failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, HostError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HostError::config(format!("cannot read config '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        log_debug!("Host configuration loaded",
            "path" => path.display(),
            "aliases" => config.aliases.len()
        );
        Ok(config)
    }

    /// Validate rules the TOML schema cannot express
    pub fn validate(&self) -> Result<(), HostError> {
        for rule in &self.aliases {
            if rule.pattern.is_empty() || rule.target.is_empty() {
                return Err(HostError::config("alias pattern and target must be non-empty"));
            }
            if rule.pattern.matches('*').count() > 1 || rule.target.matches('*').count() > 1 {
                return Err(HostError::config(format!(
                    "alias '{}' may contain at most one wildcard",
                    rule.pattern
                )));
            }
            if rule.pattern.matches('*').count() != rule.target.matches('*').count() {
                return Err(HostError::config(format!(
                    "alias '{}' and target '{}' must both be wildcarded or both exact",
                    rule.pattern, rule.target
                )));
            }
        }

        if self.max_displayed_diagnostics == 0 {
            return Err(HostError::config("max_displayed_diagnostics must be at least 1"));
        }

        Ok(())
    }

    /// Whether the exact-files gate allows `path`
    pub fn allows_path(&self, path: &Path) -> bool {
        match &self.exact_files {
            Some(allowed) => allowed.iter().any(|p| p == path),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_alias_wildcard_apply() {
        let rule = AliasRule {
            pattern: "app/*".to_string(),
            target: "src/app/*".to_string(),
        };

        assert_eq!(rule.apply("app/widgets"), Some("src/app/widgets".to_string()));
        assert_eq!(rule.apply("lib/widgets"), None);
    }

    #[test]
    fn test_alias_exact_apply() {
        let rule = AliasRule {
            pattern: "config".to_string(),
            target: "src/config/index".to_string(),
        };

        assert_eq!(rule.apply("config"), Some("src/config/index".to_string()));
        assert_eq!(rule.apply("config/extra"), None);
    }

    #[test]
    fn test_from_toml() {
        let config = HostConfig::from_toml_str(
            r#"
            base_dir = "proj"
            out_dir = "build"
            max_displayed_diagnostics = 10

            [[aliases]]
            pattern = "app/*"
            target = "src/app/*"
            "#,
        )
        .unwrap();

        assert_eq!(config.out_dir, PathBuf::from("build"));
        assert_eq!(config.aliases.len(), 1);
        assert_eq!(config.max_displayed_diagnostics, 10);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = HostConfig::from_toml_str(
            r#"
            [[aliases]]
            pattern = "app/*"
            target = "src/app"
            "#,
        );
        assert_matches!(result, Err(HostError::Config { .. }));

        let result = HostConfig::from_toml_str("max_displayed_diagnostics = 0");
        assert_matches!(result, Err(HostError::Config { .. }));
    }

    #[test]
    fn test_display_limit_defaults_to_compile_time_constant() {
        let config = HostConfig::default();
        assert_eq!(
            config.max_displayed_diagnostics,
            compile_time::diagnostics::MAX_DISPLAYED_DIAGNOSTICS
        );

        let parsed = HostConfig::from_toml_str("base_dir = \"proj\"").unwrap();
        assert_eq!(
            parsed.max_displayed_diagnostics,
            compile_time::diagnostics::MAX_DISPLAYED_DIAGNOSTICS
        );
    }

    #[test]
    fn test_exact_files_gate() {
        let mut config = HostConfig::default();
        assert!(config.allows_path(Path::new("a.ts")));

        config.exact_files = Some(vec![PathBuf::from("a.ts")]);
        assert!(config.allows_path(Path::new("a.ts")));
        assert!(!config.allows_path(Path::new("b.ts")));
    }
}

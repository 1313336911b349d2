//! Textual macro engine
//!
//! Two passes over classified batches: extraction reads `#macro` directives
//! out of Preprocessor batches (removing them from the output), substitution
//! expands invocations inside Code batches. String, comment, and regex
//! batches are never touched by either pass.

mod expand;
mod extract;

pub use expand::expand_macros;
pub use extract::extract_macros;

use crate::config::compile_time::macros::*;
use crate::logging::codes;
use std::collections::HashMap;

/// A named, optionally parameterized text substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    pub name: String,
    /// Ordered, positional argument names; unique within one definition
    pub args: Vec<String>,
    pub value: String,
}

impl MacroDef {
    pub fn new(name: impl Into<String>, args: Vec<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args,
            value: value.into(),
        }
    }

    pub fn is_function_like(&self) -> bool {
        !self.args.is_empty()
    }
}

/// All macros extracted from one file; lifetime is one preprocessing pass
#[derive(Debug, Clone, Default)]
pub struct MacroSet {
    defs: Vec<MacroDef>,
    index: HashMap<String, usize>,
}

impl MacroSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition; a redefinition replaces the earlier one
    pub fn insert(&mut self, def: MacroDef) -> bool {
        match self.index.get(&def.name) {
            Some(&existing) => {
                self.defs[existing] = def;
                false
            }
            None => {
                self.index.insert(def.name.clone(), self.defs.len());
                self.defs.push(def);
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&MacroDef> {
        self.index.get(name).map(|&i| &self.defs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MacroDef> {
        self.defs.iter()
    }
}

/// Macro engine errors with compile-time security boundaries
#[derive(Debug, Clone, thiserror::Error)]
pub enum MacroError {
    #[error("Too many macros: {count} (max {MAX_MACRO_COUNT})")]
    MacroLimitExceeded { count: usize },

    #[error("Too many expansions: {count} (max {MAX_EXPANSIONS_PER_FILE})")]
    ExpansionLimitExceeded { count: usize },
}

impl MacroError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            MacroError::MacroLimitExceeded { .. } => codes::macros::MACRO_LIMIT_EXCEEDED,
            MacroError::ExpansionLimitExceeded { .. } => {
                codes::macros::EXPANSION_LIMIT_EXCEEDED
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_set_insert_and_lookup() {
        let mut set = MacroSet::new();
        assert!(set.insert(MacroDef::new("WIDTH", vec![], "100")));
        assert!(set.contains("WIDTH"));
        assert_eq!(set.get("WIDTH").unwrap().value, "100");
        assert!(set.get("HEIGHT").is_none());
    }

    #[test]
    fn test_redefinition_replaces() {
        let mut set = MacroSet::new();
        set.insert(MacroDef::new("W", vec![], "1"));
        let fresh = set.insert(MacroDef::new("W", vec![], "2"));

        assert!(!fresh);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("W").unwrap().value, "2");
    }

    #[test]
    fn test_function_like() {
        let plain = MacroDef::new("A", vec![], "x");
        let func = MacroDef::new("B", vec!["n".to_string()], "n + 1");

        assert!(!plain.is_function_like());
        assert!(func.is_function_like());
    }
}

//! The ordered, user-editable list of pattern rules.
//!
//! Rules are kept as raw text and only compiled when a match pass asks for
//! them. The compiled form is cached and thrown away on every edit.

use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::matcher::{compile_rules, CompiledRules};

/// Rules applied when the user has not edited anything, in order: file
/// extension, bracketed tags, resolution markers, language markers, separators.
pub const DEFAULT_RULES: [&str; 5] = [
    r"\.[a-z0-9]+$",
    r"\[[^\]]*\]",
    r"1080p|720p|4k",
    r"ptbr|eng|jap|jp",
    r"[-_.\s]",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    rules: Vec<String>,
    #[serde(skip)]
    compiled: Option<CompiledRules>,
}

impl RuleSet {
    pub fn new(rules: Vec<String>) -> Self {
        Self {
            rules,
            compiled: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Append a blank rule and return its index.
    pub fn add_rule(&mut self) -> usize {
        self.push_rule(String::new())
    }

    pub fn push_rule(&mut self, pattern: impl Into<String>) -> usize {
        self.rules.push(pattern.into());
        self.compiled = None;
        self.rules.len() - 1
    }

    /// Replace the rule at `index`. Returns `false` if there is no such rule.
    ///
    /// The new text is not validated here; a bad pattern surfaces as a
    /// [`CompileError`] on the next call to [`RuleSet::compiled`].
    pub fn replace_rule(&mut self, index: usize, pattern: impl Into<String>) -> bool {
        match self.rules.get_mut(index) {
            Some(rule) => {
                *rule = pattern.into();
                self.compiled = None;
                true
            }
            None => false,
        }
    }

    pub fn remove_rule(&mut self, index: usize) -> Option<String> {
        if index >= self.rules.len() {
            return None;
        }
        self.compiled = None;
        Some(self.rules.remove(index))
    }

    /// Compiled form of the current rules, rebuilt only after an edit.
    pub fn compiled(&mut self) -> Result<&CompiledRules, CompileError> {
        let compiled = match self.compiled.take() {
            Some(compiled) => compiled,
            None => compile_rules(&self.rules)?,
        };
        Ok(self.compiled.insert(compiled))
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.iter().map(|r| r.to_string()).collect())
    }
}

impl PartialEq for RuleSet {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl From<Vec<String>> for RuleSet {
    fn from(rules: Vec<String>) -> Self {
        Self::new(rules)
    }
}

//! Registry of every known rule, keyed by long id.
//!
//! Built once at startup and read-only afterwards: `register` takes `&mut self`, evaluation only
//! ever sees `&Registry`.

use crate::rule::Rule;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("rule has an empty long id")]
    EmptyId,
    #[error("duplicate rule id: {long_id}")]
    Duplicate { long_id: String },
}

#[derive(Clone, Debug, Default)]
pub struct Registry {
    rules: BTreeMap<String, Rule>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. A second rule under an existing long id is rejected, never overwritten.
    pub fn register(&mut self, rule: Rule) -> Result<(), RegistryError> {
        if rule.long_id.is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.rules.contains_key(&rule.long_id) {
            return Err(RegistryError::Duplicate {
                long_id: rule.long_id,
            });
        }
        self.rules.insert(rule.long_id.clone(), rule);
        Ok(())
    }

    pub fn lookup(&self, long_id: &str) -> Option<&Rule> {
        self.rules.get(long_id)
    }

    /// Find a rule by long id, short id, or identifier.
    pub fn find(&self, id: &str) -> Option<&Rule> {
        self.lookup(id)
            .or_else(|| self.rules.values().find(|r| r.identified_by(id)))
    }

    /// All rules, ordered by long id.
    pub fn all(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn long_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

//! Seam between the engine and the declarative policy interpreter.

use crate::rule::ModuleRef;
use iacguard_types::Range;
use thiserror::Error;

/// One finding returned by a declarative rule's `deny` query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclarativeFinding {
    pub message: String,
    pub range: Range,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("query {package} failed: {message}")]
pub struct QueryError {
    pub package: String,
    pub message: String,
}

/// Runs compiled declarative modules against a JSON input document.
pub trait PolicyRuntime {
    fn query(
        &self,
        module: &ModuleRef,
        input: &serde_json::Value,
    ) -> Result<Vec<DeclarativeFinding>, QueryError>;
}

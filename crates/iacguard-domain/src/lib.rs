//! Pure rule evaluation (no IO).
//!
//! Input: a state snapshot and a registry built elsewhere.
//! Output: results + status counts + summary data.

#![forbid(unsafe_code)]

pub mod checks;
pub mod outcome;
pub mod policy;
pub mod registry;
pub mod report;
pub mod rule;
pub mod runtime;
pub mod state;

mod engine;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use engine::evaluate;
pub use registry::{Registry, RegistryError};
pub use rule::{Check, InputSelector, ModuleRef, NativeCheckFn, Rule, RuleMetadata};
pub use runtime::{DeclarativeFinding, PolicyRuntime, QueryError};

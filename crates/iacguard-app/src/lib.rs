//! Use case orchestration for iacguard.
//!
//! This crate coordinates startup (native + declarative rule registration), settings resolution,
//! and evaluation. The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod explain;
mod rules;
mod scan;
mod scanner;

pub use explain::{ExplainOutput, RuleExplanation, format_explanation, format_not_found, run_explain};
pub use rules::{RuleSummary, format_rules, list_rules};
pub use scan::{ScanInput, ScanOutput, exit_code, resolve_settings, run_scan, serialize_report};
pub use scanner::Scanner;

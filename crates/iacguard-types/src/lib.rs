//! Stable DTOs and IDs used across the iacguard workspace.
//!
//! This crate is intentionally boring:
//! - result and report types emitted by a scan
//! - stable string IDs for natively implemented rules
//! - canonical document-tree path handling

#![forbid(unsafe_code)]

pub mod ids;
pub mod path;
pub mod result;

pub use path::DocPath;
pub use result::{
    ParseSeverityError, Range, ReportData, ScanReport, ScanResult, Severity, Status,
    StatusCounts, ToolMeta, SCHEMA_REPORT_V1,
};

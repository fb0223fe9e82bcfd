use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Stable schema identifier for iacguard reports.
pub const SCHEMA_REPORT_V1: &str = "iacguard.report.v1";

/// Rule severity, ordered from least to most severe.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseSeverityError(pub String);

impl fmt::Display for ParseSeverityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown severity: {} (expected low|medium|high|critical)",
            self.0
        )
    }
}

impl std::error::Error for ParseSeverityError {}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

/// Verdict of one rule against one subject.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
    Ignored,
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Ignored => "ignored",
            Status::Unknown => "unknown",
        }
    }
}

/// Source location of the resource (or attribute) that produced a result.
///
/// A default range means "no location known", e.g. a rule that failed as a whole.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    JsonSchema,
)]
pub struct Range {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filepath: String,
    #[serde(default)]
    pub start_line: u32,
    #[serde(default)]
    pub end_line: u32,
}

impl Range {
    pub fn new(filepath: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            filepath: filepath.into(),
            start_line,
            end_line,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.filepath.is_empty() && self.start_line == 0 && self.end_line == 0
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return f.write_str("<unknown>");
        }
        if self.start_line == self.end_line {
            write!(f, "{}:{}", self.filepath, self.start_line)
        } else {
            write!(f, "{}:{}-{}", self.filepath, self.start_line, self.end_line)
        }
    }
}

/// One verdict: status + rule identity + location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScanResult {
    pub status: Status,
    pub rule_long_id: String,
    pub rule_short_id: String,
    pub avd_id: String,
    pub severity: Severity,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Range::is_unknown")]
    pub range: Range,
}

impl ScanResult {
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn rule_long_id(&self) -> &str {
        &self.rule_long_id
    }

    pub fn range(&self) -> &Range {
        &self.range
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatusCounts {
    pub passed: u32,
    pub failed: u32,
    pub ignored: u32,
    pub unknown: u32,
}

impl StatusCounts {
    pub fn from_results(results: &[ScanResult]) -> Self {
        let mut counts = StatusCounts::default();
        for r in results {
            match r.status {
                Status::Passed => counts.passed += 1,
                Status::Failed => counts.failed += 1,
                Status::Ignored => counts.ignored += 1,
                Status::Unknown => counts.unknown += 1,
            }
        }
        counts
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// Scan summary payload for the report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportData {
    pub rules_registered: u32,
    pub rules_evaluated: u32,
    pub results_total: u32,
    pub results_emitted: u32,
    pub counts: StatusCounts,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated_reason: Option<String>,
}

/// The report envelope written by the CLI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScanReport {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub results: Vec<ScanResult>,
    pub data: ReportData,
}

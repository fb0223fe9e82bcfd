//! The `scan` use case: evaluate a state snapshot and produce a report.

use crate::scanner::Scanner;
use anyhow::Context;
use iacguard_domain::state::State;
use iacguard_settings::{IacguardConfigV1, Overrides, ResolvedConfig};
use iacguard_types::{SCHEMA_REPORT_V1, ScanReport, ToolMeta};
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Input for the scan use case.
#[derive(Clone, Debug)]
pub struct ScanInput<'a> {
    /// State snapshot as JSON.
    pub state_text: &'a str,
    pub config: &'a ResolvedConfig,
}

#[derive(Clone, Debug)]
pub struct ScanOutput {
    pub report: ScanReport,
}

/// Parse and resolve config text (empty is allowed, defaults apply).
pub fn resolve_settings(config_text: &str, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    let cfg = if config_text.trim().is_empty() {
        IacguardConfigV1::default()
    } else {
        iacguard_settings::parse_config_toml(config_text).context("parse config")?
    };
    iacguard_settings::resolve_config(cfg, overrides).context("resolve config")
}

pub fn run_scan(scanner: &Scanner, input: ScanInput<'_>) -> anyhow::Result<ScanOutput> {
    let started_at = OffsetDateTime::now_utc();

    let state: State = serde_json::from_str(input.state_text).context("parse state")?;

    let domain_report = iacguard_domain::evaluate(
        &state,
        scanner.registry(),
        Some(scanner.policies()),
        &input.config.effective,
    );

    for result in domain_report
        .results
        .iter()
        .filter(|r| r.status == iacguard_types::Status::Unknown)
    {
        warn!(rule = %result.rule_long_id, reason = %result.message, "rule could not be evaluated");
    }
    debug!(
        evaluated = domain_report.data.rules_evaluated,
        results = domain_report.data.results_emitted,
        "scan finished"
    );

    let finished_at = OffsetDateTime::now_utc();
    let iacguard_domain::report::DomainReport { results, data } = domain_report;

    Ok(ScanOutput {
        report: ScanReport {
            schema: SCHEMA_REPORT_V1.to_string(),
            tool: ToolMeta {
                name: "iacguard".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            started_at,
            finished_at,
            results,
            data,
        },
    })
}

/// 0 = nothing failed, 2 = at least one failed result.
pub fn exit_code(report: &ScanReport) -> i32 {
    if report.data.counts.failed > 0 { 2 } else { 0 }
}

pub fn serialize_report(report: &ScanReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

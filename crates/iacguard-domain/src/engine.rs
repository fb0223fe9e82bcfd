use crate::outcome::{Outcome, Outcomes};
use crate::policy::{EffectiveConfig, RuleFilter};
use crate::registry::Registry;
use crate::report::DomainReport;
use crate::rule::{Check, Rule};
use crate::runtime::PolicyRuntime;
use crate::state::{self, State};
use iacguard_types::{Range, ReportData, ScanResult, Status, StatusCounts};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Evaluate every enabled rule in `registry` against `state`.
///
/// Each rule is evaluated exactly once. A rule that panics or whose query fails contributes a
/// single `Unknown` result; the remaining rules are unaffected.
pub fn evaluate(
    state: &State,
    registry: &Registry,
    runtime: Option<&dyn PolicyRuntime>,
    cfg: &EffectiveConfig,
) -> DomainReport {
    let filter = RuleFilter::new(cfg);
    let (native, declarative): (Vec<&Rule>, Vec<&Rule>) = registry
        .all()
        .filter(|rule| filter.is_enabled(rule))
        .partition(|rule| matches!(rule.check, Check::Native(_)));
    let rules_evaluated = (native.len() + declarative.len()) as u32;

    let mut results: Vec<ScanResult> = if cfg.parallel {
        native
            .par_iter()
            .flat_map_iter(|rule| run_native(rule, state, &filter))
            .collect()
    } else {
        native
            .iter()
            .flat_map(|rule| run_native(rule, state, &filter))
            .collect()
    };

    // The interpreter is single-threaded; declarative rules run on the caller's thread.
    if !declarative.is_empty() {
        let input = state.to_input().map_err(|e| e.to_string());
        for rule in declarative {
            results.extend(run_declarative(rule, &input, runtime, &filter));
        }
    }

    // Deterministic ordering before truncation.
    results.sort_by(compare_results);

    let total = results.len() as u32;
    let mut truncated_reason: Option<String> = None;
    if let Some(max) = cfg.max_results
        && results.len() > max
    {
        results.truncate(max);
        truncated_reason = Some(format!("results truncated to max_results={max}"));
    }

    let data = ReportData {
        rules_registered: registry.len() as u32,
        rules_evaluated,
        results_total: total,
        results_emitted: results.len() as u32,
        counts: StatusCounts::from_results(&results),
        truncated_reason,
    };

    DomainReport { results, data }
}

fn run_native(rule: &Rule, state: &State, filter: &RuleFilter) -> Vec<ScanResult> {
    let Check::Native(check) = &rule.check else {
        return Vec::new();
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut out = Outcomes::new();
        check(state, &mut out);
        out
    }));

    match outcome {
        Ok(out) => out
            .into_vec()
            .into_iter()
            .map(|o| to_result(rule, o, filter))
            .collect(),
        Err(payload) => vec![unknown(
            rule,
            format!("check panicked: {}", panic_message(payload.as_ref())),
        )],
    }
}

fn run_declarative(
    rule: &Rule,
    input: &Result<serde_json::Value, String>,
    runtime: Option<&dyn PolicyRuntime>,
    filter: &RuleFilter,
) -> Vec<ScanResult> {
    let Check::Declarative(module) = &rule.check else {
        return Vec::new();
    };
    let Some(runtime) = runtime else {
        return vec![unknown(rule, "no policy runtime available".to_string())];
    };
    let input = match input {
        Ok(input) => input,
        Err(e) => return vec![unknown(rule, format!("state could not be encoded: {e}"))],
    };

    let selectors = &rule.metadata.selectors;
    if !selectors.is_empty()
        && !selectors
            .iter()
            .any(|s| state::service_present(input, &s.provider, &s.service))
    {
        return Vec::new();
    }

    let queried = panic::catch_unwind(AssertUnwindSafe(|| runtime.query(module, input)));

    match queried {
        Ok(Ok(findings)) if findings.is_empty() => vec![to_result(
            rule,
            Outcome {
                status: Status::Passed,
                message: String::new(),
                range: Range::default(),
            },
            filter,
        )],
        Ok(Ok(findings)) => findings
            .into_iter()
            .map(|f| {
                to_result(
                    rule,
                    Outcome {
                        status: Status::Failed,
                        message: f.message,
                        range: f.range,
                    },
                    filter,
                )
            })
            .collect(),
        Ok(Err(e)) => vec![unknown(rule, e.to_string())],
        Err(payload) => vec![unknown(
            rule,
            format!("policy query panicked: {}", panic_message(payload.as_ref())),
        )],
    }
}

fn to_result(rule: &Rule, outcome: Outcome, filter: &RuleFilter) -> ScanResult {
    let status = if outcome.status == Status::Failed && filter.is_ignored(rule) {
        Status::Ignored
    } else {
        outcome.status
    };
    ScanResult {
        status,
        rule_long_id: rule.long_id.clone(),
        rule_short_id: rule.short_id.clone(),
        avd_id: rule.metadata.avd_id.clone(),
        severity: rule.metadata.severity,
        title: rule.metadata.title.clone(),
        message: outcome.message,
        range: outcome.range,
    }
}

fn unknown(rule: &Rule, message: String) -> ScanResult {
    ScanResult {
        status: Status::Unknown,
        rule_long_id: rule.long_id.clone(),
        rule_short_id: rule.short_id.clone(),
        avd_id: rule.metadata.avd_id.clone(),
        severity: rule.metadata.severity,
        title: rule.metadata.title.clone(),
        message,
        range: Range::default(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn compare_results(a: &ScanResult, b: &ScanResult) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) rule long id
    // 2) range (file, start line, end line)
    // 3) status
    // 4) message
    a.rule_long_id
        .cmp(&b.rule_long_id)
        .then_with(|| a.range.cmp(&b.range))
        .then(a.status.cmp(&b.status))
        .then_with(|| a.message.cmp(&b.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks;
    use crate::rule::{InputSelector, ModuleRef, RuleMetadata};
    use crate::runtime::{DeclarativeFinding, QueryError};
    use crate::test_support::{
        cluster_with_at_rest, cluster_with_defaults, msk_state, registry_with, rule_meta,
    };
    use iacguard_types::{DocPath, ids};
    use std::cell::RefCell;

    fn serial() -> EffectiveConfig {
        EffectiveConfig {
            parallel: false,
            ..EffectiveConfig::default()
        }
    }

    fn at_rest_results(report: &DomainReport) -> Vec<&ScanResult> {
        report
            .results
            .iter()
            .filter(|r| r.rule_long_id() == ids::LONG_AWS_MSK_AT_REST_ENCRYPTION)
            .collect()
    }

    #[test]
    fn encrypted_cluster_yields_no_failure() {
        let registry = registry_with(vec![checks::msk_at_rest_encryption::rule()]);
        let state = msk_state(vec![cluster_with_at_rest(true, 10)]);

        let report = evaluate(&state, &registry, None, &serial());

        let results = at_rest_results(&report);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status(), Status::Passed);
    }

    #[test]
    fn default_cluster_fails_once_attributed_to_cluster() {
        let registry = registry_with(vec![checks::msk_at_rest_encryption::rule()]);
        let state = msk_state(vec![cluster_with_defaults(42)]);

        let report = evaluate(&state, &registry, None, &serial());

        let results = at_rest_results(&report);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status(), Status::Failed);
        assert_eq!(results[0].range().start_line, 42);
        assert_eq!(results[0].range().filepath, "msk.tf");
    }

    #[test]
    fn no_clusters_yields_no_results() {
        let registry = registry_with(vec![checks::msk_at_rest_encryption::rule()]);
        let report = evaluate(&State::default(), &registry, None, &serial());
        assert!(at_rest_results(&report).is_empty());
        assert_eq!(report.data.rules_evaluated, 1);
    }

    #[test]
    fn mixed_clusters_fail_independently() {
        let registry = registry_with(vec![checks::msk_at_rest_encryption::rule()]);
        let state = msk_state(vec![
            cluster_with_defaults(1),
            cluster_with_at_rest(true, 20),
            cluster_with_at_rest(false, 40),
        ]);

        for cfg in [serial(), EffectiveConfig::default()] {
            let report = evaluate(&state, &registry, None, &cfg);
            let results = at_rest_results(&report);
            let failed = results
                .iter()
                .filter(|r| r.status() == Status::Failed)
                .count();
            let passed = results
                .iter()
                .filter(|r| r.status() == Status::Passed)
                .count();
            assert_eq!((failed, passed), (2, 1));
        }
    }

    fn panicking_check(_state: &State, _out: &mut Outcomes) {
        panic!("boom");
    }

    #[test]
    fn panicking_rule_becomes_unknown_without_aborting_scan() {
        let registry = registry_with(vec![
            Rule::native(
                rule_meta("AVD-T-0001", "explodes", "explodes"),
                panicking_check,
            ),
            checks::msk_at_rest_encryption::rule(),
        ]);
        let state = msk_state(vec![cluster_with_defaults(1)]);

        let report = evaluate(&state, &registry, None, &serial());

        let broken: Vec<_> = report
            .results
            .iter()
            .filter(|r| r.rule_long_id() == "test-svc-explodes")
            .collect();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].status(), Status::Unknown);
        assert!(broken[0].message.contains("boom"));
        assert_eq!(at_rest_results(&report).len(), 1);
    }

    struct StubRuntime {
        findings: Vec<DeclarativeFinding>,
        fail: bool,
        calls: RefCell<u32>,
    }

    impl PolicyRuntime for StubRuntime {
        fn query(
            &self,
            module: &ModuleRef,
            input: &serde_json::Value,
        ) -> Result<Vec<DeclarativeFinding>, QueryError> {
            *self.calls.borrow_mut() += 1;
            assert!(input.get("aws").is_some());
            if self.fail {
                return Err(QueryError {
                    package: module.package.clone(),
                    message: "eval error".to_string(),
                });
            }
            Ok(self.findings.clone())
        }
    }

    fn declarative_rule(selectors: Vec<InputSelector>) -> Rule {
        let meta = RuleMetadata {
            selectors,
            ..rule_meta("AVD-T-0100", "rego", "rego rule")
        };
        Rule::declarative(
            meta,
            ModuleRef {
                path: DocPath::new("policies/test/rego.rego"),
                package: "builtin.test.rego".to_string(),
            },
        )
    }

    fn msk_selector() -> Vec<InputSelector> {
        vec![InputSelector {
            provider: "aws".to_string(),
            service: "msk".to_string(),
        }]
    }

    #[test]
    fn declarative_findings_map_to_failed_results() {
        let registry = registry_with(vec![declarative_rule(msk_selector())]);
        let runtime = StubRuntime {
            findings: vec![
                DeclarativeFinding {
                    message: "first".to_string(),
                    range: Range::new("msk.tf", 5, 9),
                },
                DeclarativeFinding {
                    message: "second".to_string(),
                    range: Range::new("msk.tf", 1, 2),
                },
            ],
            fail: false,
            calls: RefCell::new(0),
        };
        let state = msk_state(vec![cluster_with_defaults(1)]);

        let report = evaluate(&state, &registry, Some(&runtime), &serial());

        assert_eq!(report.results.len(), 2);
        assert!(report.results.iter().all(|r| r.status() == Status::Failed));
        // Sorted by range.
        assert_eq!(report.results[0].message, "second");
    }

    #[test]
    fn declarative_without_findings_passes_once() {
        let registry = registry_with(vec![declarative_rule(Vec::new())]);
        let runtime = StubRuntime {
            findings: Vec::new(),
            fail: false,
            calls: RefCell::new(0),
        };

        let report = evaluate(&State::default(), &registry, Some(&runtime), &serial());

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].status(), Status::Passed);
    }

    #[test]
    fn declarative_selector_absent_skips_query() {
        let registry = registry_with(vec![declarative_rule(msk_selector())]);
        let runtime = StubRuntime {
            findings: Vec::new(),
            fail: false,
            calls: RefCell::new(0),
        };

        let report = evaluate(&State::default(), &registry, Some(&runtime), &serial());

        assert!(report.results.is_empty());
        assert_eq!(*runtime.calls.borrow(), 0);
    }

    #[test]
    fn declarative_query_error_and_missing_runtime_are_unknown() {
        let registry = registry_with(vec![declarative_rule(Vec::new())]);
        let runtime = StubRuntime {
            findings: Vec::new(),
            fail: true,
            calls: RefCell::new(0),
        };

        let report = evaluate(&State::default(), &registry, Some(&runtime), &serial());
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].status(), Status::Unknown);
        assert!(report.results[0].message.contains("eval error"));

        let report = evaluate(&State::default(), &registry, None, &serial());
        assert_eq!(report.results[0].status(), Status::Unknown);
    }

    struct PanickingRuntime;

    impl PolicyRuntime for PanickingRuntime {
        fn query(
            &self,
            _module: &ModuleRef,
            _input: &serde_json::Value,
        ) -> Result<Vec<DeclarativeFinding>, QueryError> {
            panic!("interpreter exploded");
        }
    }

    #[test]
    fn panicking_query_becomes_unknown_without_aborting_scan() {
        let registry = registry_with(vec![
            declarative_rule(msk_selector()),
            checks::msk_at_rest_encryption::rule(),
        ]);
        let state = msk_state(vec![cluster_with_defaults(1)]);

        let report = evaluate(&state, &registry, Some(&PanickingRuntime), &serial());

        let broken: Vec<_> = report
            .results
            .iter()
            .filter(|r| r.rule_long_id() == "test-svc-rego")
            .collect();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].status(), Status::Unknown);
        assert!(broken[0].message.contains("interpreter exploded"));
        assert_eq!(at_rest_results(&report).len(), 1);
    }

    #[test]
    fn default_config_keeps_every_rule_on_large_snapshots() {
        let mut registry = crate::Registry::new();
        checks::register_native(&mut registry).expect("register native");
        let state = msk_state((0..1001).map(|i| cluster_with_defaults(i * 10 + 1)).collect());

        let report = evaluate(&state, &registry, None, &EffectiveConfig::default());

        assert_eq!(report.data.truncated_reason, None);
        assert_eq!(report.data.results_emitted, report.data.results_total);
        assert_eq!(
            report
                .results
                .iter()
                .filter(|r| r.rule_long_id() == ids::LONG_AWS_MSK_IN_TRANSIT_ENCRYPTION)
                .count(),
            1001
        );
        assert_eq!(at_rest_results(&report).len(), 1001);
    }

    #[test]
    fn ignored_rules_keep_passes_and_downgrade_failures() {
        let registry = registry_with(vec![checks::msk_at_rest_encryption::rule()]);
        let state = msk_state(vec![cluster_with_defaults(1), cluster_with_at_rest(true, 9)]);
        let cfg = EffectiveConfig {
            parallel: false,
            ignore: vec![ids::AVD_AWS_MSK_AT_REST_ENCRYPTION.to_string()],
            ..EffectiveConfig::default()
        };

        let report = evaluate(&state, &registry, None, &cfg);

        let statuses: Vec<Status> = report.results.iter().map(|r| r.status()).collect();
        assert_eq!(statuses, vec![Status::Ignored, Status::Passed]);
        assert_eq!(report.data.counts.ignored, 1);
        assert!(!report.has_failures());
    }

    #[test]
    fn disabled_rules_are_not_evaluated() {
        let registry = registry_with(vec![checks::msk_at_rest_encryption::rule()]);
        let state = msk_state(vec![cluster_with_defaults(1)]);
        let cfg = EffectiveConfig {
            disable: vec!["aws-msk-*".to_string()],
            ..serial()
        };

        let report = evaluate(&state, &registry, None, &cfg);

        assert!(report.results.is_empty());
        assert_eq!(report.data.rules_evaluated, 0);
        assert_eq!(report.data.rules_registered, 1);
    }

    #[test]
    fn results_truncate_with_reason() {
        let registry = registry_with(vec![checks::msk_at_rest_encryption::rule()]);
        let state = msk_state((0..5).map(cluster_with_defaults).collect());
        let cfg = EffectiveConfig {
            max_results: Some(2),
            ..serial()
        };

        let report = evaluate(&state, &registry, None, &cfg);

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.data.results_total, 5);
        assert_eq!(report.data.results_emitted, 2);
        assert!(report.data.truncated_reason.is_some());
    }
}

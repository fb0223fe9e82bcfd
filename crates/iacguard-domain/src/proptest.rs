//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Registry id uniqueness
//! - Evaluation determinism and parallel/serial agreement
//! - One result per cluster for the cluster-scoped rules

use crate::checks;
use crate::engine::evaluate;
use crate::policy::EffectiveConfig;
use crate::registry::{Registry, RegistryError};
use crate::state::aws::MskCluster;
use crate::test_support::{
    cluster_with_at_rest, cluster_with_defaults, msk_state, native_rule, rule_meta,
};
use iacguard_types::{Status, ids};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ============================================================================
// Strategies
// ============================================================================

fn arb_short_code() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,8}").unwrap()
}

/// `None` is a cluster with default encryption settings, `Some(b)` sets `enabled = b`.
fn arb_clusters() -> impl Strategy<Value = Vec<MskCluster>> {
    prop::collection::vec(prop::option::of(any::<bool>()), 0..12).prop_map(|settings| {
        settings
            .into_iter()
            .enumerate()
            .map(|(i, setting)| {
                let line = (i as u32) * 10 + 1;
                match setting {
                    None => cluster_with_defaults(line),
                    Some(enabled) => cluster_with_at_rest(enabled, line),
                }
            })
            .collect()
    })
}

fn full_registry() -> Registry {
    let mut registry = Registry::new();
    checks::register_native(&mut registry).expect("register native");
    registry
}

proptest! {
    #[test]
    fn registry_never_holds_duplicate_ids(codes in prop::collection::vec(arb_short_code(), 0..20)) {
        let mut registry = Registry::new();
        let mut seen = BTreeSet::new();

        for (i, code) in codes.iter().enumerate() {
            let rule = native_rule(rule_meta(&format!("AVD-T-{i:04}"), code, code));
            let outcome = registry.register(rule);
            if seen.insert(code.clone()) {
                prop_assert!(outcome.is_ok());
            } else {
                let is_duplicate = matches!(outcome, Err(RegistryError::Duplicate { .. }));
                prop_assert!(is_duplicate);
            }
        }

        prop_assert_eq!(registry.len(), seen.len());
        let ids: BTreeSet<&str> = registry.long_ids().collect();
        prop_assert_eq!(ids.len(), registry.len());
    }

    #[test]
    fn evaluation_is_deterministic_and_parallel_agrees(clusters in arb_clusters()) {
        let registry = full_registry();
        let state = msk_state(clusters);

        let serial = EffectiveConfig { parallel: false, ..EffectiveConfig::default() };
        let parallel = EffectiveConfig::default();

        let first = evaluate(&state, &registry, None, &serial);
        let second = evaluate(&state, &registry, None, &serial);
        let third = evaluate(&state, &registry, None, &parallel);

        prop_assert_eq!(&first.results, &second.results);
        prop_assert_eq!(&first.results, &third.results);
    }

    #[test]
    fn at_rest_rule_reports_once_per_cluster(clusters in arb_clusters()) {
        let expected_failed = clusters
            .iter()
            .filter(|c| !c.encryption_at_rest.enabled.value)
            .count();
        let total = clusters.len();

        let registry = full_registry();
        let report = evaluate(&msk_state(clusters), &registry, None, &EffectiveConfig::default());

        let results: Vec<_> = report
            .results
            .iter()
            .filter(|r| r.rule_long_id == ids::LONG_AWS_MSK_AT_REST_ENCRYPTION)
            .collect();
        prop_assert_eq!(results.len(), total);
        prop_assert_eq!(
            results.iter().filter(|r| r.status == Status::Failed).count(),
            expected_failed
        );
    }
}

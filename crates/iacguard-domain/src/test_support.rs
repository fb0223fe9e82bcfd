use crate::outcome::Outcomes;
use crate::registry::Registry;
use crate::rule::{Rule, RuleMetadata};
use crate::state::aws::{Bucket, EncryptionAtRest, MskCluster};
use crate::state::{BoolValue, Metadata, State, StringValue};
use iacguard_types::{Range, Severity};

pub fn meta(file: &str, line: u32) -> Metadata {
    Metadata::new(Range::new(file, line, line))
}

pub fn rule_meta(avd_id: &str, short_code: &str, title: &str) -> RuleMetadata {
    RuleMetadata {
        avd_id: avd_id.to_string(),
        provider: "test".to_string(),
        service: "svc".to_string(),
        short_code: short_code.to_string(),
        title: title.to_string(),
        severity: Severity::Medium,
        ..RuleMetadata::default()
    }
}

fn noop(_state: &State, _out: &mut Outcomes) {}

pub fn native_rule(metadata: RuleMetadata) -> Rule {
    Rule::native(metadata, noop)
}

pub fn registry_with(rules: Vec<Rule>) -> Registry {
    let mut registry = Registry::new();
    for rule in rules {
        registry.register(rule).expect("register test rule");
    }
    registry
}

/// A cluster the configuration declares without any encryption block.
pub fn cluster_with_defaults(line: u32) -> MskCluster {
    MskCluster {
        metadata: meta("msk.tf", line),
        ..MskCluster::default()
    }
}

pub fn cluster_with_at_rest(enabled: bool, line: u32) -> MskCluster {
    MskCluster {
        metadata: meta("msk.tf", line),
        encryption_at_rest: EncryptionAtRest {
            metadata: meta("msk.tf", line + 1),
            kms_key_arn: StringValue::new("foo-bar-key", meta("msk.tf", line + 2)),
            enabled: BoolValue::new(enabled, meta("msk.tf", line + 3)),
        },
        ..MskCluster::default()
    }
}

pub fn msk_state(clusters: Vec<MskCluster>) -> State {
    let mut state = State::default();
    state.aws.msk.clusters = clusters;
    state
}

pub fn bucket(line: u32) -> Bucket {
    Bucket {
        metadata: meta("s3.tf", line),
        name: StringValue::new(format!("bucket-{line}"), meta("s3.tf", line + 1)),
        ..Bucket::default()
    }
}

pub fn s3_state(buckets: Vec<Bucket>) -> State {
    let mut state = State::default();
    state.aws.s3.buckets = buckets;
    state
}

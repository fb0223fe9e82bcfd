use crate::outcome::Outcomes;
use crate::rule::{Rule, RuleMetadata};
use crate::state::State;
use iacguard_types::{Severity, ids};

pub fn rule() -> Rule {
    Rule::native(
        RuleMetadata {
            avd_id: ids::AVD_AWS_MSK_AT_REST_ENCRYPTION.to_string(),
            provider: ids::PROVIDER_AWS.to_string(),
            service: ids::SERVICE_MSK.to_string(),
            short_code: "enable-at-rest-encryption".to_string(),
            title: "A MSK cluster allows unencrypted data at rest.".to_string(),
            description: "Encryption should be forced for Kafka clusters, including at rest. \
                          This ensures sensitive data is kept private."
                .to_string(),
            severity: Severity::High,
            resolution: "Enable at rest encryption".to_string(),
            links: vec![
                "https://docs.aws.amazon.com/msk/latest/developerguide/msk-encryption.html"
                    .to_string(),
            ],
            selectors: Vec::new(),
        },
        check,
    )
}

/// Clusters without an explicit at-rest configuration are treated as unencrypted.
fn check(state: &State, out: &mut Outcomes) {
    for cluster in &state.aws.msk.clusters {
        let at_rest = &cluster.encryption_at_rest;
        if at_rest.enabled.is_false() {
            let parent = at_rest.metadata.or_parent(&cluster.metadata);
            out.add(
                "The cluster is not encrypted at rest.",
                at_rest.enabled.metadata.or_parent(parent),
            );
        } else {
            out.add_passed(&cluster.metadata);
        }
    }
}

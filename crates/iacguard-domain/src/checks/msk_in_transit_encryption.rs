use crate::outcome::Outcomes;
use crate::rule::{Rule, RuleMetadata};
use crate::state::State;
use crate::state::aws::{
    CLIENT_BROKER_PLAINTEXT, CLIENT_BROKER_TLS, CLIENT_BROKER_TLS_PLAINTEXT,
};
use iacguard_types::{Severity, ids};

pub fn rule() -> Rule {
    Rule::native(
        RuleMetadata {
            avd_id: ids::AVD_AWS_MSK_IN_TRANSIT_ENCRYPTION.to_string(),
            provider: ids::PROVIDER_AWS.to_string(),
            service: ids::SERVICE_MSK.to_string(),
            short_code: "enable-in-transit-encryption".to_string(),
            title: "A MSK cluster allows unencrypted data in transit.".to_string(),
            description: "Encryption should be forced for Kafka clusters, including for \
                          communication between nodes."
                .to_string(),
            severity: Severity::High,
            resolution: "Enable in transit encryption".to_string(),
            links: vec![
                "https://docs.aws.amazon.com/msk/latest/developerguide/msk-encryption.html"
                    .to_string(),
            ],
            selectors: Vec::new(),
        },
        check,
    )
}

fn check(state: &State, out: &mut Outcomes) {
    for cluster in &state.aws.msk.clusters {
        let client_broker = &cluster.encryption_in_transit.client_broker;
        let at = client_broker.metadata.or_parent(&cluster.metadata);

        // Unset means the platform default, which is TLS only.
        if client_broker.is_empty() || client_broker.equals_any(&[CLIENT_BROKER_TLS]) {
            out.add_passed(&cluster.metadata);
        } else if client_broker.equals_any(&[CLIENT_BROKER_PLAINTEXT, CLIENT_BROKER_TLS_PLAINTEXT]) {
            out.add("The cluster allows plaintext communication.", at);
        } else {
            out.add_unknown(
                format!(
                    "Unrecognised client-broker setting: {}",
                    client_broker.value
                ),
                at,
            );
        }
    }
}

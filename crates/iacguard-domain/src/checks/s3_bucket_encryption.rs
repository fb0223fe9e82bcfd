use crate::outcome::Outcomes;
use crate::rule::{Rule, RuleMetadata};
use crate::state::State;
use iacguard_types::{Severity, ids};

pub fn rule() -> Rule {
    Rule::native(
        RuleMetadata {
            avd_id: ids::AVD_AWS_S3_BUCKET_ENCRYPTION.to_string(),
            provider: ids::PROVIDER_AWS.to_string(),
            service: ids::SERVICE_S3.to_string(),
            short_code: "enable-bucket-encryption".to_string(),
            title: "Unencrypted S3 bucket.".to_string(),
            description: "S3 buckets should be encrypted to protect the data that is stored \
                          within them if access is compromised."
                .to_string(),
            severity: Severity::High,
            resolution: "Configure bucket encryption".to_string(),
            links: vec![
                "https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucket-encryption.html"
                    .to_string(),
            ],
            selectors: Vec::new(),
        },
        check,
    )
}

fn check(state: &State, out: &mut Outcomes) {
    for bucket in &state.aws.s3.buckets {
        let encryption = &bucket.encryption;
        if encryption.enabled.is_false() {
            let parent = encryption.metadata.or_parent(&bucket.metadata);
            out.add(
                "Bucket does not have encryption enabled",
                encryption.enabled.metadata.or_parent(parent),
            );
        } else {
            out.add_passed(&bucket.metadata);
        }
    }
}

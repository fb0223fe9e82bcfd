use crate::outcome::Outcomes;
use crate::rule::{Rule, RuleMetadata};
use crate::state::State;
use iacguard_types::{Severity, ids};

pub fn rule() -> Rule {
    Rule::native(
        RuleMetadata {
            avd_id: ids::AVD_AWS_S3_VERSIONING.to_string(),
            provider: ids::PROVIDER_AWS.to_string(),
            service: ids::SERVICE_S3.to_string(),
            short_code: "enable-versioning".to_string(),
            title: "S3 Data should be versioned".to_string(),
            description: "Versioning in Amazon S3 is a means of keeping multiple variants of \
                          an object in the same bucket, so objects can be recovered from \
                          unintended user actions and application failures."
                .to_string(),
            severity: Severity::Medium,
            resolution: "Enable versioning to protect against accidental/malicious removal or \
                         modification"
                .to_string(),
            links: vec![
                "https://docs.aws.amazon.com/AmazonS3/latest/userguide/Versioning.html"
                    .to_string(),
            ],
            selectors: Vec::new(),
        },
        check,
    )
}

fn check(state: &State, out: &mut Outcomes) {
    for bucket in &state.aws.s3.buckets {
        let versioning = &bucket.versioning;
        if versioning.enabled.is_false() {
            let parent = versioning.metadata.or_parent(&bucket.metadata);
            out.add(
                "Bucket does not have versioning enabled",
                versioning.enabled.metadata.or_parent(parent),
            );
        } else {
            out.add_passed(&bucket.metadata);
        }
    }
}

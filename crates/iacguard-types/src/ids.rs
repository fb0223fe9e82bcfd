//! Stable identifiers for natively implemented rules.
//!
//! `AVD_*` constants are the rule identifiers carried in metadata. `LONG_*` constants are the
//! registry keys (`provider-service-short_code`).

// aws.msk
pub const AVD_AWS_MSK_AT_REST_ENCRYPTION: &str = "AVD-AWS-0179";
pub const LONG_AWS_MSK_AT_REST_ENCRYPTION: &str = "aws-msk-enable-at-rest-encryption";

pub const AVD_AWS_MSK_IN_TRANSIT_ENCRYPTION: &str = "AVD-AWS-0073";
pub const LONG_AWS_MSK_IN_TRANSIT_ENCRYPTION: &str = "aws-msk-enable-in-transit-encryption";

// aws.s3
pub const AVD_AWS_S3_BUCKET_ENCRYPTION: &str = "AVD-AWS-0088";
pub const LONG_AWS_S3_BUCKET_ENCRYPTION: &str = "aws-s3-enable-bucket-encryption";

pub const AVD_AWS_S3_VERSIONING: &str = "AVD-AWS-0090";
pub const LONG_AWS_S3_VERSIONING: &str = "aws-s3-enable-versioning";

// Providers / services
pub const PROVIDER_AWS: &str = "aws";
pub const SERVICE_MSK: &str = "msk";
pub const SERVICE_S3: &str = "s3";

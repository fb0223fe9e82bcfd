use super::{BoolValue, Metadata, StringValue};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aws {
    pub msk: Msk,
    pub s3: S3,
}

// ---------------------------------------------------------------------------
// MSK
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Msk {
    pub clusters: Vec<MskCluster>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MskCluster {
    #[serde(rename = "__metadata")]
    pub metadata: Metadata,
    pub encryption_in_transit: EncryptionInTransit,
    pub encryption_at_rest: EncryptionAtRest,
    pub logging: MskLogging,
}

/// Client-broker transport settings. An empty `client_broker` means the platform default (TLS).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionInTransit {
    #[serde(rename = "__metadata")]
    pub metadata: Metadata,
    pub client_broker: StringValue,
}

pub const CLIENT_BROKER_PLAINTEXT: &str = "PLAINTEXT";
pub const CLIENT_BROKER_TLS_PLAINTEXT: &str = "TLS_PLAINTEXT";
pub const CLIENT_BROKER_TLS: &str = "TLS";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionAtRest {
    #[serde(rename = "__metadata")]
    pub metadata: Metadata,
    pub kms_key_arn: StringValue,
    pub enabled: BoolValue,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MskLogging {
    #[serde(rename = "__metadata")]
    pub metadata: Metadata,
    pub broker: BrokerLogging,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerLogging {
    #[serde(rename = "__metadata")]
    pub metadata: Metadata,
    pub s3: LogDestination,
    pub cloudwatch: LogDestination,
    pub firehose: LogDestination,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogDestination {
    #[serde(rename = "__metadata")]
    pub metadata: Metadata,
    pub enabled: BoolValue,
}

// ---------------------------------------------------------------------------
// S3
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3 {
    pub buckets: Vec<Bucket>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bucket {
    #[serde(rename = "__metadata")]
    pub metadata: Metadata,
    pub name: StringValue,
    pub encryption: BucketEncryption,
    pub versioning: Versioning,
    /// `None` when no public access block is attached to the bucket.
    pub public_access_block: Option<PublicAccessBlock>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketEncryption {
    #[serde(rename = "__metadata")]
    pub metadata: Metadata,
    pub enabled: BoolValue,
    pub algorithm: StringValue,
    pub kms_key_id: StringValue,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Versioning {
    #[serde(rename = "__metadata")]
    pub metadata: Metadata,
    pub enabled: BoolValue,
    pub mfa_delete: BoolValue,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicAccessBlock {
    #[serde(rename = "__metadata")]
    pub metadata: Metadata,
    pub block_public_acls: BoolValue,
    pub block_public_policy: BoolValue,
    pub ignore_public_acls: BoolValue,
    pub restrict_public_buckets: BoolValue,
}

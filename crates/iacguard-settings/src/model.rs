use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Schema identifier accepted in the `schema` field.
pub const CONFIG_SCHEMA_V1: &str = "iacguard.config.v1";

/// `iacguard.toml` schema v1.
///
/// User-facing and permissive: every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IacguardConfigV1 {
    /// Optional schema string for tooling (`iacguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Evaluate native rules in parallel (default `true`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,

    /// How many results to emit before truncating the list. Unset emits every result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,

    /// Rules below this severity are not evaluated: `low`, `medium`, `high`, `critical`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_severity: Option<String>,

    /// Extra policy trees loaded from disk in addition to the bundled content.
    #[serde(default)]
    pub policy_dirs: Vec<String>,

    #[serde(default)]
    pub rules: RulesConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RulesConfig {
    /// Glob patterns over rule ids; failed results become `ignored`.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Glob patterns over rule ids; matching rules are not evaluated.
    #[serde(default)]
    pub disable: Vec<String>,
}

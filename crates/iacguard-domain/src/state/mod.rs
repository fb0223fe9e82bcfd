//! In-memory snapshot of scanned infrastructure, organised by provider and service.
//!
//! The engine treats this as opaque data: native checks inspect the parts they care about and
//! declarative policies receive its JSON form as `input`.

pub mod aws;
mod values;

pub use values::{BoolValue, Metadata, StringValue};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    pub aws: aws::Aws,
}

impl State {
    /// JSON document handed to declarative policies as `input`.
    pub fn to_input(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Whether `input.<provider>.<service>` holds any resources.
///
/// A service is present when at least one of its collections is non-empty or one of its
/// singular fields is set; an all-default service is treated as absent.
pub fn service_present(input: &serde_json::Value, provider: &str, service: &str) -> bool {
    let Some(service) = input.get(provider).and_then(|p| p.get(service)) else {
        return false;
    };
    match service {
        serde_json::Value::Object(fields) => fields.values().any(|v| match v {
            serde_json::Value::Array(items) => !items.is_empty(),
            serde_json::Value::Null => false,
            serde_json::Value::Object(obj) => !obj.is_empty(),
            _ => true,
        }),
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Null => false,
        _ => true,
    }
}

use iacguard_types::Range;
use serde::{Deserialize, Serialize};

/// Source-location metadata attached to every resource and attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(flatten)]
    pub range: Range,
    /// Whether the resource is managed by the scanned configuration.
    pub managed: bool,
    /// Whether the value was set explicitly rather than defaulted.
    pub explicit: bool,
}

impl Metadata {
    pub fn new(range: Range) -> Self {
        Self {
            range,
            managed: true,
            explicit: true,
        }
    }

    /// Metadata for a value the scanned configuration never set.
    pub fn defaulted(range: Range) -> Self {
        Self {
            range,
            managed: true,
            explicit: false,
        }
    }

    /// `self` when it has a known location, `parent` otherwise.
    pub fn or_parent<'a>(&'a self, parent: &'a Metadata) -> &'a Metadata {
        if self.range.is_unknown() {
            parent
        } else {
            self
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoolValue {
    pub value: bool,
    #[serde(flatten)]
    pub metadata: Metadata,
}

impl BoolValue {
    pub fn new(value: bool, metadata: Metadata) -> Self {
        Self { value, metadata }
    }

    pub fn is_true(&self) -> bool {
        self.value
    }

    pub fn is_false(&self) -> bool {
        !self.value
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringValue {
    pub value: String,
    #[serde(flatten)]
    pub metadata: Metadata,
}

impl StringValue {
    pub fn new(value: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            value: value.into(),
            metadata,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn equals_any(&self, candidates: &[&str]) -> bool {
        candidates.iter().any(|c| self.value == *c)
    }
}

use crate::outcome::Outcomes;
use crate::state::State;
use iacguard_types::{DocPath, Severity};
use serde::Serialize;

/// A native check: inspects the snapshot and records zero or more outcomes.
pub type NativeCheckFn = fn(&State, &mut Outcomes);

/// Provider/service pair a rule needs in its input. Rules with selectors are skipped when none of
/// them is present in the snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct InputSelector {
    pub provider: String,
    pub service: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RuleMetadata {
    /// Rule identifier. Empty means "not a scannable rule".
    pub avd_id: String,
    pub provider: String,
    pub service: String,
    pub short_code: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub resolution: String,
    pub links: Vec<String>,
    pub selectors: Vec<InputSelector>,
}

impl RuleMetadata {
    /// Registry key: `provider-service-short_code`, or the identifier when any part is missing.
    pub fn long_id(&self) -> String {
        if self.provider.is_empty() || self.service.is_empty() || self.short_code.is_empty() {
            return self.avd_id.clone();
        }
        format!("{}-{}-{}", self.provider, self.service, self.short_code)
    }

    pub fn short_id(&self) -> String {
        if self.short_code.is_empty() {
            self.avd_id.clone()
        } else {
            self.short_code.clone()
        }
    }
}

/// Reference to a compiled declarative module.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleRef {
    pub path: DocPath,
    /// Rego package, without the `data.` prefix.
    pub package: String,
}

#[derive(Clone, Debug)]
pub enum Check {
    Native(NativeCheckFn),
    Declarative(ModuleRef),
}

impl Check {
    pub fn kind(&self) -> &'static str {
        match self {
            Check::Native(_) => "native",
            Check::Declarative(_) => "rego",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub long_id: String,
    pub short_id: String,
    pub metadata: RuleMetadata,
    pub check: Check,
}

impl Rule {
    pub fn native(metadata: RuleMetadata, check: NativeCheckFn) -> Self {
        Self::new(metadata, Check::Native(check))
    }

    pub fn declarative(metadata: RuleMetadata, module: ModuleRef) -> Self {
        Self::new(metadata, Check::Declarative(module))
    }

    fn new(metadata: RuleMetadata, check: Check) -> Self {
        Self {
            long_id: metadata.long_id(),
            short_id: metadata.short_id(),
            metadata,
            check,
        }
    }

    pub fn long_id(&self) -> &str {
        &self.long_id
    }

    /// Whether `id` names this rule by long id, short id, or identifier.
    pub fn identified_by(&self, id: &str) -> bool {
        self.long_id == id || self.short_id == id || self.metadata.avd_id.eq_ignore_ascii_case(id)
    }
}

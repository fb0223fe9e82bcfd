//! The `explain` use case: look up a registered rule's documentation.

use iacguard_domain::{Registry, Rule};
use iacguard_types::Severity;

/// Everything a user needs to understand one rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleExplanation {
    pub long_id: String,
    pub short_id: String,
    pub avd_id: String,
    pub kind: &'static str,
    pub provider: String,
    pub service: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub resolution: String,
    pub links: Vec<String>,
}

impl From<&Rule> for RuleExplanation {
    fn from(rule: &Rule) -> Self {
        let meta = &rule.metadata;
        Self {
            long_id: rule.long_id.clone(),
            short_id: rule.short_id.clone(),
            avd_id: meta.avd_id.clone(),
            kind: rule.check.kind(),
            provider: meta.provider.clone(),
            service: meta.service.clone(),
            severity: meta.severity,
            title: meta.title.clone(),
            description: meta.description.clone(),
            resolution: meta.resolution.clone(),
            links: meta.links.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(RuleExplanation),
    /// Unknown identifier; includes every registered long id.
    NotFound {
        identifier: String,
        available: Vec<String>,
    },
}

/// Look up a rule by long id, short id, or identifier.
pub fn run_explain(registry: &Registry, identifier: &str) -> ExplainOutput {
    match registry.find(identifier) {
        Some(rule) => ExplainOutput::Found(RuleExplanation::from(rule)),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available: registry.long_ids().map(str::to_string).collect(),
        },
    }
}

/// Format an explanation for terminal display.
pub fn format_explanation(exp: &RuleExplanation) -> String {
    let mut out = String::new();

    let heading = format!("{} ({})", exp.title, exp.avd_id);
    out.push_str(&heading);
    out.push('\n');
    out.push_str(&"=".repeat(heading.len()));
    out.push_str("\n\n");
    out.push_str(&format!("Rule:     {}\n", exp.long_id));
    out.push_str(&format!("Severity: {}\n", exp.severity));
    out.push_str(&format!("Kind:     {}\n", exp.kind));
    if !exp.provider.is_empty() {
        out.push_str(&format!("Service:  {}/{}\n", exp.provider, exp.service));
    }

    if !exp.description.is_empty() {
        out.push('\n');
        out.push_str(&exp.description);
        out.push('\n');
    }

    if !exp.resolution.is_empty() {
        out.push_str("\nResolution\n----------\n");
        out.push_str(&exp.resolution);
        out.push('\n');
    }

    if !exp.links.is_empty() {
        out.push_str("\nLinks\n-----\n");
        for link in &exp.links {
            out.push_str(&format!("  - {link}\n"));
        }
    }

    out
}

/// Format the "not found" error message for terminal display.
pub fn format_not_found(identifier: &str, available: &[String]) -> String {
    let mut out = String::new();

    out.push_str(&format!("Unknown rule: {identifier}\n\n"));
    out.push_str("Available rules:\n");
    for id in available {
        out.push_str(&format!("  - {id}\n"));
    }

    out
}

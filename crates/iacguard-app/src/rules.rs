use iacguard_domain::Registry;
use iacguard_types::Severity;

/// One line of `iacguard rules`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleSummary {
    pub long_id: String,
    pub avd_id: String,
    pub severity: Severity,
    pub kind: &'static str,
    pub title: String,
}

/// Registered rules in registry (long id) order.
pub fn list_rules(registry: &Registry) -> Vec<RuleSummary> {
    registry
        .all()
        .map(|rule| RuleSummary {
            long_id: rule.long_id.clone(),
            avd_id: rule.metadata.avd_id.clone(),
            severity: rule.metadata.severity,
            kind: rule.check.kind(),
            title: rule.metadata.title.clone(),
        })
        .collect()
}

pub fn format_rules(rules: &[RuleSummary]) -> String {
    let width = rules.iter().map(|r| r.long_id.len()).max().unwrap_or(0);
    let mut out = String::new();
    for r in rules {
        out.push_str(&format!(
            "{:<width$}  {:<13}  {:<8}  {:<6}  {}\n",
            r.long_id,
            r.avd_id,
            r.severity.as_str(),
            r.kind,
            r.title,
        ));
    }
    out
}

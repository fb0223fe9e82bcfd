use crate::rule::Rule;
use globset::{Glob, GlobSet, GlobSetBuilder};
use iacguard_types::Severity;

/// Scan-time policy resolved from configuration.
#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    /// Evaluate native rules on the rayon pool.
    pub parallel: bool,
    /// Cap on emitted results; `None` emits every result.
    pub max_results: Option<usize>,
    /// Rules below this severity are not evaluated.
    pub minimum_severity: Severity,
    /// Glob patterns; failed results of matching rules are reported as ignored.
    pub ignore: Vec<String>,
    /// Glob patterns; matching rules are not evaluated at all.
    pub disable: Vec<String>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_results: None,
            minimum_severity: Severity::Low,
            ignore: Vec::new(),
            disable: Vec::new(),
        }
    }
}

/// Compiled ignore/disable patterns matched against a rule's long id, short id, and identifier.
#[derive(Clone, Debug)]
pub struct RuleFilter {
    minimum_severity: Severity,
    ignore: Option<GlobSet>,
    disable: Option<GlobSet>,
}

impl RuleFilter {
    pub fn new(cfg: &EffectiveConfig) -> Self {
        Self {
            minimum_severity: cfg.minimum_severity,
            ignore: build_patterns(&cfg.ignore),
            disable: build_patterns(&cfg.disable),
        }
    }

    pub fn is_enabled(&self, rule: &Rule) -> bool {
        rule.metadata.severity >= self.minimum_severity && !matches(self.disable.as_ref(), rule)
    }

    pub fn is_ignored(&self, rule: &Rule) -> bool {
        matches(self.ignore.as_ref(), rule)
    }
}

fn build_patterns(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() {
        return None;
    }

    let mut builder = GlobSetBuilder::new();
    // Patterns are validated in iacguard-settings; anything that slipped through never matches.
    for glob in patterns.iter().filter_map(|p| Glob::new(p).ok()) {
        builder.add(glob);
    }
    builder.build().ok()
}

fn matches(set: Option<&GlobSet>, rule: &Rule) -> bool {
    let Some(set) = set else { return false };
    set.is_match(&rule.long_id)
        || set.is_match(&rule.short_id)
        || set.is_match(&rule.metadata.avd_id)
}

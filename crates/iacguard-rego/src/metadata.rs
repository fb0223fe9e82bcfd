//! Rule metadata for compiled modules.
//!
//! A package annotation wins. Modules without one fall back to the legacy
//! `__rego_metadata__` / `__rego_input__` documents evaluated from the package itself.

use crate::annotations::{Annotation, InputSection};
use crate::compiler::PolicySet;
use crate::loader::Module;
use iacguard_domain::{InputSelector, RuleMetadata};
use iacguard_types::{DocPath, Severity};
use serde::Deserialize;
use thiserror::Error;

const LEGACY_METADATA_RULE: &str = "__rego_metadata__";
const LEGACY_INPUT_RULE: &str = "__rego_input__";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("{path}: no rule metadata")]
    Missing { path: DocPath },

    #[error("{path}: malformed metadata: {reason}")]
    Malformed { path: DocPath, reason: String },

    #[error("{path}: metadata query failed: {reason}")]
    Query { path: DocPath, reason: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyMetadata {
    id: Option<String>,
    avd_id: Option<String>,
    title: Option<String>,
    short_code: Option<String>,
    severity: Option<String>,
    description: Option<String>,
    recommended_actions: Option<String>,
    url: Option<String>,
    provider: Option<String>,
    service: Option<String>,
}

/// Reads metadata for the modules of one [`PolicySet`].
#[derive(Debug)]
pub struct MetadataRetriever<'a> {
    set: &'a PolicySet,
}

impl<'a> MetadataRetriever<'a> {
    pub fn new(set: &'a PolicySet) -> Self {
        Self { set }
    }

    pub fn retrieve(&self, module: &Module) -> Result<RuleMetadata, MetadataError> {
        match module.annotation.as_deref() {
            Some(yaml) => from_annotation(&module.path, yaml),
            None => self.from_legacy(module),
        }
    }

    fn from_legacy(&self, module: &Module) -> Result<RuleMetadata, MetadataError> {
        if !module.source.contains(LEGACY_METADATA_RULE) {
            return Err(MetadataError::Missing {
                path: module.path.clone(),
            });
        }

        let raw = self
            .eval(module, LEGACY_METADATA_RULE)?
            .ok_or_else(|| MetadataError::Missing {
                path: module.path.clone(),
            })?;
        let legacy: LegacyMetadata =
            serde_json::from_value(raw).map_err(|e| malformed(&module.path, e))?;

        let input = if module.source.contains(LEGACY_INPUT_RULE) {
            match self.eval(module, LEGACY_INPUT_RULE)? {
                Some(raw) => serde_json::from_value(raw).map_err(|e| malformed(&module.path, e))?,
                None => InputSection::default(),
            }
        } else {
            InputSection::default()
        };

        let selectors = selectors_from(&input);
        let (provider, service) = owner(legacy.provider, legacy.service, &selectors);

        Ok(RuleMetadata {
            avd_id: legacy.avd_id.or(legacy.id).unwrap_or_default(),
            provider,
            service,
            short_code: legacy.short_code.unwrap_or_default(),
            title: legacy.title.unwrap_or_default(),
            description: legacy.description.unwrap_or_default(),
            severity: parse_severity(&module.path, legacy.severity.as_deref())?,
            resolution: legacy.recommended_actions.unwrap_or_default(),
            links: legacy.url.into_iter().collect(),
            selectors,
        })
    }

    /// `None` when the rule is undefined for an empty input.
    fn eval(&self, module: &Module, rule: &str) -> Result<Option<serde_json::Value>, MetadataError> {
        let query_failed = |reason: String| MetadataError::Query {
            path: module.path.clone(),
            reason,
        };

        let mut engine = self.set.engine.clone();
        engine.set_input(regorus::Value::new_object());
        let value = engine
            .eval_rule(format!("data.{}.{rule}", module.package))
            .map_err(|e| query_failed(e.to_string()))?;
        if value == regorus::Value::Undefined {
            return Ok(None);
        }
        serde_json::to_value(&value)
            .map(Some)
            .map_err(|e| query_failed(e.to_string()))
    }
}

fn from_annotation(path: &DocPath, yaml: &str) -> Result<RuleMetadata, MetadataError> {
    let annotation = Annotation::parse(yaml).map_err(|e| malformed(path, e))?;
    let custom = annotation.custom;

    let selectors = custom
        .input
        .as_ref()
        .map(selectors_from)
        .unwrap_or_default();
    let (provider, service) = owner(custom.provider, custom.service, &selectors);

    Ok(RuleMetadata {
        avd_id: custom.avd_id.or(custom.id).unwrap_or_default(),
        provider,
        service,
        short_code: custom.short_code.unwrap_or_default(),
        title: annotation.title.unwrap_or_default(),
        description: annotation.description.unwrap_or_default(),
        severity: parse_severity(path, custom.severity.as_deref())?,
        resolution: custom.recommended_action.unwrap_or_default(),
        links: annotation
            .related_resources
            .iter()
            .map(|r| r.url().to_string())
            .collect(),
        selectors,
    })
}

fn selectors_from(input: &InputSection) -> Vec<InputSelector> {
    let mut selectors: Vec<InputSelector> = input
        .selector
        .iter()
        .flat_map(|s| s.subtypes.iter())
        .filter(|sub| !sub.service.is_empty())
        .map(|sub| InputSelector {
            provider: sub.provider.clone(),
            service: sub.service.clone(),
        })
        .collect();
    selectors.sort();
    selectors.dedup();
    selectors
}

/// Explicit provider/service win; otherwise the first selector names the owner.
fn owner(
    provider: Option<String>,
    service: Option<String>,
    selectors: &[InputSelector],
) -> (String, String) {
    let first = selectors.first();
    (
        provider
            .or_else(|| first.map(|s| s.provider.clone()))
            .unwrap_or_default(),
        service
            .or_else(|| first.map(|s| s.service.clone()))
            .unwrap_or_default(),
    )
}

fn parse_severity(path: &DocPath, raw: Option<&str>) -> Result<Severity, MetadataError> {
    match raw {
        None => Ok(Severity::default()),
        Some(s) => s.parse().map_err(|e| malformed(path, e)),
    }
}

fn malformed(path: &DocPath, err: impl std::fmt::Display) -> MetadataError {
    MetadataError::Malformed {
        path: path.clone(),
        reason: err.to_string(),
    }
}

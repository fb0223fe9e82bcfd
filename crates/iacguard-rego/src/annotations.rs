//! `# METADATA` comment blocks and the `package` declaration.
//!
//! Only the block directly above the `package` line is the package annotation; blocks above
//! individual rules are ignored. The YAML is kept raw and parsed on demand so a malformed block
//! only affects the module it belongs to.

use serde::Deserialize;
use std::collections::BTreeMap;

const METADATA_MARKER: &str = "METADATA";

/// Package name declared by `source`, without the `data.` prefix.
pub(crate) fn package_name(source: &str) -> Option<String> {
    source.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("package")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let name = strip_trailing_comment(rest).trim();
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// Raw YAML of the package-scoped `# METADATA` block, if one precedes the package declaration.
pub(crate) fn package_annotation(source: &str) -> Option<String> {
    let mut block: Option<Vec<&str>> = None;

    for line in source.lines() {
        let trimmed = line.trim_start();

        if let Some(comment) = trimmed.strip_prefix('#') {
            if comment.trim() == METADATA_MARKER {
                block = Some(Vec::new());
            } else if let Some(lines) = block.as_mut() {
                lines.push(comment.strip_prefix(' ').unwrap_or(comment));
            }
            continue;
        }

        if trimmed.is_empty() {
            // A blank line detaches a pending block from whatever follows.
            block = None;
            continue;
        }

        if trimmed.starts_with("package") {
            return block.map(|lines| lines.join("\n"));
        }
        block = None;
    }
    None
}

fn strip_trailing_comment(s: &str) -> &str {
    match s.find('#') {
        Some(idx) => &s[..idx],
        None => s,
    }
}

/// Parsed package annotation. Unknown keys are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Annotation {
    pub title: Option<String>,
    pub description: Option<String>,
    pub related_resources: Vec<RelatedResource>,
    pub schemas: Vec<BTreeMap<String, String>>,
    pub custom: CustomFields,
}

impl Annotation {
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Schema references named under `schemas:` (values such as `schema.input`).
    pub fn schema_refs(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().flat_map(|m| m.values().map(String::as_str))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RelatedResource {
    Url(String),
    Ref {
        #[serde(rename = "ref")]
        reference: String,
    },
}

impl RelatedResource {
    pub fn url(&self) -> &str {
        match self {
            RelatedResource::Url(url) => url,
            RelatedResource::Ref { reference } => reference,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CustomFields {
    pub id: Option<String>,
    pub avd_id: Option<String>,
    pub provider: Option<String>,
    pub service: Option<String>,
    pub severity: Option<String>,
    pub short_code: Option<String>,
    pub recommended_action: Option<String>,
    pub input: Option<InputSection>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct InputSection {
    pub selector: Vec<SelectorEntry>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SelectorEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub subtypes: Vec<SubtypeEntry>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SubtypeEntry {
    pub provider: String,
    pub service: String,
}

use crate::model::{CONFIG_SCHEMA_V1, IacguardConfigV1};
use anyhow::Context;
use camino::Utf8PathBuf;
use globset::Glob;
use iacguard_domain::policy::EffectiveConfig;
use iacguard_types::Severity;

/// Command-line values layered over the file config.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub parallel: Option<bool>,
    pub max_results: Option<u32>,
    pub minimum_severity: Option<String>,
    /// Appended to the configured policy dirs.
    pub policy_dirs: Vec<String>,
    /// Appended to the configured ignore patterns.
    pub ignore: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
    pub policy_dirs: Vec<Utf8PathBuf>,
}

pub fn resolve_config(
    cfg: IacguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != CONFIG_SCHEMA_V1
    {
        anyhow::bail!("unsupported config schema: {schema} (expected {CONFIG_SCHEMA_V1})");
    }

    let mut effective = EffectiveConfig::default();

    if let Some(parallel) = overrides.parallel.or(cfg.parallel) {
        effective.parallel = parallel;
    }

    if let Some(max) = overrides.max_results.or(cfg.max_results) {
        effective.max_results = Some(max as usize);
    }

    if let Some(sev) = overrides
        .minimum_severity
        .as_deref()
        .or(cfg.minimum_severity.as_deref())
    {
        effective.minimum_severity = parse_severity(sev).context("invalid minimum_severity")?;
    }

    let mut ignore = cfg.rules.ignore;
    ignore.extend(overrides.ignore);
    validate_patterns("ignore", &ignore)?;
    effective.ignore = ignore;

    validate_patterns("disable", &cfg.rules.disable)?;
    effective.disable = cfg.rules.disable;

    let policy_dirs = cfg
        .policy_dirs
        .into_iter()
        .chain(overrides.policy_dirs)
        .map(Utf8PathBuf::from)
        .collect();

    Ok(ResolvedConfig {
        effective,
        policy_dirs,
    })
}

fn validate_patterns(field: &str, patterns: &[String]) -> anyhow::Result<()> {
    for pattern in patterns {
        Glob::new(pattern).with_context(|| format!("invalid {field} glob: {pattern}"))?;
    }
    Ok(())
}

fn parse_severity(v: &str) -> anyhow::Result<Severity> {
    Ok(v.parse::<Severity>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let resolved = resolve_config(IacguardConfigV1::default(), Overrides::default())
            .expect("resolve");
        assert!(resolved.effective.parallel);
        assert_eq!(resolved.effective.max_results, None);
        assert_eq!(resolved.effective.minimum_severity, Severity::Low);
        assert!(resolved.effective.ignore.is_empty());
        assert!(resolved.policy_dirs.is_empty());
    }

    #[test]
    fn file_values_apply_and_overrides_win() {
        let cfg = parse_config_toml(
            r#"
schema = "iacguard.config.v1"
parallel = false
max_results = 5
minimum_severity = "medium"
policy_dirs = ["custom"]

[rules]
ignore = ["AVD-AWS-0074"]
disable = ["aws-s3-*"]
"#,
        )
        .expect("parse");

        let overrides = Overrides {
            max_results: Some(10),
            minimum_severity: Some("HIGH".to_string()),
            policy_dirs: vec!["more".to_string()],
            ignore: vec!["enable-versioning".to_string()],
            ..Overrides::default()
        };
        let resolved = resolve_config(cfg, overrides).expect("resolve");

        assert!(!resolved.effective.parallel);
        assert_eq!(resolved.effective.max_results, Some(10));
        assert_eq!(resolved.effective.minimum_severity, Severity::High);
        assert_eq!(
            resolved.effective.ignore,
            vec!["AVD-AWS-0074".to_string(), "enable-versioning".to_string()]
        );
        assert_eq!(resolved.effective.disable, vec!["aws-s3-*".to_string()]);
        assert_eq!(
            resolved.policy_dirs,
            vec![Utf8PathBuf::from("custom"), Utf8PathBuf::from("more")]
        );
    }

    #[test]
    fn invalid_glob_is_rejected_with_context() {
        let cfg = IacguardConfigV1 {
            rules: crate::RulesConfig {
                disable: vec!["aws-[".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let err = resolve_config(cfg, Overrides::default()).expect_err("invalid glob");
        assert!(format!("{err:#}").contains("invalid disable glob: aws-["));
    }

    #[test]
    fn unknown_severity_and_schema_are_rejected() {
        let cfg = IacguardConfigV1 {
            minimum_severity: Some("urgent".to_string()),
            ..Default::default()
        };
        let err = resolve_config(cfg, Overrides::default()).expect_err("bad severity");
        assert!(format!("{err:#}").contains("urgent"));

        let cfg = IacguardConfigV1 {
            schema: Some("iacguard.config.v0".to_string()),
            ..Default::default()
        };
        assert!(resolve_config(cfg, Overrides::default()).is_err());
    }
}

use crate::compiler::{INPUT_SCHEMA_REF, PolicySet};
use iacguard_domain::{DeclarativeFinding, ModuleRef, PolicyRuntime, QueryError};
use iacguard_types::Range;
use serde_json::Value;

/// Rule every declarative check exposes its findings under.
pub(crate) const DENY_RULE: &str = "deny";

/// Key under which a finding carries the location of its cause.
const METADATA_KEY: &str = "__metadata";

impl PolicyRuntime for PolicySet {
    fn query(&self, module: &ModuleRef, input: &Value) -> Result<Vec<DeclarativeFinding>, QueryError> {
        let failed = |message: String| QueryError {
            package: module.package.clone(),
            message,
        };

        if !self.schemas.is_valid(INPUT_SCHEMA_REF, input) {
            return Err(failed(format!("input does not match {INPUT_SCHEMA_REF}")));
        }
        let input =
            regorus::Value::from_json_str(&input.to_string()).map_err(|e| failed(e.to_string()))?;

        let mut engine = self.engine.clone();
        engine.set_input(input);
        let value = engine
            .eval_rule(format!("data.{}.{DENY_RULE}", module.package))
            .map_err(|e| failed(e.to_string()))?;
        if value == regorus::Value::Undefined {
            return Ok(Vec::new());
        }

        let json = serde_json::to_value(&value).map_err(|e| failed(e.to_string()))?;
        match json {
            Value::Array(items) => Ok(items.iter().map(finding_from).collect()),
            Value::Null => Ok(Vec::new()),
            other => Err(failed(format!("{DENY_RULE} is not a set: {other}"))),
        }
    }
}

/// A finding is a bare message or an object with `msg` and a location.
fn finding_from(item: &Value) -> DeclarativeFinding {
    match item {
        Value::String(message) => DeclarativeFinding {
            message: message.clone(),
            range: Range::default(),
        },
        Value::Object(fields) => {
            let message = fields
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let range = match fields.get(METADATA_KEY) {
                Some(meta @ Value::Object(_)) => range_from(meta),
                _ => range_from(item),
            };
            DeclarativeFinding { message, range }
        }
        other => DeclarativeFinding {
            message: other.to_string(),
            range: Range::default(),
        },
    }
}

fn range_from(value: &Value) -> Range {
    let line = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    };
    Range {
        filepath: value
            .get("filepath")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        start_line: line("start_line"),
        end_line: line("end_line"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::loader::parse_module;
    use iacguard_types::DocPath;
    use serde_json::json;
    use std::collections::BTreeMap;

    const POLICY: &str = r#"package demo.buckets

import rego.v1

deny contains res if {
	some bucket in input.buckets
	not bucket.enabled
	res := {"msg": concat(" ", ["bucket", bucket.name, "disabled"]), "__metadata": bucket.__metadata}
}

deny contains "plain finding" if {
	input.flag == true
}
"#;

    fn compiled() -> (PolicySet, ModuleRef) {
        let path = DocPath::new("policies/buckets.rego");
        let module = parse_module(&path, POLICY.as_bytes().to_vec()).expect("parse");
        let module_ref = ModuleRef {
            path: path.clone(),
            package: module.package.clone(),
        };
        (compile(BTreeMap::from([(path, module)])).expect("compile"), module_ref)
    }

    #[test]
    fn findings_carry_message_and_location() {
        let (set, module) = compiled();
        let input = json!({
            "buckets": [
                {"name": "logs", "enabled": false,
                 "__metadata": {"filepath": "main.tf", "start_line": 4, "end_line": 9}},
                {"name": "data", "enabled": true, "__metadata": {}}
            ]
        });

        let findings = set.query(&module, &input).expect("query");
        assert_eq!(
            findings,
            vec![DeclarativeFinding {
                message: "bucket logs disabled".to_string(),
                range: Range::new("main.tf", 4, 9),
            }]
        );
    }

    #[test]
    fn plain_string_findings_have_no_location() {
        let (set, module) = compiled();
        let findings = set.query(&module, &json!({"flag": true})).expect("query");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "plain finding");
        assert!(findings[0].range.is_unknown());
    }

    #[test]
    fn no_findings_for_clean_input() {
        let (set, module) = compiled();
        assert!(set.query(&module, &json!({})).expect("query").is_empty());
    }

    #[test]
    fn scalar_causes_are_their_own_location() {
        let item = json!({"msg": "m", "__metadata": {"filepath": "a.tf", "start_line": 2, "end_line": 2}});
        assert_eq!(finding_from(&item).range, Range::new("a.tf", 2, 2));

        let bare = json!({"msg": "m", "filepath": "b.tf", "start_line": 7, "end_line": 8});
        assert_eq!(finding_from(&bare).range, Range::new("b.tf", 7, 8));

        assert_eq!(finding_from(&json!(42)).message, "42");
    }
}

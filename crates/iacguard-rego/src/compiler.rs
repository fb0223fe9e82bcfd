//! Compiles a module set into one queryable unit.

use crate::annotations::Annotation;
use crate::loader::Module;
use crate::references::check_references;
use iacguard_types::DocPath;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Reference under which the input document schema is registered.
pub const INPUT_SCHEMA_REF: &str = "schema.input";

/// The input schema: accepts any JSON document.
pub const ANYTHING_SCHEMA: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "description": "Input document for declarative rules. Any JSON value is accepted."
}"#;

/// One module-level compile failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleError {
    pub path: DocPath,
    pub reason: String,
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Every module error found in one compilation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("policy compilation failed with {} error(s):{}", .errors.len(), render(.errors))]
pub struct CompileError {
    pub errors: Vec<ModuleError>,
}

fn render(errors: &[ModuleError]) -> String {
    errors.iter().map(|e| format!("\n  {e}")).collect()
}

/// Named JSON Schemas that annotations may reference.
#[derive(Default)]
pub struct SchemaSet {
    schemas: BTreeMap<String, jsonschema::Validator>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `schema` under `reference`, replacing any previous entry.
    pub fn put(&mut self, reference: &str, schema: &serde_json::Value) -> Result<(), String> {
        let validator = jsonschema::draft7::new(schema).map_err(|e| e.to_string())?;
        self.schemas.insert(reference.to_string(), validator);
        Ok(())
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.schemas.contains_key(reference)
    }

    /// Unknown references validate nothing.
    pub fn is_valid(&self, reference: &str, instance: &serde_json::Value) -> bool {
        self.schemas
            .get(reference)
            .is_some_and(|v| v.is_valid(instance))
    }

    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

impl fmt::Debug for SchemaSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.references()).finish()
    }
}

fn input_schemas() -> Result<SchemaSet, String> {
    let schema: serde_json::Value =
        serde_json::from_str(ANYTHING_SCHEMA).map_err(|e| e.to_string())?;
    let mut schemas = SchemaSet::new();
    schemas.put(INPUT_SCHEMA_REF, &schema)?;
    Ok(schemas)
}

/// Compiled modules plus the interpreter that evaluates them.
///
/// The interpreter is cloned per query; the set itself is never mutated after [`compile`].
pub struct PolicySet {
    pub(crate) engine: regorus::Engine,
    pub(crate) schemas: SchemaSet,
    modules: BTreeMap<DocPath, Module>,
}

impl PolicySet {
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn module(&self, path: &DocPath) -> Option<&Module> {
        self.modules.get(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }
}

impl fmt::Debug for PolicySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicySet")
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .field("schemas", &self.schemas)
            .finish()
    }
}

/// Compiles `modules` as one unit, reporting every failing module rather than the first.
pub fn compile(modules: BTreeMap<DocPath, Module>) -> Result<PolicySet, CompileError> {
    let schemas = input_schemas().map_err(|reason| CompileError {
        errors: vec![ModuleError {
            path: DocPath::new(INPUT_SCHEMA_REF),
            reason,
        }],
    })?;

    let mut errors = Vec::new();
    let mut engine = regorus::Engine::new();

    for module in modules.values() {
        if let Err(e) = engine.add_policy(module.path.to_string(), module.source.clone()) {
            errors.push(ModuleError {
                path: module.path.clone(),
                reason: e.to_string(),
            });
            continue;
        }
        check_schema_refs(module, &schemas, &mut errors);
    }

    if errors.is_empty() {
        check_references(&modules, &mut errors);
    }
    if errors.is_empty() {
        resolve_packages(&engine, &modules, &mut errors);
    }

    if !errors.is_empty() {
        return Err(CompileError { errors });
    }

    debug!(modules = modules.len(), "compiled policy set");
    Ok(PolicySet {
        engine,
        schemas,
        modules,
    })
}

// Malformed annotations are reported by metadata retrieval, not here.
fn check_schema_refs(module: &Module, schemas: &SchemaSet, errors: &mut Vec<ModuleError>) {
    let Some(yaml) = module.annotation.as_deref() else {
        return;
    };
    let Ok(annotation) = Annotation::parse(yaml) else {
        return;
    };
    for reference in annotation.schema_refs() {
        if !schemas.contains(reference) {
            errors.push(ModuleError {
                path: module.path.clone(),
                reason: format!("unknown schema reference: {reference}"),
            });
        }
    }
}

// Evaluating each package with an empty input surfaces conflicting definitions.
fn resolve_packages(
    engine: &regorus::Engine,
    modules: &BTreeMap<DocPath, Module>,
    errors: &mut Vec<ModuleError>,
) {
    let mut probe = engine.clone();
    probe.set_input(regorus::Value::new_object());

    let mut seen = std::collections::BTreeSet::new();
    for module in modules.values() {
        if !seen.insert(module.package.as_str()) {
            continue;
        }
        if let Err(e) = probe.eval_query(format!("data.{}", module.package), false) {
            errors.push(ModuleError {
                path: module.path.clone(),
                reason: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_module;

    fn module(path: &str, source: &str) -> (DocPath, Module) {
        let path = DocPath::new(path);
        let module = parse_module(&path, source.as_bytes().to_vec()).expect("parse");
        (path, module)
    }

    #[test]
    fn anything_schema_accepts_all_inputs() {
        let schemas = input_schemas().expect("schemas");
        assert!(schemas.is_valid(INPUT_SCHEMA_REF, &serde_json::json!({"aws": {}})));
        assert!(schemas.is_valid(INPUT_SCHEMA_REF, &serde_json::json!([1, 2])));
        assert!(schemas.is_valid(INPUT_SCHEMA_REF, &serde_json::Value::Null));
        assert!(!schemas.is_valid("schema.other", &serde_json::json!({})));
    }

    #[test]
    fn compiles_modules_with_shared_libraries() {
        let modules = BTreeMap::from([
            module(
                "lib/util.rego",
                "package lib.util\n\nimport rego.v1\n\ntwice(x) := y if {\n\ty := x * 2\n}\n",
            ),
            module(
                "policies/p.rego",
                "package demo.p\n\nimport rego.v1\n\nvalue := data.lib.util.twice(2)\n",
            ),
        ]);

        let set = compile(modules).expect("compile");
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.module(&DocPath::new("policies/p.rego")).map(|m| m.package.as_str()),
            Some("demo.p")
        );
    }

    #[test]
    fn unresolved_library_calls_fail_compilation() {
        let guarded = "package demo.p\n\nimport rego.v1\n\nimport data.lib.util\n\ndeny contains msg if {\n\tsome x in input.items\n\tutil.twice(x) > 2\n\tmsg := \"big\"\n}\n\nwarn contains msg if {\n\tsome x in input.items\n\tdata.lib.util.thrice(x) > 2\n\tmsg := \"big\"\n}\n";
        let modules = BTreeMap::from([
            module(
                "lib/util.rego",
                "package lib.util\n\nimport rego.v1\n\ntwice(x) := x * 2\n",
            ),
            module("policies/p.rego", guarded),
        ]);

        let err = compile(modules).expect_err("should fail");
        let reasons: Vec<_> = err.errors.iter().map(|e| e.reason.as_str()).collect();
        assert_eq!(
            reasons,
            vec![
                "function util.twice is called through import alias util; call data.lib.util.twice instead",
                "unknown function: data.lib.util.thrice",
            ]
        );
        assert!(err.errors.iter().all(|e| e.path.as_str() == "policies/p.rego"));
    }

    #[test]
    fn unknown_schema_references_fail_each_module() {
        let annotated = |pkg: &str| {
            format!(
                "# METADATA\n# schemas:\n#   - input: schema.cloud\npackage {pkg}\n\nimport rego.v1\n\nallow if true\n"
            )
        };
        let modules = BTreeMap::from([
            module("a.rego", &annotated("demo.a")),
            module("b.rego", &annotated("demo.b")),
            module("c.rego", "package demo.c\n\nimport rego.v1\n\nallow if true\n"),
        ]);

        let err = compile(modules).expect_err("should fail");
        let paths: Vec<_> = err.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a.rego", "b.rego"]);
        assert!(err.errors[0].reason.contains("schema.cloud"));
        assert!(err.to_string().contains("2 error(s)"));
    }
}

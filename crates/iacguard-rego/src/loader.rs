//! Recursive discovery of Rego modules in a [`DocumentStore`].

use crate::annotations;
use crate::store::{DocumentStore, StoreError};
use iacguard_types::DocPath;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Directories whose path ends with this marker hold opt-in content and are never loaded.
pub const OPTIONAL_MARKER: &str = "policies/advanced/optional";

const POLICY_EXTENSION: &str = ".rego";
const TEST_SUFFIX: &str = "_test.rego";

/// A parsed Rego source document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    pub path: DocPath,
    /// Package name without the `data.` prefix.
    pub package: String,
    pub source: String,
    /// Raw YAML of the package annotation, when present.
    pub annotation: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{path}: document is not valid UTF-8")]
    Encoding { path: DocPath },

    #[error("{path}: parse error: {message}")]
    Parse { path: DocPath, message: String },
}

/// Policy documents end in `.rego` and are not self-test files.
pub fn is_policy_document(name: &str) -> bool {
    name.ends_with(POLICY_EXTENSION) && !name.ends_with(TEST_SUFFIX)
}

/// Loads every policy document under `dir`, keyed by path.
///
/// Any document that fails to parse aborts the whole load.
pub fn load_modules(
    store: &dyn DocumentStore,
    dir: &DocPath,
) -> Result<BTreeMap<DocPath, Module>, LoadError> {
    let mut modules = BTreeMap::new();
    walk(store, dir, &mut modules)?;
    Ok(modules)
}

fn walk(
    store: &dyn DocumentStore,
    dir: &DocPath,
    out: &mut BTreeMap<DocPath, Module>,
) -> Result<(), LoadError> {
    if dir.as_str().ends_with(OPTIONAL_MARKER) {
        debug!(dir = %dir, "skipping optional policy directory");
        return Ok(());
    }

    for entry in store.read_dir(dir)? {
        let path = dir.join(&entry.name);
        if entry.is_dir {
            walk(store, &path, out)?;
            continue;
        }
        if !is_policy_document(&entry.name) {
            continue;
        }
        let data = store.read_file(&path)?;
        let module = parse_module(&path, data)?;
        out.insert(path, module);
    }
    Ok(())
}

/// Parses one document, checking Rego syntax with a scratch interpreter.
pub fn parse_module(path: &DocPath, data: Vec<u8>) -> Result<Module, LoadError> {
    let source = String::from_utf8(data).map_err(|_| LoadError::Encoding { path: path.clone() })?;

    let mut engine = regorus::Engine::new();
    engine
        .add_policy(path.to_string(), source.clone())
        .map_err(|e| LoadError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;

    let package = annotations::package_name(&source).ok_or_else(|| LoadError::Parse {
        path: path.clone(),
        message: "missing package declaration".to_string(),
    })?;
    let annotation = annotations::package_annotation(&source);

    Ok(Module {
        path: path.clone(),
        package,
        source,
        annotation,
    })
}

/// Library modules join the policy set. A library replaces a policy stored under the same path.
pub fn merge_libraries(
    mut policies: BTreeMap<DocPath, Module>,
    libraries: BTreeMap<DocPath, Module>,
) -> BTreeMap<DocPath, Module> {
    for (path, module) in libraries {
        policies.insert(path, module);
    }
    policies
}

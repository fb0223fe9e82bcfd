//! Policy and library content compiled into the binary.

use crate::loader::{LoadError, Module, load_modules, merge_libraries};
use crate::store::EmbeddedStore;
use iacguard_types::DocPath;
use std::collections::BTreeMap;

macro_rules! bundled {
    ($($path:literal),* $(,)?) => {
        &[$(($path, include_str!(concat!("../bundle/", $path)))),*]
    };
}

/// Bundled policy tree. Self-tests and optional content ship here but are never loaded.
pub const POLICY_FILES: &[(&str, &str)] = bundled![
    "policies/advanced/optional/aws/s3/enable_mfa_delete.rego",
    "policies/aws/msk/enable_logging.rego",
    "policies/aws/msk/enable_logging_test.rego",
    "policies/aws/s3/block_public_acls.rego",
    "policies/aws/s3/block_public_policy.rego",
    "policies/aws/s3/public_access.rego",
];

/// Shared helper packages.
pub const LIBRARY_FILES: &[(&str, &str)] = bundled!["lib/result.rego", "lib/utils.rego"];

pub fn policy_store() -> EmbeddedStore {
    EmbeddedStore::new(POLICY_FILES)
}

pub fn library_store() -> EmbeddedStore {
    EmbeddedStore::new(LIBRARY_FILES)
}

/// Loads bundled policies and libraries as one merged module set.
pub fn load_bundled() -> Result<BTreeMap<DocPath, Module>, LoadError> {
    let root = DocPath::default();
    let policies = load_modules(&policy_store(), &root)?;
    let libraries = load_modules(&library_store(), &root)?;
    Ok(merge_libraries(policies, libraries))
}

use crate::compiler::PolicySet;
use crate::metadata::MetadataRetriever;
use iacguard_domain::{ModuleRef, Registry, RegistryError, Rule};
use tracing::debug;

/// Registers a declarative rule for every compiled module whose metadata carries an identifier.
///
/// Modules without usable metadata are helpers or broken content; they are skipped, not fatal.
/// Returns the number of rules added.
pub fn register_rules(set: &PolicySet, registry: &mut Registry) -> Result<usize, RegistryError> {
    let retriever = MetadataRetriever::new(set);
    let mut added = 0;

    for module in set.modules() {
        let metadata = match retriever.retrieve(module) {
            Ok(metadata) => metadata,
            Err(err) => {
                debug!(path = %module.path, error = %err, "skipping module without rule metadata");
                continue;
            }
        };
        if metadata.avd_id.is_empty() {
            debug!(path = %module.path, "skipping module without rule identifier");
            continue;
        }

        let rule = Rule::declarative(
            metadata,
            ModuleRef {
                path: module.path.clone(),
                package: module.package.clone(),
            },
        );
        let long_id = rule.long_id.clone();
        registry.register(rule)?;
        debug!(rule = %long_id, path = %module.path, "registered declarative rule");
        added += 1;
    }

    Ok(added)
}

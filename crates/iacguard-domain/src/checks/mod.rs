//! Natively implemented rules.
//!
//! There is no import-time registration: `catalog()` is the single list of native rules and
//! `register_native` is called once during startup.

use crate::registry::{Registry, RegistryError};
use crate::rule::Rule;

pub mod msk_at_rest_encryption;
pub mod msk_in_transit_encryption;
pub mod s3_bucket_encryption;
pub mod s3_versioning;


pub fn catalog() -> Vec<Rule> {
    vec![
        msk_at_rest_encryption::rule(),
        msk_in_transit_encryption::rule(),
        s3_bucket_encryption::rule(),
        s3_versioning::rule(),
    ]
}

/// Register every native rule. Returns the number registered.
pub fn register_native(registry: &mut Registry) -> Result<usize, RegistryError> {
    let rules = catalog();
    let count = rules.len();
    for rule in rules {
        registry.register(rule)?;
    }
    Ok(count)
}

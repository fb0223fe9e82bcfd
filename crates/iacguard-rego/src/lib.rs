//! Declarative (Rego) rules: discovery, compilation, metadata, evaluation.
//!
//! Startup order is fixed: load modules from a [`DocumentStore`], [`compile`] them as one unit,
//! then [`register_rules`] for every module whose metadata carries an identifier. The resulting
//! [`PolicySet`] is the [`iacguard_domain::PolicyRuntime`] used at scan time.

#![forbid(unsafe_code)]

mod annotations;
mod compiler;
pub mod embedded;
mod loader;
mod metadata;
mod references;
mod register;
mod runtime;
mod store;

pub use compiler::{
    ANYTHING_SCHEMA, CompileError, INPUT_SCHEMA_REF, ModuleError, PolicySet, SchemaSet, compile,
};
pub use loader::{
    LoadError, Module, OPTIONAL_MARKER, is_policy_document, load_modules, merge_libraries,
    parse_module,
};
pub use metadata::{MetadataError, MetadataRetriever};
pub use register::register_rules;
pub use store::{DirEntry, DocumentStore, EmbeddedStore, FsStore, StoreError};

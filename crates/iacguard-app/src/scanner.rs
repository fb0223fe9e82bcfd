//! Startup: build the rule registry and the compiled policy set.

use anyhow::Context;
use camino::Utf8PathBuf;
use iacguard_domain::{Registry, checks};
use iacguard_rego::embedded::load_bundled;
use iacguard_rego::{FsStore, Module, PolicySet, compile, load_modules, register_rules};
use iacguard_types::DocPath;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Registered rules plus the interpreter for their declarative checks.
///
/// Built once and read-only afterwards; one scanner serves any number of scans.
#[derive(Debug)]
pub struct Scanner {
    registry: Registry,
    policies: PolicySet,
}

impl Scanner {
    /// Startup with bundled content only.
    ///
    /// # Panics
    ///
    /// Panics when the bundled policy content fails to load or compile. That content ships with
    /// the binary, so a failure here is a build defect.
    pub fn bootstrap() -> Self {
        match Self::try_bootstrap(&[]) {
            Ok(scanner) => scanner,
            Err(err) => panic!("bundled policy content is invalid: {err:#}"),
        }
    }

    /// Startup with bundled content plus extra policy trees from disk.
    pub fn try_bootstrap(policy_dirs: &[Utf8PathBuf]) -> anyhow::Result<Self> {
        let mut registry = Registry::new();
        let native = checks::register_native(&mut registry).context("register native rules")?;
        debug!(count = native, "registered native rules");

        let mut modules = load_bundled().context("load bundled policies")?;
        for dir in policy_dirs {
            let custom = load_policy_dir(dir)?;
            debug!(dir = %dir, count = custom.len(), "loaded custom policies");
            modules.extend(custom);
        }
        info!(modules = modules.len(), "loaded policy modules");

        let policies = compile(modules).context("compile policies")?;
        let declarative =
            register_rules(&policies, &mut registry).context("register declarative rules")?;
        info!(
            native,
            declarative,
            total = registry.len(),
            "rule registry ready"
        );

        Ok(Self {
            registry,
            policies,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }
}

/// Custom modules are keyed under their directory so they never shadow bundled paths.
fn load_policy_dir(dir: &Utf8PathBuf) -> anyhow::Result<BTreeMap<DocPath, Module>> {
    let store = FsStore::new(dir.clone());
    let loaded = load_modules(&store, &DocPath::default())
        .with_context(|| format!("load policies from {dir}"))?;

    Ok(loaded
        .into_values()
        .map(|mut module| {
            module.path = DocPath::new(dir.join(module.path.as_str()).as_str());
            (module.path.clone(), module)
        })
        .collect())
}

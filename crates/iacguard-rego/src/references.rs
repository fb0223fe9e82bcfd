//! Cross-module reference checks run at compile time.
//!
//! The interpreter only reports an unknown function when evaluation reaches the call, which
//! rule bodies guarded by `some x in input...` never do against an empty input. Every `data.`
//! reference and every call through an import alias is therefore resolved against the module
//! set before the set is accepted.

use crate::compiler::ModuleError;
use crate::loader::Module;
use iacguard_types::DocPath;
use std::collections::{BTreeMap, BTreeSet};

/// Names defined at the top level of each package.
#[derive(Debug, Default)]
struct Definitions {
    rules: BTreeMap<String, BTreeSet<String>>,
    functions: BTreeMap<String, BTreeSet<String>>,
}

impl Definitions {
    fn collect<'a>(modules: impl Iterator<Item = &'a Module>) -> Self {
        let mut defs = Definitions::default();
        for module in modules {
            let rules = defs.rules.entry(module.package.clone()).or_default();
            let functions = defs.functions.entry(module.package.clone()).or_default();
            for line in strip_comments_and_strings(&module.source).lines() {
                let Some((name, is_call)) = head(line) else {
                    continue;
                };
                if is_call {
                    functions.insert(name.clone());
                }
                rules.insert(name);
            }
        }
        defs
    }

    /// A `data.` path names a package, a subtree of packages, or a definition inside a package.
    fn resolves(&self, path: &str) -> bool {
        self.rules.iter().any(|(package, names)| {
            if package == path || package.starts_with(&format!("{path}.")) {
                return true;
            }
            path.strip_prefix(package.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .and_then(|rest| rest.split('.').next())
                .is_some_and(|name| names.contains(name))
        })
    }

    fn has_function(&self, path: &str) -> bool {
        path.rsplit_once('.').is_some_and(|(package, name)| {
            self.functions
                .get(package)
                .is_some_and(|names| names.contains(name))
        })
    }
}

/// Appends one error per unresolved reference or alias call.
pub(crate) fn check_references(
    modules: &BTreeMap<DocPath, Module>,
    errors: &mut Vec<ModuleError>,
) {
    let defs = Definitions::collect(modules.values());
    for module in modules.values() {
        check_module(module, &defs, errors);
    }
}

fn check_module(module: &Module, defs: &Definitions, errors: &mut Vec<ModuleError>) {
    let code = strip_comments_and_strings(&module.source);
    let aliases = import_aliases(&code);
    let mut reported = BTreeSet::new();
    let mut report = |reason: String| {
        if reported.insert(reason.clone()) {
            errors.push(ModuleError {
                path: module.path.clone(),
                reason,
            });
        }
    };

    for reference in references(&code) {
        let (root, _) = reference
            .path
            .split_once('.')
            .unwrap_or((reference.path, ""));

        if let Some(path) = reference.path.strip_prefix("data.") {
            if reference.is_call {
                if !defs.has_function(path) {
                    report(format!("unknown function: {}", reference.path));
                }
            } else if !defs.resolves(path) {
                report(format!("unresolved reference: {}", reference.path));
            }
        } else if reference.is_call
            && let Some(target) = aliases.get(root)
        {
            let full = format!("{target}{}", &reference.path[root.len()..]);
            report(format!(
                "function {} is called through import alias {root}; call {full} instead",
                reference.path
            ));
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Reference<'a> {
    path: &'a str,
    is_call: bool,
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Dotted identifier chains that do not continue another expression, e.g. `data.lib.x` but not
/// the `field` in `xs[0].field`.
fn references(code: &str) -> Vec<Reference<'_>> {
    let bytes = code.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !is_ident_start(bytes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        loop {
            while i < bytes.len() && is_ident(bytes[i]) {
                i += 1;
            }
            if i + 1 < bytes.len() && bytes[i] == b'.' && is_ident_start(bytes[i + 1]) {
                i += 1;
                continue;
            }
            break;
        }
        let continues = start > 0 && (bytes[start - 1] == b'.' || is_ident(bytes[start - 1]));
        if !continues {
            out.push(Reference {
                path: &code[start..i],
                is_call: bytes.get(i) == Some(&b'('),
            });
        }
    }
    out
}

/// Maps each alias introduced by `import data....` to the path it stands for.
fn import_aliases(code: &str) -> BTreeMap<String, String> {
    let mut aliases = BTreeMap::new();
    for line in code.lines() {
        let Some(rest) = line.trim().strip_prefix("import ") else {
            continue;
        };
        let mut parts = rest.split_whitespace();
        let Some(target) = parts.next() else {
            continue;
        };
        if !target.starts_with("data.") {
            continue;
        }
        let alias = match (parts.next(), parts.next()) {
            (Some("as"), Some(alias)) => alias,
            _ => target.rsplit('.').next().unwrap_or(target),
        };
        aliases.insert(alias.to_string(), target.to_string());
    }
    aliases
}

/// Name of a top-level definition and whether it takes arguments.
fn head(line: &str) -> Option<(String, bool)> {
    if !line.as_bytes().first().copied().is_some_and(is_ident_start) {
        return None;
    }
    let line = line.strip_prefix("default ").unwrap_or(line);
    let end = line
        .bytes()
        .position(|c| !is_ident(c))
        .unwrap_or(line.len());
    let name = &line[..end];
    if matches!(name, "package" | "import") {
        return None;
    }
    Some((name.to_string(), line.as_bytes().get(end) == Some(&b'(')))
}

/// Blanks comments and string literals while keeping line structure.
fn strip_comments_and_strings(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        match c {
            '#' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '"' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            chars.next();
                        }
                        '"' => break,
                        '\n' => out.push('\n'),
                        _ => {}
                    }
                }
                out.push('"');
            }
            '`' => {
                out.push('`');
                for c in chars.by_ref() {
                    match c {
                        '`' => break,
                        '\n' => out.push('\n'),
                        _ => {}
                    }
                }
                out.push('`');
            }
            _ => out.push(c),
        }
    }
    out
}

//! Developer tasks (schema generation, rule metadata checks).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use iacguard_app::Scanner;
use schemars::schema_for;
use std::fs;
use std::path::PathBuf;

/// Project root (parent of the xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("determine current directory")?,
    };

    if manifest_dir.ends_with("xtask") {
        manifest_dir
            .parent()
            .map(PathBuf::from)
            .context("xtask has no parent directory")
    } else {
        Ok(manifest_dir)
    }
}

struct SchemaTarget {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn schema_targets() -> Vec<SchemaTarget> {
    vec![
        SchemaTarget {
            filename: "iacguard.report.v1.json",
            generate: || schema_for!(iacguard_types::ScanReport),
        },
        SchemaTarget {
            filename: "iacguard.config.v1.json",
            generate: || schema_for!(iacguard_settings::IacguardConfigV1),
        },
    ]
}

/// Pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = project_root()?.join("schemas");
    fs::create_dir_all(&dir).context("create schemas directory")?;

    for target in schema_targets() {
        let json = serialize_schema(&(target.generate)())?;
        let path = dir.join(target.filename);
        fs::write(&path, &json).with_context(|| format!("write schema {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Every registered rule must carry enough metadata to be explained.
fn check_rules() -> anyhow::Result<()> {
    let scanner = Scanner::bootstrap();
    let mut errors = Vec::new();

    for rule in scanner.registry().all() {
        let meta = &rule.metadata;
        if meta.title.is_empty() {
            errors.push(format!("{}: missing title", rule.long_id));
        }
        if meta.resolution.is_empty() {
            errors.push(format!("{}: missing resolution", rule.long_id));
        }
        if meta.provider.is_empty() || meta.service.is_empty() || meta.short_code.is_empty() {
            errors.push(format!(
                "{}: long id falls back to the identifier (provider/service/short_code incomplete)",
                rule.long_id
            ));
        }
    }

    if errors.is_empty() {
        println!("{} rules checked.", scanner.registry().len());
        return Ok(());
    }
    for e in &errors {
        eprintln!("  - {e}");
    }
    bail!("rule metadata check failed with {} errors", errors.len())
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  check-rules       Validate metadata of every registered rule");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "check-rules" => check_rules(),
        "print-schema-ids" => {
            for target in schema_targets() {
                println!("{}", target.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}

//! CLI entry point for iacguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, logging setup, and exit
//! codes. All business logic lives in the `iacguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use iacguard_app::{
    ExplainOutput, ScanInput, Scanner, exit_code, format_explanation, format_not_found,
    format_rules, list_rules, resolve_settings, run_explain, run_scan, serialize_report,
};
use iacguard_settings::{Overrides, ResolvedConfig};
use iacguard_types::ScanReport;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "iacguard",
    version,
    about = "Security policy scanner for infrastructure state snapshots"
)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to iacguard config TOML. A missing file means defaults.
    #[arg(long, default_value = "iacguard.toml", global = true)]
    config: Utf8PathBuf,

    /// Extra policy directory to load (repeatable).
    #[arg(long = "policy-dir", global = true)]
    policy_dirs: Vec<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate every registered rule against a state snapshot.
    Scan {
        /// State snapshot (JSON).
        #[arg(long)]
        state: Utf8PathBuf,

        /// Where to write the JSON report (stdout when omitted).
        #[arg(long)]
        report_out: Option<Utf8PathBuf>,

        /// Override maximum results to emit.
        #[arg(long)]
        max_results: Option<u32>,

        /// Skip rules below this severity (low|medium|high|critical).
        #[arg(long)]
        minimum_severity: Option<String>,

        /// Report failures of matching rules as ignored (glob, repeatable).
        #[arg(long)]
        ignore: Vec<String>,

        /// Evaluate native rules on the calling thread only.
        #[arg(long)]
        serial: bool,
    },

    /// List registered rules.
    Rules,

    /// Show a rule's metadata by long id, short id, or identifier.
    Explain {
        /// e.g. "aws-msk-enable-logging", "enable-logging" or "AVD-AWS-0074".
        identifier: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.cmd {
        Commands::Scan {
            state,
            report_out,
            max_results,
            minimum_severity,
            ignore,
            serial,
        } => {
            let overrides = Overrides {
                parallel: serial.then_some(false),
                max_results: *max_results,
                minimum_severity: minimum_severity.clone(),
                policy_dirs: cli.policy_dirs.clone(),
                ignore: ignore.clone(),
            };
            cmd_scan(&cli.config, overrides, state, report_out.as_deref())
        }
        Commands::Rules => cmd_rules(&cli),
        Commands::Explain { identifier } => cmd_explain(&cli, identifier),
    };

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("iacguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(config: &Utf8Path, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    // Missing config is allowed (defaults apply).
    let cfg_text = match std::fs::read_to_string(config) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %config, "no config file; using defaults");
            String::new()
        }
        Err(err) => return Err(err).with_context(|| format!("read config: {config}")),
    };
    resolve_settings(&cfg_text, overrides)
}

fn start(resolved: &ResolvedConfig) -> anyhow::Result<Scanner> {
    if resolved.policy_dirs.is_empty() {
        Ok(Scanner::bootstrap())
    } else {
        Scanner::try_bootstrap(&resolved.policy_dirs)
    }
}

fn cmd_scan(
    config: &Utf8Path,
    overrides: Overrides,
    state: &Utf8Path,
    report_out: Option<&Utf8Path>,
) -> anyhow::Result<i32> {
    let resolved = load_settings(config, overrides)?;
    let scanner = start(&resolved)?;

    let state_text =
        std::fs::read_to_string(state).with_context(|| format!("read state: {state}"))?;
    let output = run_scan(
        &scanner,
        ScanInput {
            state_text: &state_text,
            config: &resolved,
        },
    )?;

    match report_out {
        Some(path) => write_report_file(path, &output.report).context("write report json")?,
        None => {
            let data = serialize_report(&output.report)?;
            println!("{}", String::from_utf8_lossy(&data));
        }
    }

    Ok(exit_code(&output.report))
}

fn cmd_rules(cli: &Cli) -> anyhow::Result<i32> {
    let scanner = start(&load_settings(&cli.config, policy_overrides(cli))?)?;
    print!("{}", format_rules(&list_rules(scanner.registry())));
    Ok(0)
}

fn cmd_explain(cli: &Cli, identifier: &str) -> anyhow::Result<i32> {
    let scanner = start(&load_settings(&cli.config, policy_overrides(cli))?)?;
    match run_explain(scanner.registry(), identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", format_explanation(&exp));
            Ok(0)
        }
        ExplainOutput::NotFound {
            identifier,
            available,
        } => {
            eprint!("{}", format_not_found(&identifier, &available));
            Ok(1)
        }
    }
}

fn policy_overrides(cli: &Cli) -> Overrides {
    Overrides {
        policy_dirs: cli.policy_dirs.clone(),
        ..Overrides::default()
    }
}

fn write_report_file(path: &Utf8Path, report: &ScanReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    let data = serialize_report(report)?;
    std::fs::write(path, data).with_context(|| format!("write report: {path}"))?;
    Ok(())
}

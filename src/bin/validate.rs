//! Metamodel Validator CLI
//!
//! Validates a metamodel document and compares it against a baseline.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use metamodel_core::{
    load_metamodel, ChangeAnalyzer, CompatibilityChecker, Metamodel, MetamodelConfig,
    MetamodelValidator, MigrationPlanner,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "metamodel-validate")]
#[command(about = "Validate a metamodel and compare it against a baseline")]
struct Cli {
    /// Metamodel JSON file to validate
    metamodel_file: PathBuf,

    /// Baseline metamodel (defaults to the configured baseline, then the core metamodel)
    #[arg(long)]
    baseline: Option<PathBuf>,

    /// List the changes from the baseline
    #[arg(short = 'c', long)]
    detect_changes: bool,

    /// Check backward compatibility with the baseline
    #[arg(short = 'b', long)]
    check_compatibility: bool,

    /// Print a migration plan (JSON) for the changes from the baseline
    #[arg(short, long)]
    plan: bool,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when a check failed
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = MetamodelConfig::load_from(cli.config.as_deref()).context("failed to load configuration")?;

    println!("🔍 Loading metamodel from {}", cli.metamodel_file.display());
    let metamodel = load_metamodel(&cli.metamodel_file)
        .with_context(|| format!("failed to load {}", cli.metamodel_file.display()))?;
    println!("   {} version {}", metamodel.name, metamodel.version);

    let (is_valid, errors) = MetamodelValidator::new().validate_metamodel(&metamodel).into_parts();
    if is_valid {
        println!("✅ Metamodel structure is valid");
    } else {
        eprintln!("❌ Metamodel structure is invalid:");
        for error in &errors {
            eprintln!("   └─ {}", error);
        }
        return Ok(false);
    }

    if !(cli.detect_changes || cli.check_compatibility || cli.plan) {
        return Ok(true);
    }

    let baseline = load_baseline(cli.baseline, &config)?;
    println!("🔍 Comparing against {} version {}", baseline.name, baseline.version);
    let mut ok = true;

    if cli.check_compatibility {
        let compat = CompatibilityChecker::new().validate_backward_compatibility(&baseline, &metamodel);
        if compat.is_valid {
            println!("✅ Metamodel is backward compatible");
        } else {
            eprintln!("❌ Metamodel is not backward compatible:");
            for error in &compat.errors {
                eprintln!("   └─ {}", error);
            }
            if config.validation.fail_on_incompatible {
                ok = false;
            }
        }
    }

    let changes = ChangeAnalyzer::new().detect_changes(&baseline, &metamodel);

    if cli.detect_changes {
        if changes.is_empty() {
            println!("✅ No changes detected");
        } else {
            println!("Detected {} changes:", changes.len());
            for (i, change) in changes.iter().enumerate() {
                println!("  {}. {}: {}", i + 1, change.change_type, change.target_path);
                println!("     {}", change.description);
            }
        }
    }

    if cli.plan {
        let plan = MigrationPlanner::new().generate_migration_plan(&changes);
        println!("{}", serde_json::to_string_pretty(&plan)?);

        if config.validation.fail_on_high_impact && !plan.high_impact.is_empty() {
            eprintln!("❌ {} high impact change(s) in migration plan", plan.high_impact.len());
            ok = false;
        }
    }

    Ok(ok)
}

fn load_baseline(path: Option<PathBuf>, config: &MetamodelConfig) -> anyhow::Result<Metamodel> {
    match path {
        Some(path) => {
            load_metamodel(&path).with_context(|| format!("failed to load baseline {}", path.display()))
        }
        None => config.baseline_metamodel().context("failed to load baseline metamodel"),
    }
}

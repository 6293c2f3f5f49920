//! Schema Generator CLI
//!
//! Writes a proto3 schema for a metamodel (the core metamodel by default).

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use metamodel_core::{core_metamodel, load_metamodel, MetamodelConfig, ProtobufGenerator};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "metamodel-generate")]
#[command(about = "Generate a Protocol Buffer schema from a metamodel")]
struct Cli {
    /// Metamodel JSON file (defaults to the core metamodel)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory (overrides codegen.output_dir)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Base file name, also used as the package name (overrides codegen.filename)
    #[arg(short, long)]
    filename: Option<String>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = MetamodelConfig::load_from(cli.config.as_deref()).context("failed to load configuration")?;

    let metamodel = match &cli.input {
        Some(path) => load_metamodel(path).with_context(|| format!("failed to load {}", path.display()))?,
        None => core_metamodel().context("failed to load core metamodel")?,
    };
    println!("📦 Loaded {} version {}", metamodel.name, metamodel.version);

    let output_dir = cli.output_dir.unwrap_or(config.codegen.output_dir);
    let filename = cli.filename.unwrap_or(config.codegen.filename);

    let generator = ProtobufGenerator::new(output_dir);
    let path = generator
        .write_schema(&metamodel, &filename)
        .with_context(|| format!("failed to write schema to {}", generator.output_dir().display()))?;

    println!("✅ Generated schema file: {}", path.display());
    Ok(())
}

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use confmig::{Engine, SchemaValidator};
use serde_json::Value as JsonValue;

#[derive(Parser)]
#[command(name = "confmig")]
#[command(about = "Migrate configuration documents between schema versions")]
struct Cli {
    /// Directory containing forward migration JSON files
    #[arg(long, default_value = "./migrations")]
    migrations: PathBuf,

    /// Source version
    #[arg(long)]
    from: String,

    /// Target version
    #[arg(long)]
    to: String,

    /// Input config JSON file
    #[arg(long)]
    input: PathBuf,

    /// Output file ('-' for stdout)
    #[arg(long, default_value = "-")]
    out: String,

    /// Pretty-print JSON output
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pretty: bool,

    /// Directory of JSON Schemas named <version>.json; enables validation
    #[arg(long)]
    schemas: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::try_parse().unwrap_or_else(|err| {
        let code = if err.use_stderr() { 1 } else { 0 };
        err.print().ok();
        std::process::exit(code);
    });

    let mut engine = Engine::new();
    engine
        .load_dir(&cli.migrations)
        .with_context(|| format!("loading migrations from {}", cli.migrations.display()))?;

    if let Some(schemas) = &cli.schemas {
        let validator = SchemaValidator::load_dir(schemas)
            .with_context(|| format!("loading schemas from {}", schemas.display()))?;
        engine = engine.with_validator(validator);
    }

    let raw = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let document: JsonValue =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", cli.input.display()))?;

    let migrated = engine
        .apply(&document, &cli.from, &cli.to)
        .with_context(|| format!("migrating {} -> {}", cli.from, cli.to))?;

    let mut encoded = if cli.pretty {
        serde_json::to_string_pretty(&migrated)?
    } else {
        serde_json::to_string(&migrated)?
    };
    encoded.push('\n');

    if cli.out == "-" {
        print!("{encoded}");
    } else {
        fs::write(&cli.out, &encoded).with_context(|| format!("writing {}", cli.out))?;
        eprintln!("wrote {}", cli.out);
    }
    Ok(())
}

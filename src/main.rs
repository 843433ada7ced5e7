//! themesheet - CLI tool to resolve layered theme designs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use themesheet_core::{
    compile_override, expand, flatten, resolve_design, ColorScheme, ComposableRegistry,
    DesignRecord, EngineConfig, FlatPathMap, ResolveMode,
};

/// Resolve layered theme designs into theme configuration JSON.
#[derive(Parser, Debug)]
#[command(name = "themesheet")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a saved design record into a configuration
    Resolve {
        /// Design record JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Color scheme (defaults to the record's active scheme)
        #[arg(short, long, value_enum)]
        scheme: Option<SchemeArg>,

        /// Fail on any layer error instead of skipping the layer
        #[arg(long)]
        strict: bool,
    },

    /// Compile a code override and print its flat path map
    Eval {
        /// File holding the override source
        #[arg(short, long, conflicts_with = "code")]
        input: Option<PathBuf>,

        /// Override source given inline
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Flatten a nested configuration into a dot-path map
    Flatten {
        /// Configuration JSON file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Expand a dot-path map into a nested configuration
    Expand {
        /// Flat path map JSON file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List the stock composables
    Composables,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SchemeArg {
    Light,
    Dark,
}

impl From<SchemeArg> for ColorScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Light => ColorScheme::Light,
            SchemeArg::Dark => ColorScheme::Dark,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Resolve {
            input,
            output,
            scheme,
            strict,
        } => resolve(&input, output.as_deref(), scheme.map(Into::into), strict),
        Command::Eval { input, code } => eval(input.as_deref(), code),
        Command::Flatten { input } => {
            let tree = read_json(&input)?;
            print_json(&Value::Object(flatten(&tree)))
        }
        Command::Expand { input } => {
            let flat: FlatPathMap = serde_json::from_value(read_json(&input)?)
                .with_context(|| format!("{} is not a flat path map", input.display()))?;
            print_json(&expand(&flat))
        }
        Command::Composables => {
            for definition in ComposableRegistry::with_builtins().list() {
                match &definition.description {
                    Some(description) => println!("{:<22} {} - {}", definition.id, definition.label, description),
                    None => println!("{:<22} {}", definition.id, definition.label),
                }
            }
            Ok(())
        }
    }
}

fn resolve(input: &Path, output: Option<&Path>, scheme: Option<ColorScheme>, strict: bool) -> Result<()> {
    info!("Processing: {}", input.display());

    let record = DesignRecord::load(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let mode = if strict {
        ResolveMode::Strict
    } else {
        ResolveMode::Lenient
    };

    let resolved = resolve_design(&record, scheme, mode)
        .with_context(|| format!("Failed to resolve '{}'", record.title))?;

    if !resolved.callbacks.is_empty() {
        warn!(
            "{} style callback(s) cannot be written as JSON and were left out",
            resolved.callbacks.len()
        );
    }

    let json = serde_json::to_string_pretty(&resolved.config)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Generated: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn eval(input: Option<&Path>, code: Option<String>) -> Result<()> {
    let source = match (input, code) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, Some(code)) => code,
        (None, None) => anyhow::bail!("Provide the override with --input or --code"),
    };

    let compiled = compile_override(&source, &EngineConfig::default());
    if let Some(err) = compiled.as_error() {
        anyhow::bail!(err);
    }
    print_json(&Value::Object(compiled.flat))
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

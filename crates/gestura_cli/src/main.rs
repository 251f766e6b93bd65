//! Gestura - replay scripted input through gesture recognizers
//!
//! Commands:
//! - `gestura replay <script.json> --recognizer <kind>` prints the callback
//!   and haptic timeline a recognizer produces for a script
//! - `gestura init` writes a default gestura.toml
//! - `gestura config` prints the effective configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gestura_cli::{GesturaConfig, RecognizerKind, ReplayScript, CONFIG_FILE};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Replay scripted input through gesture recognizers
#[derive(Parser, Debug)]
#[command(name = "gestura")]
#[command(about = "Replay scripted input through gesture recognizers")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Feed a script to a recognizer and print the resulting timeline
    Replay {
        /// Script file (JSON)
        script: PathBuf,

        /// Recognizer to drive
        #[arg(short, long, value_enum)]
        recognizer: RecognizerKind,

        /// Configuration file (defaults to ./gestura.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default gestura.toml
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay {
            script,
            recognizer,
            config,
            json,
        } => run_replay(script, recognizer, config, json),
        Commands::Init { path, force } => run_init(path, force),
        Commands::Config { config } => run_config(config),
    }
}

fn run_replay(
    script_path: PathBuf,
    recognizer: RecognizerKind,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = GesturaConfig::load_or_default(config_path.as_deref())?;
    let script = ReplayScript::load(&script_path)?;

    let report = gestura_cli::run(recognizer, &config, &script);
    if json {
        let text = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{text}");
    } else {
        print!("{}", report.render());
    }
    Ok(())
}

fn run_init(dir: PathBuf, force: bool) -> Result<()> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let text = GesturaConfig::default().to_toml()?;
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    println!("Created {}", path.display());
    Ok(())
}

fn run_config(config_path: Option<PathBuf>) -> Result<()> {
    let config = GesturaConfig::load_or_default(config_path.as_deref())?;
    print!("{}", config.to_toml()?);
    Ok(())
}

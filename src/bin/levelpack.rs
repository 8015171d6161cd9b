//! levelpack: build-time tool for level containers.
//!
//! ```text
//! levelpack pack levels/ -o levels.dat
//! levelpack unpack levels.dat -o levels/
//! levelpack inspect https://cdn.example.com/levels.dat --level 12
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use level_vault::config::{LevelConfig, DEFAULT_LEVELS_FILE};
use level_vault::export;
use level_vault::utils::logging::init_logging;
use level_vault::{Level, LevelCrypto, LevelDatabase};

#[derive(Parser)]
#[command(name = "levelpack", version, about = "Pack, unpack and inspect level containers")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "LEVEL_VAULT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seal a folder of per-level JSON files into one container
    Pack {
        json_dir: PathBuf,
        #[arg(short, long, default_value = DEFAULT_LEVELS_FILE)]
        output: PathBuf,
    },
    /// Write every level of a container as an indented JSON file
    Unpack {
        container: PathBuf,
        #[arg(short, long, default_value = "levels")]
        output: PathBuf,
    },
    /// Load a container the way the game does and summarize it
    Inspect {
        /// Path or URL; defaults to the configured source
        location: Option<String>,
        #[arg(long)]
        level: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LevelConfig::from_file(path)?,
        None => LevelConfig::default(),
    };
    config.apply_env();
    if let Command::Inspect {
        location: Some(location),
        ..
    } = &cli.command
    {
        config.source.location = location.clone();
    }
    config.validate_strict()?;
    init_logging(&config.logging)?;

    let crypto = LevelCrypto::new();
    match cli.command {
        Command::Pack { json_dir, output } => {
            let collection = export::read_json_dir(&json_dir)
                .with_context(|| format!("reading {}", json_dir.display()))?;
            if collection.levels.is_empty() {
                bail!("no level files found in {}", json_dir.display());
            }
            let bytes = export::write_container(&collection, &crypto, &output)?;
            println!(
                "packed {} levels into {} ({bytes} bytes)",
                collection.levels.len(),
                output.display()
            );
        }
        Command::Unpack { container, output } => {
            let collection = export::read_container(&crypto, &container)
                .with_context(|| format!("opening {}", container.display()))?;
            let written = export::write_json_dir(&collection, &output)?;
            println!("unpacked {} levels into {}", written.len(), output.display());
        }
        Command::Inspect { level, .. } => {
            let db = LevelDatabase::from_config(&config.source)?;
            let count = db.preload().await;
            if count == 0 {
                bail!("no levels could be loaded from {}", db.source());
            }
            match level {
                Some(number) => match db.get(number).await {
                    Some(found) => print_level(&found),
                    None => bail!("level {number} not found"),
                },
                None => {
                    let numbers = db.level_numbers();
                    println!("{count} levels: {numbers:?}");
                }
            }
            db.metrics().log_metrics();
        }
    }

    info!("Done");
    Ok(())
}

fn print_level(level: &Level) {
    println!(
        "level {}: {} columns x {} rows, {} slots, {} goals, {} containers",
        level.level,
        level.columns(),
        level.rows(),
        level.total_slot,
        level.goals.len(),
        level.containers.len()
    );
    for row in (0..level.rows()).rev() {
        let line: Vec<String> = (0..level.columns())
            .filter_map(|column| level.grid.get(column, row))
            .map(|cell| {
                if cell.is_empty {
                    "  .".to_string()
                } else {
                    format!("{:>3}", cell.colors.len())
                }
            })
            .collect();
        println!("{}", line.join(""));
    }
}

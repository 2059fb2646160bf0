//! modelvault CLI
//!
//! Command-line interface for storing and reading model artifacts.

mod commands;

use clap::{Parser, Subcommand};
use modelvault_core::{BackendType, OverwritePolicy, VaultConfig};
use modelvault_store::{open_durable, ArtifactCache, ArtifactStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// modelvault - concurrency-safe model artifact store
#[derive(Parser, Debug)]
#[command(name = "modelvault")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding stored artifacts (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep artifacts in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Log level (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate random models and store them
    Generate {
        /// Payload size in bytes
        #[arg(long, default_value_t = modelvault_core::DEFAULT_MODEL_SIZE)]
        size: usize,

        /// Number of models to generate
        #[arg(long, default_value_t = 1)]
        count: u32,
    },

    /// Store a file as an artifact
    Put {
        /// Artifact id
        id: String,

        /// File to read the payload from
        file: PathBuf,

        /// Replace an existing artifact with different content
        #[arg(long)]
        replace: bool,
    },

    /// Read an artifact
    Get {
        /// Artifact id
        id: String,

        /// Write the payload to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List stored artifacts
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Check an artifact's durable copy against its digest
    Verify {
        /// Artifact id
        id: String,
    },
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => VaultConfig::from_file(path)?,
        None => VaultConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.storage.path = dir;
    }
    if cli.ephemeral {
        config.storage.backend = BackendType::Memory;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Commands::Put { replace: true, .. } = cli.command {
        config.write.overwrite = OverwritePolicy::Replace;
    }

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&config.logging.level))
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    debug!(config = ?config, "Loaded configuration");

    let durable = open_durable(&config.storage).await?;
    let cache = Arc::new(ArtifactCache::new(
        config.cache.max_cost,
        config.cache.num_counters,
    ));
    let store = ArtifactStore::open(durable, cache.clone(), config.write.overwrite).await?;

    match cli.command {
        Commands::Generate { size, count } => {
            commands::generate(&store, &cache, size, count).await?;
        }
        Commands::Put { id, file, .. } => {
            commands::put(&store, id, file).await?;
        }
        Commands::Get { id, output } => {
            commands::get(&store, id, output).await?;
        }
        Commands::List { json } => {
            commands::list(&store, json).await?;
        }
        Commands::Verify { id } => {
            commands::verify(&store, id).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("bogus"), Level::INFO);
    }

    #[test]
    fn test_cli_parses_put() {
        let cli = Cli::parse_from(["modelvault", "--data-dir", "/tmp/mv", "put", "m", "w.bin", "--replace"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/mv")));
        assert!(matches!(
            cli.command,
            Commands::Put { ref id, replace: true, .. } if id == "m"
        ));
    }

    #[test]
    fn test_cli_generate_defaults() {
        let cli = Cli::parse_from(["modelvault", "generate"]);
        assert!(matches!(
            cli.command,
            Commands::Generate { size: modelvault_core::DEFAULT_MODEL_SIZE, count: 1 }
        ));
    }
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use skyledger_core::config::SkyledgerConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::CallArgs;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "skyledger.yaml";

#[derive(Parser, Debug)]
#[command(name = "skyledger", version, about = "Skyledger cloud resource sync")]
struct Cli {
    /// Path to skyledger.yaml
    #[arg(long, global = true, env = "SKYLEDGER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered resources and their parameters
    Resources,

    /// Show a resource's parameters, record attributes and query keys
    Describe {
        resource: String,

        #[command(flatten)]
        args: CallArgs,
    },

    /// Show the metric catalog of a metric resource
    Metrics { resource: String },

    /// Fetch one page and print the replay as JSON
    Call {
        resource: String,

        #[command(flatten)]
        args: CallArgs,
    },

    /// Follow the cursor chain until it is exhausted, one replay per line
    Sync {
        resource: String,

        #[command(flatten)]
        args: CallArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.logging.ansi)
        .with_writer(std::io::stderr)
        .init();

    let engine = commands::engine(&config)?;

    match cli.cmd {
        Command::Resources => commands::inspect::resources(&engine),
        Command::Describe { resource, args } => {
            commands::inspect::describe(&engine, &resource, &args.collect()?)
        }
        Command::Metrics { resource } => commands::inspect::metrics(&engine, &resource),
        Command::Call { resource, args } => {
            commands::call::call(&engine, &config, &resource, args.collect()?).await
        }
        Command::Sync { resource, args } => {
            commands::call::sync(&engine, &config, &resource, args.collect()?).await
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SkyledgerConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None if Path::new(DEFAULT_CONFIG).exists() => PathBuf::from(DEFAULT_CONFIG),
        None => return Ok(SkyledgerConfig::default()),
    };
    SkyledgerConfig::load_with_context(&path)
        .with_context(|| format!("Failed to load configuration from {:?}", path))
}

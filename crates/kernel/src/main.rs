//! Siv command-line tooling.
//!
//! Inspects plugin manifests and game-data notetags without a running game.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use siv_kernel::Config;
use siv_kernel::notetag::{self, EntityKind, NotetagQuery};
use siv_kernel::plugin;

/// Siv plugin kernel tooling.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect plugin manifests.
    Plugins {
        #[command(subcommand)]
        command: PluginsCommand,
    },
    /// Inspect notetags.
    Notetags {
        #[command(subcommand)]
        command: NotetagsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PluginsCommand {
    /// List discovered plugins.
    List {
        /// Plugins directory (overrides SIV_PLUGINS_DIR).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print the resolved initialization order.
    Order {
        /// Plugins directory (overrides SIV_PLUGINS_DIR).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum NotetagsCommand {
    /// Parse notetags from a text file.
    Parse {
        /// File to scan.
        file: PathBuf,
    },
    /// Print the notetags of one database entity.
    Dump {
        /// Entity kind, e.g. weapons, commonEvents, mapEvents.
        #[arg(long)]
        kind: EntityKind,

        /// Entity id (map id for `maps`).
        #[arg(long, default_value = "1")]
        id: u32,

        /// Map holding the event, for `mapEvents`.
        #[arg(long)]
        map_id: Option<u32>,

        /// Only tags with this exact name.
        #[arg(long)]
        name: Option<String>,

        /// Game data directory (overrides SIV_DATA_DIR).
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let mut config = Config::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_filter);

    let args = Args::parse();
    debug!(?args, "parsed arguments");

    match args.command {
        Command::Plugins { command } => match command {
            PluginsCommand::List { dir } => {
                plugin::cli::cmd_plugins_list(&dir.unwrap_or(config.plugins_dir))
            }
            PluginsCommand::Order { dir } => {
                plugin::cli::cmd_plugins_order(&dir.unwrap_or(config.plugins_dir))
            }
        },
        Command::Notetags { command } => match command {
            NotetagsCommand::Parse { file } => notetag::cli::cmd_notetags_parse(&file),
            NotetagsCommand::Dump {
                kind,
                id,
                map_id,
                name,
                data,
            } => {
                if let Some(data) = data {
                    config.data_dir = data;
                }
                let query = NotetagQuery {
                    kind,
                    id,
                    map_id,
                    name,
                };
                notetag::cli::cmd_notetags_dump(config, &query)
            }
        },
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

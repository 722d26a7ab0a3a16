use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plinth_core::AppConfig;

mod commands;
mod script;

use commands::Output;

#[derive(Parser)]
#[command(name = "plinth")]
#[command(author, version, about = "Drive the plinth scroll core from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the number of gallery items
    #[arg(short = 'i', long = "items", global = true)]
    items: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an input script on a simulated clock
    Simulate {
        /// TOML input script
        script: PathBuf,
        /// Simulated frame rate
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Print every Nth frame
        #[arg(long, default_value_t = 6)]
        every: u32,
        /// Emit JSON lines instead of text
        #[arg(long)]
        json: bool,
        /// Write save_snapshot actions to the data dir
        #[arg(long)]
        persist: bool,
    },
    /// Replay an input script in real time
    Live {
        /// TOML input script
        script: PathBuf,
        #[arg(long, default_value_t = 60)]
        fps: u32,
        #[arg(long)]
        json: bool,
        /// Write save_snapshot actions to the data dir
        #[arg(long)]
        persist: bool,
    },
    /// Inspect or clear the persisted navigation snapshot
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
    /// Print the effective configuration
    Config {
        /// Only print the config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// Show the saved snapshot
    Show,
    /// Delete the saved snapshot
    Clear,
}

fn output(json: bool) -> Output {
    if json {
        Output::Json
    } else {
        Output::Text
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load()?;
    if let Some(items) = cli.items {
        config.gallery.item_count = items;
        config.validate()?;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Simulate {
            script,
            fps,
            every,
            json,
            persist,
        } => {
            let options = commands::simulate::SimulateOptions {
                fps,
                every,
                output: output(json),
                persist,
            };
            commands::simulate::run(&config, &script, &options)
        }
        Commands::Live {
            script,
            fps,
            json,
            persist,
        } => commands::live::run(&config, &script, fps, output(json), persist).await,
        Commands::Snapshot { action } => match action {
            SnapshotAction::Show => commands::snapshot::show(&config),
            SnapshotAction::Clear => commands::snapshot::clear(&config),
        },
        Commands::Config { path } => commands::config::run(&config, path),
    }
}

//! Intake CLI - intake command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use watcher::DuplicatePolicy;

mod cmd;
mod settings;
mod util;

/// Intake - hand stabilized document folders to an upload command
#[derive(Parser)]
#[command(name = "intake")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file (default: platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a drop directory and upload each folder once it stabilizes
    Watch {
        /// Drop directory to watch
        root: PathBuf,

        /// Seconds between drop-directory scans
        #[arg(long, value_name = "SECONDS")]
        poll_interval: Option<f64>,

        /// Seconds a folder must stay unchanged before upload
        #[arg(long, value_name = "SECONDS")]
        stability_wait: Option<f64>,

        /// Duplicate handling: skip, replace or update-metadata
        #[arg(long, value_name = "MODE")]
        duplicate_handling: Option<DuplicatePolicy>,

        /// Log what would be uploaded without running anything
        #[arg(long)]
        dry_run: bool,

        /// Upload command to run per stable folder, given after `--`
        #[arg(last = true, value_name = "COMMAND")]
        upload_command: Vec<String>,
    },
    /// Upload every folder already in the drop directory, once, then exit
    Drain {
        /// Drop directory to drain
        root: PathBuf,

        /// Only upload the folder with this name
        #[arg(long, value_name = "NAME")]
        folder: Option<String>,

        /// Duplicate handling: skip, replace or update-metadata
        #[arg(long, value_name = "MODE")]
        duplicate_handling: Option<DuplicatePolicy>,

        /// Log what would be uploaded without running anything
        #[arg(long)]
        dry_run: bool,

        /// Upload command to run per folder, given after `--`
        #[arg(last = true, value_name = "COMMAND")]
        upload_command: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let settings = settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Watch {
            root,
            poll_interval,
            stability_wait,
            duplicate_handling,
            dry_run,
            upload_command,
        } => {
            let settings =
                settings.with_overrides(poll_interval, stability_wait, duplicate_handling)?;
            cmd::watch::run(root, settings, upload_command, dry_run).await
        }
        Commands::Drain {
            root,
            folder,
            duplicate_handling,
            dry_run,
            upload_command,
        } => {
            let settings = settings.with_overrides(None, None, duplicate_handling)?;
            cmd::drain::run(root, settings, folder, upload_command, dry_run).await
        }
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "intake=debug,watcher=debug"
    } else {
        "intake=info,watcher=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

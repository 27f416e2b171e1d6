//! Watch a drop directory in the foreground

use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use tokio_util::sync::CancellationToken;
use tracing::info;
use watcher::{DirWatcher, FsFolderLister, RunStats};

use crate::settings::Settings;
use crate::util;

pub async fn run(
    root: PathBuf,
    settings: Settings,
    upload_command: Vec<String>,
    dry_run: bool,
) -> Result<()> {
    // 1. Decide how folders leave the machine before touching anything
    let uploader = util::select_uploader(upload_command, dry_run)?;

    // 2. Banner, like any long-running foreground tool
    println!("{}", "Intake Watcher".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Watching:       {}", root.display().to_string().cyan());
    println!("Poll interval:  {}s", settings.poll_interval);
    println!("Stability wait: {}s", settings.stability_wait);
    println!("Duplicates:     {}", settings.duplicate_handling);
    if dry_run {
        println!("Mode:           {}", "dry run".yellow());
    }
    println!();
    println!("{}", "Press Ctrl+C to stop".dimmed());
    println!();

    // 3. Ctrl+C requests a cooperative stop; the current cycle finishes
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            info!("Interrupt received, finishing current work");
            signal_cancel.cancel();
        }
    });

    // 4. Run until cancelled; only startup validation can fail here
    let watcher = DirWatcher::new(&root, settings.watch_config());
    let stats = watcher
        .run(&FsFolderLister, uploader.as_ref(), cancel)
        .await
        .context("Watcher could not start")?;

    print_summary(&stats);
    Ok(())
}

fn print_summary(stats: &RunStats) {
    println!();
    println!("{}", "Watcher stopped".bold());
    println!("  Discovered: {}", stats.discovered);
    println!("  Uploaded:   {}", stats.uploaded.to_string().green());
    if stats.failed > 0 {
        println!("  Failed:     {}", stats.failed.to_string().red());
    }
    println!("  Total:      {}", stats.processed());
}

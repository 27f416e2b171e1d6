//! One-shot upload pass over folders already in the drop directory
//!
//! Unlike `watch`, drain assumes the folders are at rest and uploads them
//! immediately, without stabilization. Useful for working through a backlog
//! before switching the watcher on.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use watcher::{FolderLister, FsFolderLister};

use crate::settings::Settings;
use crate::util;

pub async fn run(
    root: PathBuf,
    settings: Settings,
    only_folder: Option<String>,
    upload_command: Vec<String>,
    dry_run: bool,
) -> Result<()> {
    let uploader = util::select_uploader(upload_command, dry_run)?;

    let mut folders = FsFolderLister
        .list_folders(&root)
        .context("Cannot read drop directory")?;

    if let Some(name) = &only_folder {
        folders.retain(|folder| folder.id.as_str() == name);
        if folders.is_empty() {
            bail!("No folder named {:?} in {}", name, root.display());
        }
    }

    if folders.is_empty() {
        println!("Nothing to upload in {}", root.display());
        return Ok(());
    }

    println!(
        "Uploading {} folder(s) from {}",
        folders.len(),
        root.display().to_string().cyan()
    );

    let policy = settings.duplicate_handling;
    let progress = ProgressBar::new(folders.len() as u64);
    let mut uploaded = 0u64;
    let mut failed = 0u64;

    for folder in &folders {
        match uploader.upload(&folder.path, policy).await {
            Ok(()) => uploaded += 1,
            Err(e) => {
                failed += 1;
                progress.suspend(|| {
                    eprintln!("{} {}: {}", "Failed".red(), folder.id, e);
                });
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!();
    println!("  Uploaded: {}", uploaded.to_string().green());
    if failed > 0 {
        println!("  Failed:   {}", failed.to_string().red());
    }

    if uploaded == 0 && failed > 0 {
        bail!("All {} upload(s) failed", failed);
    }
    Ok(())
}

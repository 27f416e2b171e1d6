//! Error types for the intake watcher
//!
//! Three failure classes with very different blast radii:
//! 1. `ListError` - one poll cycle is skipped, the loop keeps running
//! 2. `UploadError` - one folder is marked failed, the loop keeps running
//! 3. `StartupError` - the run never begins, mapped to a non-zero exit

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// The watch root could not be enumerated
///
/// Raised by `FolderLister` implementations when the drop directory cannot
/// be read at all. The watch loop logs this and skips the cycle rather than
/// returning a partial candidate list.
#[derive(Debug, Error)]
#[error("cannot list watch directory {}: {source}", .path.display())]
pub struct ListError {
    /// The directory that could not be read
    pub path: PathBuf,

    /// Underlying I/O failure
    #[source]
    pub source: io::Error,
}

/// An upload collaborator reported failure for one folder
///
/// The folder is still marked processed; there is no retry within a run.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The upload command could not be started at all
    #[error("failed to launch upload command: {0}")]
    Spawn(#[source] io::Error),

    /// The upload command ran but exited unsuccessfully
    #[error("upload command failed ({status}){}", stderr_suffix(.stderr))]
    CommandFailed {
        status: ExitStatus,
        stderr: String,
    },

    /// Any other collaborator failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The watch run could not start
///
/// Validation happens once, before the first poll. These are the only
/// errors a watch run itself can return.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("watch directory does not exist: {}", .0.display())]
    RootMissing(PathBuf),

    #[error("watch path is not a directory: {}", .0.display())]
    RootNotADirectory(PathBuf),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

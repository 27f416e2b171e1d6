//! Upload hand-off for stable folders
//!
//! The watcher does not know how to talk to the document backend; it only
//! knows when a folder is ready. `Uploader` is that boundary. The shipped
//! implementation runs a configured command per folder, which keeps
//! transport concerns (HTTP, auth, retries) out of this crate entirely.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::UploadError;

/// Environment variable carrying the duplicate policy to upload commands
pub const DUPLICATE_MODE_ENV: &str = "INTAKE_DUPLICATE_MODE";

/// What the backend should do when an uploaded document already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Leave the existing document untouched (default)
    #[default]
    Skip,

    /// Replace the existing document's content
    Replace,

    /// Keep the content, refresh tags and other metadata
    UpdateMetadata,
}

impl DuplicatePolicy {
    /// Stable string form, as accepted on the command line and in config
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Replace => "replace",
            Self::UpdateMetadata => "update-metadata",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized duplicate policy name
#[derive(Debug, Error)]
#[error("unknown duplicate-handling mode {0:?} (expected skip, replace or update-metadata)")]
pub struct ParsePolicyError(String);

impl FromStr for DuplicatePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "replace" => Ok(Self::Replace),
            "update-metadata" => Ok(Self::UpdateMetadata),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// The upload collaborator: receives one stable folder per call
///
/// A successful return means the folder was handed off; a backend that
/// deliberately skips a duplicate still counts as success. Errors mark the
/// folder failed, and the watcher never retries within a run.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload the folder at `folder`, honoring `policy` for duplicates
    async fn upload(&self, folder: &Path, policy: DuplicatePolicy) -> Result<(), UploadError>;
}

/// Uploads by running an external command once per stable folder
///
/// The folder path is appended as the final argument and the duplicate
/// policy is exported as `INTAKE_DUPLICATE_MODE`. Exit status zero is a
/// successful hand-off; anything else is an upload failure.
#[derive(Debug, Clone)]
pub struct ExecUploader {
    program: String,
    args: Vec<String>,
}

impl ExecUploader {
    /// Build from an argv-style command line; `None` if `argv` is empty
    pub fn from_argv(argv: Vec<String>) -> Option<Self> {
        let mut parts = argv.into_iter();
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// The program this uploader runs
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Uploader for ExecUploader {
    async fn upload(&self, folder: &Path, policy: DuplicatePolicy) -> Result<(), UploadError> {
        debug!("Running {} for {}", self.program, folder.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(folder)
            .env(DUPLICATE_MODE_ENV, policy.as_str())
            .output()
            .await
            .map_err(UploadError::Spawn)?;

        if output.status.success() {
            return Ok(());
        }

        Err(UploadError::CommandFailed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Logs the hand-off and reports success without running anything
///
/// Backs the `--dry-run` flag: the full watch pipeline runs, including
/// processed-set bookkeeping, but nothing leaves the machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunUploader;

#[async_trait]
impl Uploader for DryRunUploader {
    async fn upload(&self, folder: &Path, policy: DuplicatePolicy) -> Result<(), UploadError> {
        info!(
            "Dry run: would upload {} (duplicates: {})",
            folder.display(),
            policy
        );
        Ok(())
    }
}

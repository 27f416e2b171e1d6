//! Shared CLI helpers

use anyhow::{bail, Result};
use watcher::{DryRunUploader, ExecUploader, Uploader};

/// Pick the uploader from CLI arguments
///
/// Exactly one of an upload command (after `--`) or `--dry-run` must be
/// given; anything else is a usage error surfaced before any watching
/// starts.
pub fn select_uploader(upload_command: Vec<String>, dry_run: bool) -> Result<Box<dyn Uploader>> {
    if dry_run {
        if !upload_command.is_empty() {
            bail!("--dry-run and an upload command are mutually exclusive");
        }
        return Ok(Box::new(DryRunUploader));
    }

    match ExecUploader::from_argv(upload_command) {
        Some(uploader) => Ok(Box::new(uploader)),
        None => bail!("no upload command given: pass one after `--`, or use --dry-run"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_selects_noop_uploader() {
        assert!(select_uploader(vec![], true).is_ok());
    }

    #[test]
    fn test_command_selects_exec_uploader() {
        let argv = vec!["consume.sh".to_string(), "--verbose".to_string()];
        assert!(select_uploader(argv, false).is_ok());
    }

    #[test]
    fn test_no_uploader_is_a_usage_error() {
        let err = select_uploader(vec![], false).err().unwrap();
        assert!(err.to_string().contains("--dry-run"));
    }

    #[test]
    fn test_dry_run_conflicts_with_command() {
        let err = select_uploader(vec!["consume.sh".to_string()], true).err().unwrap();
        assert!(err.to_string().contains("mutually exclusive"));
    }
}

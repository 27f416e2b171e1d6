//! Stabilization-aware drop-directory watching
//!
//! This crate provides:
//! - Folder content fingerprints and the stability test (name/size/mtime)
//! - The poll-driven watch loop with per-folder at-most-once dispatch
//! - Collaborator traits for folder enumeration and upload transport
//! - An exec-based uploader and a dry-run uploader

pub mod error;
pub mod fingerprint;
pub mod lister;
pub mod upload;
pub mod watch;

// Re-exports
pub use error::{ListError, StartupError, UploadError};
pub use fingerprint::{is_stable, FileSig, FolderFingerprint};
pub use lister::{FolderEntry, FolderId, FolderLister, FsFolderLister};
pub use upload::{
    DryRunUploader, DuplicatePolicy, ExecUploader, ParsePolicyError, Uploader,
    DUPLICATE_MODE_ENV,
};
pub use watch::{DirWatcher, RunStats, WatchConfig};

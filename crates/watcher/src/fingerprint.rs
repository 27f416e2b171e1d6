//! Folder content fingerprints for stabilization detection
//!
//! A folder that is still being copied into the drop directory must not be
//! uploaded mid-write. Instead of locking or content hashing, the watcher
//! snapshots the folder's immediate member files as (name, size, mtime)
//! triples and only treats the folder as settled once a later snapshot shows
//! the same contents with at least the stability window elapsed in between.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tokio::time::Instant;

/// Size and modification time of a single member file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSig {
    /// File size in bytes
    pub len: u64,

    /// Filesystem modification timestamp
    pub modified: SystemTime,
}

/// Snapshot of a folder's immediate member files at one instant
///
/// Equal entries mean no file was added, removed, renamed, resized, or
/// rewritten between two captures. Entries live in a `BTreeMap`, so the
/// order in which the filesystem returned them never matters.
#[derive(Debug, Clone)]
pub struct FolderFingerprint {
    /// Member file name -> (size, mtime)
    entries: BTreeMap<String, FileSig>,

    /// When the snapshot was taken (monotonic, virtualizable in tests)
    taken_at: Instant,
}

impl FolderFingerprint {
    /// Capture a fingerprint of the folder's immediate member files
    ///
    /// Only regular files count; document drop folders are flat, so
    /// subdirectories and symlinks are not fingerprinted. Fails if the
    /// folder disappears or turns unreadable mid-read, which callers
    /// treat as "not yet stable".
    pub fn capture(folder: &Path) -> io::Result<Self> {
        let mut entries = BTreeMap::new();

        for entry in fs::read_dir(folder)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let metadata = entry.metadata()?;
            entries.insert(
                entry.file_name().to_string_lossy().into_owned(),
                FileSig {
                    len: metadata.len(),
                    modified: metadata.modified()?,
                },
            );
        }

        Ok(Self {
            entries,
            taken_at: Instant::now(),
        })
    }

    /// Instant at which this snapshot was captured
    pub fn taken_at(&self) -> Instant {
        self.taken_at
    }

    /// Number of member files in the snapshot
    pub fn file_count(&self) -> usize {
        self.entries.len()
    }

    /// True if both snapshots saw exactly the same member files
    pub fn same_contents(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

/// Stability test between two captures of the same folder
///
/// A folder is stable once `current` shows the same contents as `baseline`
/// and at least `stability_wait` elapsed between the two captures. The
/// window measures continuous quiescence: callers keep the baseline while
/// contents stay unchanged and replace it only when something changed.
pub fn is_stable(
    baseline: &FolderFingerprint,
    current: &FolderFingerprint,
    stability_wait: Duration,
) -> bool {
    baseline.same_contents(current)
        && current.taken_at.duration_since(baseline.taken_at) >= stability_wait
}

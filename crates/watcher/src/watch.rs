//! The poll-driven watch loop
//!
//! A single logical thread of control polls the drop directory, tracks each
//! candidate folder from first sighting through stabilization to a terminal
//! uploaded/failed state, and hands every folder to the uploader at most
//! once per run. There is no persistence: restarting the process re-uploads
//! whatever still sits in the drop directory.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::StartupError;
use crate::fingerprint::{is_stable, FolderFingerprint};
use crate::lister::{FolderEntry, FolderId, FolderLister};
use crate::upload::{DuplicatePolicy, Uploader};

/// Tuning knobs for a watch run
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Delay between drop-directory scans
    pub poll_interval: Duration,

    /// How long a folder must stay unchanged before it is uploaded
    pub stability_wait: Duration,

    /// Duplicate handling passed through to the uploader
    pub policy: DuplicatePolicy,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            stability_wait: Duration::from_secs(2),
            policy: DuplicatePolicy::default(),
        }
    }
}

/// Counters reported when a watch run stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// New-folder sightings (a folder that vanishes and returns counts again)
    pub discovered: u64,

    /// Folders handed to the uploader that reported success
    pub uploaded: u64,

    /// Folders whose upload failed (never retried within the run)
    pub failed: u64,
}

impl RunStats {
    /// Total folders that reached a terminal state
    pub fn processed(&self) -> u64 {
        self.uploaded + self.failed
    }
}

/// What one observation of a tracked folder revealed
enum Observation {
    /// First sighting, baseline recorded
    New,
    /// Contents moved since the baseline
    Changed,
    /// Unchanged, but the stability window has not elapsed yet
    Quiet,
    /// Unchanged for at least the stability window
    Stable,
}

/// Watches one drop directory and uploads folders as they stabilize
///
/// The watcher owns all per-run state: the fingerprint baselines of folders
/// still settling, and the set of folders already handed off. Collaborators
/// (folder enumeration, upload transport) come in as trait references so
/// tests can substitute them wholesale.
pub struct DirWatcher {
    /// The drop directory being watched
    root: PathBuf,

    /// Tuning knobs
    config: WatchConfig,

    /// Baseline fingerprints of folders seen but not yet confirmed stable
    pending: HashMap<FolderId, FolderFingerprint>,

    /// Folders already dispatched this run; never reprocessed
    processed: HashSet<FolderId>,

    /// Terminal-state counters for the shutdown summary
    stats: RunStats,
}

impl DirWatcher {
    /// Create a watcher over `root`; no filesystem access happens yet
    pub fn new(root: impl Into<PathBuf>, config: WatchConfig) -> Self {
        Self {
            root: root.into(),
            config,
            pending: HashMap::new(),
            processed: HashSet::new(),
            stats: RunStats::default(),
        }
    }

    /// The drop directory this watcher polls
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Folders currently waiting out the stability window
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Folders already dispatched this run (uploaded or failed)
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Run the watch loop until the token is cancelled
    ///
    /// Fails only on startup validation; every later error (unreadable
    /// root, vanished folder, failed upload) is logged and survived.
    /// Cancellation is cooperative: an in-flight poll cycle, including any
    /// in-flight upload, always finishes before the loop exits.
    pub async fn run<L, U>(
        mut self,
        lister: &L,
        uploader: &U,
        cancel: CancellationToken,
    ) -> Result<RunStats, StartupError>
    where
        L: FolderLister + ?Sized,
        U: Uploader + ?Sized,
    {
        self.validate_root()?;

        info!(
            "Watching {} (poll {:?}, stability {:?}, duplicates: {})",
            self.root.display(),
            self.config.poll_interval,
            self.config.stability_wait,
            self.config.policy
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            self.poll_cycle(lister, uploader).await;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.config.poll_interval) => {}
            }
        }

        info!(
            "Watcher stopped: {} discovered, {} uploaded, {} failed",
            self.stats.discovered, self.stats.uploaded, self.stats.failed
        );
        Ok(self.stats)
    }

    /// Scan the drop directory once and advance every tracked folder
    ///
    /// Exposed for embedding and tests; `run` calls this on every tick.
    pub async fn poll_cycle<L, U>(&mut self, lister: &L, uploader: &U)
    where
        L: FolderLister + ?Sized,
        U: Uploader + ?Sized,
    {
        let entries = match lister.list_folders(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Skipping poll cycle: {}", e);
                return;
            }
        };

        self.drop_vanished(&entries);

        for entry in entries {
            if self.processed.contains(&entry.id) {
                continue;
            }
            self.track(&entry, uploader).await;
        }
    }

    /// Forget pending folders the listing no longer reports
    ///
    /// A folder deleted mid-wait is not an error and never becomes
    /// processed; its baseline is dropped so a later folder under the same
    /// name starts a fresh stability window. Only runs on a successful
    /// listing: a failed listing says nothing about individual folders.
    fn drop_vanished(&mut self, entries: &[FolderEntry]) {
        let listed: HashSet<&FolderId> = entries.iter().map(|entry| &entry.id).collect();
        self.pending.retain(|id, _| {
            if listed.contains(id) {
                return true;
            }
            debug!("Folder {} disappeared before stabilizing", id);
            false
        });
    }

    /// Advance one folder through the stabilization state machine
    async fn track<U>(&mut self, entry: &FolderEntry, uploader: &U)
    where
        U: Uploader + ?Sized,
    {
        let current = match FolderFingerprint::capture(&entry.path) {
            Ok(fingerprint) => fingerprint,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Listed a moment ago, gone now. Forget it without marking
                // it processed; a folder of the same name later is new.
                if self.pending.remove(&entry.id).is_some() {
                    debug!("Folder {} disappeared before stabilizing", entry.id);
                }
                return;
            }
            Err(e) => {
                warn!("Cannot fingerprint {}: {}", entry.id, e);
                return;
            }
        };

        let observation = match self.pending.get(&entry.id) {
            None => Observation::New,
            Some(baseline) if !baseline.same_contents(&current) => Observation::Changed,
            Some(baseline) => {
                if is_stable(baseline, &current, self.config.stability_wait) {
                    Observation::Stable
                } else {
                    Observation::Quiet
                }
            }
        };

        match observation {
            Observation::New => {
                info!(
                    "New folder detected: {} ({} files)",
                    entry.id,
                    current.file_count()
                );
                self.stats.discovered += 1;
                self.pending.insert(entry.id.clone(), current);
            }
            Observation::Changed => {
                debug!("Folder {} still changing, stability window restarted", entry.id);
                self.pending.insert(entry.id.clone(), current);
            }
            Observation::Quiet => {
                // Keep the existing baseline: the window measures quiescence
                // since the first unchanged observation.
                debug!("Folder {} quiet, stability window still open", entry.id);
            }
            Observation::Stable => {
                self.pending.remove(&entry.id);
                info!("Folder {} stable, uploading", entry.id);
                self.dispatch(entry, uploader).await;
            }
        }
    }

    /// Hand one stable folder to the uploader and record the outcome
    async fn dispatch<U>(&mut self, entry: &FolderEntry, uploader: &U)
    where
        U: Uploader + ?Sized,
    {
        match uploader.upload(&entry.path, self.config.policy).await {
            Ok(()) => {
                self.stats.uploaded += 1;
                info!("Uploaded {}", entry.id);
            }
            Err(e) => {
                self.stats.failed += 1;
                error!("Upload failed for {}: {}", entry.id, e);
            }
        }

        // Terminal either way: one upload attempt per folder per run
        self.processed.insert(entry.id.clone());
    }

    fn validate_root(&self) -> Result<(), StartupError> {
        match fs::metadata(&self.root) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(StartupError::RootNotADirectory(self.root.clone())),
            Err(_) => Err(StartupError::RootMissing(self.root.clone())),
        }
    }
}

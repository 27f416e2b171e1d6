//! Candidate folder discovery under the watch root
//!
//! One document equals one folder directly under the drop directory. Loose
//! files in the root are not candidates, and dot-directories are treated as
//! scratch space and skipped.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ListError;

/// Identity of a candidate folder: its base name within the watch root
///
/// Identity is name-based on purpose. Deleting a folder and recreating it
/// under the same name within one run yields the same identity, so an
/// already-processed folder stays skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(String);

impl FolderId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A candidate folder reported by a lister
#[derive(Debug, Clone)]
pub struct FolderEntry {
    /// Identity (base name) of the folder
    pub id: FolderId,

    /// Full path to the folder
    pub path: PathBuf,
}

/// Enumerates candidate document folders directly under the watch root
///
/// Implementations must fail loudly when the root cannot be read rather
/// than silently return a partial list; the watch loop skips the whole
/// cycle on failure.
pub trait FolderLister: Send + Sync {
    /// List candidate folders under `root`, sorted by identity
    fn list_folders(&self, root: &Path) -> Result<Vec<FolderEntry>, ListError>;
}

/// Lister backed by the real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFolderLister;

impl FolderLister for FsFolderLister {
    fn list_folders(&self, root: &Path) -> Result<Vec<FolderEntry>, ListError> {
        let list_err = |source| ListError {
            path: root.to_path_buf(),
            source,
        };

        let mut folders = Vec::new();
        for entry in fs::read_dir(root).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            if !entry.file_type().map_err(list_err)?.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            folders.push(FolderEntry {
                id: FolderId::new(name),
                path: entry.path(),
            });
        }

        // Deterministic discovery order regardless of filesystem ordering
        folders.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(folders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lists_only_directories() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("invoice-0042")).unwrap();
        fs::write(temp_dir.path().join("stray.pdf"), b"not a folder").unwrap();

        let folders = FsFolderLister.list_folders(temp_dir.path()).unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].id.as_str(), "invoice-0042");
        assert_eq!(folders[0].path, temp_dir.path().join("invoice-0042"));
    }

    #[test]
    fn test_dot_directories_skipped() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".incoming")).unwrap();
        fs::create_dir(temp_dir.path().join("report")).unwrap();

        let folders = FsFolderLister.list_folders(temp_dir.path()).unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].id.as_str(), "report");
    }

    #[test]
    fn test_sorted_by_name() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["zebra", "alpha", "median"] {
            fs::create_dir(temp_dir.path().join(name)).unwrap();
        }

        let folders = FsFolderLister.list_folders(temp_dir.path()).unwrap();
        let ids: Vec<&str> = folders.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["alpha", "median", "zebra"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let gone = temp_dir.path().join("never-created");

        let err = FsFolderLister.list_folders(&gone).unwrap_err();
        assert_eq!(err.path, gone);
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }
}

//! Modification-time snapshots.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

/// Map from file path to last modification time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    files: BTreeMap<PathBuf, SystemTime>,
}

/// Differences between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Paths present only in the newer snapshot
    pub added: Vec<PathBuf>,

    /// Paths present only in the older snapshot
    pub removed: Vec<PathBuf>,

    /// Paths whose modification time changed
    pub modified: Vec<PathBuf>,
}

impl ChangeSet {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Total number of changed paths.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

impl Snapshot {
    /// Capture every file under `root`, skipping the `exclude` subtree.
    ///
    /// Files that vanish between listing and stat are omitted.
    pub fn capture(root: &Path, exclude: &Path) -> Self {
        let files = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !e.path().starts_with(exclude))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let modified = e.metadata().ok()?.modified().ok()?;
                Some((e.into_path(), modified))
            })
            .collect();

        Self { files }
    }

    /// Number of files in the snapshot.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the snapshot holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[cfg(test)]
    fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Compute what changed from `self` to `newer`.
    pub fn diff(&self, newer: &Snapshot) -> ChangeSet {
        let mut changes = ChangeSet::default();

        for (path, modified) in &newer.files {
            match self.files.get(path) {
                None => changes.added.push(path.clone()),
                Some(old) if old != modified => changes.modified.push(path.clone()),
                Some(_) => {}
            }
        }

        changes.removed = self
            .files
            .keys()
            .filter(|path| !newer.files.contains_key(*path))
            .cloned()
            .collect();

        changes
    }
}

/// Take a fresh snapshot and compare it with `previous`.
///
/// Returns the new snapshot, to be passed to the next poll, together with the
/// changes if the tree differs.
pub fn poll(previous: &Snapshot, root: &Path, exclude: &Path) -> (Snapshot, Option<ChangeSet>) {
    let current = Snapshot::capture(root, exclude);

    if current == *previous {
        return (current, None);
    }

    let changes = previous.diff(&current);
    (current, Some(changes))
}

//! Blocking poll loop.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::snapshot::{poll, ChangeSet, Snapshot};

/// Errors that can occur when starting the watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Watch root not found: {0}")]
    MissingRoot(PathBuf),
}

/// Polling file watcher.
///
/// Runs on the calling thread until the `running` flag is cleared.
pub struct PollWatcher {
    root: PathBuf,
    exclude: PathBuf,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl PollWatcher {
    /// Create a watcher for `root`, ignoring everything under `exclude`.
    pub fn new(
        root: impl Into<PathBuf>,
        exclude: impl Into<PathBuf>,
        interval: Duration,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            root: root.into(),
            exclude: exclude.into(),
            interval,
            running,
        }
    }

    /// Poll until stopped, calling `on_change` once per detected change.
    ///
    /// The stop flag is checked between ticks, so a rebuild in progress
    /// always finishes.
    pub fn run<F>(&self, mut on_change: F) -> Result<(), WatchError>
    where
        F: FnMut(&ChangeSet),
    {
        if !self.root.exists() {
            return Err(WatchError::MissingRoot(self.root.clone()));
        }

        let mut last = Snapshot::capture(&self.root, &self.exclude);
        tracing::debug!(
            "Watching {} files under {}",
            last.len(),
            self.root.display()
        );

        while self.running.load(Ordering::SeqCst) {
            thread::sleep(self.interval);

            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let (current, changes) = poll(&last, &self.root, &self.exclude);
            if let Some(changes) = changes {
                tracing::debug!(
                    "{} added, {} removed, {} modified",
                    changes.added.len(),
                    changes.removed.len(),
                    changes.modified.len()
                );
                on_change(&changes);
            }
            last = current;
        }

        tracing::info!("Watch mode stopped.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn watcher(root: &std::path::Path, running: &Arc<AtomicBool>) -> PollWatcher {
        PollWatcher::new(
            root,
            root.join("dist"),
            Duration::from_millis(20),
            Arc::clone(running),
        )
    }

    #[test]
    fn triggers_once_per_change() {
        let temp = tempdir().unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let file = temp.path().join("app.js");

        let writer = {
            let file = file.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                fs::write(file, "changed").unwrap();
            })
        };

        let mut calls = 0;
        let stop = Arc::clone(&running);
        watcher(temp.path(), &running)
            .run(|changes| {
                calls += 1;
                assert_eq!(changes.added.len(), 1);
                stop.store(false, Ordering::SeqCst);
            })
            .unwrap();

        writer.join().unwrap();
        assert_eq!(calls, 1);
    }

    #[test]
    fn unchanged_tree_never_triggers() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("index.html"), "").unwrap();
        let running = Arc::new(AtomicBool::new(true));

        let stopper = {
            let running = Arc::clone(&running);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(150));
                running.store(false, Ordering::SeqCst);
            })
        };

        let mut calls = 0;
        watcher(temp.path(), &running).run(|_| calls += 1).unwrap();

        stopper.join().unwrap();
        assert_eq!(calls, 0);
    }

    #[test]
    fn output_writes_do_not_retrigger() {
        let temp = tempdir().unwrap();
        let dist = temp.path().join("dist");
        fs::create_dir_all(&dist).unwrap();
        let running = Arc::new(AtomicBool::new(true));

        let writer = {
            let root = temp.path().to_path_buf();
            let running = Arc::clone(&running);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(60));
                fs::write(root.join("index.html"), "v1").unwrap();
                thread::sleep(Duration::from_millis(200));
                running.store(false, Ordering::SeqCst);
            })
        };

        let mut calls = 0;
        watcher(temp.path(), &running)
            .run(|_| {
                calls += 1;
                fs::write(dist.join("anonymat-0.0.0.html"), "built").unwrap();
            })
            .unwrap();

        writer.join().unwrap();
        assert_eq!(calls, 1);
    }

    #[test]
    fn stopped_watcher_returns_immediately() {
        let temp = tempdir().unwrap();
        let running = Arc::new(AtomicBool::new(false));

        let result = watcher(temp.path(), &running).run(|_| panic!("no polls expected"));

        assert!(result.is_ok());
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = tempdir().unwrap();
        let running = Arc::new(AtomicBool::new(true));

        let result = watcher(&temp.path().join("nope"), &running).run(|_| {});

        assert!(matches!(result, Err(WatchError::MissingRoot(_))));
    }
}

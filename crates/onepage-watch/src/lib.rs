//! Polling file watcher for onepage.
//!
//! Detects changes by comparing full modification-time snapshots of a
//! directory tree between polls.

pub mod snapshot;
pub mod watcher;

pub use snapshot::{poll, ChangeSet, Snapshot};
pub use watcher::{PollWatcher, WatchError};

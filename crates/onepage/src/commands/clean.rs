//! Test build removal.

use onepage_bundle::{Bundler, DeleteOutcome};

/// Remove the current-version test bundle. Failures are reported, not raised.
pub fn run(bundler: &Bundler) {
    match bundler.delete_test_build() {
        DeleteOutcome::Deleted(path) => {
            tracing::info!("Test build deleted: {}", path.display());
        }
        DeleteOutcome::NotFound(_) => tracing::info!("No test build to delete."),
        DeleteOutcome::Failed { path, error } => {
            tracing::error!("Error deleting test build {}: {}", path.display(), error);
        }
    }
}

//! Continuous rebuild command.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use onepage_bundle::{Bundler, Variant};
use onepage_watch::PollWatcher;

use super::build;
use super::test::TestSettings;

/// Rebuild `variant` whenever the source tree changes, until Ctrl+C.
pub fn run(
    bundler: &Bundler,
    variant: Variant,
    tests: Option<&TestSettings>,
    interval: Duration,
) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")?;

    tracing::info!("Watch mode active. Press Ctrl+C to exit.");

    let watcher = PollWatcher::new(
        bundler.config().root.clone(),
        bundler.output_dir(),
        interval,
        running,
    );

    watcher.run(|changes| {
        tracing::debug!("{} paths changed, rebuilding", changes.len());
        if let Err(e) = build::run(bundler, variant, tests) {
            tracing::error!("{:#}", e);
        }
    })?;

    Ok(())
}

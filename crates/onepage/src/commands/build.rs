//! Bundle build command.

use anyhow::{Context, Result};
use onepage_bundle::{Bundler, Variant};

use super::test::{self, TestSettings};

/// Build one bundle, then run its tests if requested.
pub fn run(bundler: &Bundler, variant: Variant, tests: Option<&TestSettings>) -> Result<()> {
    let artifact = bundler
        .build(variant)
        .with_context(|| format!("Failed to build {} bundle", variant))?;

    match variant {
        Variant::Normal => tracing::info!("Build completed: {}", artifact.path.display()),
        Variant::Test => tracing::info!("Test build created: {}", artifact.path.display()),
    }

    if let Some(settings) = tests {
        if !test::run(&artifact.path, settings) {
            anyhow::bail!("Tests failed for {}", artifact.path.display());
        }
    }

    Ok(())
}

//! onepage CLI - bundle a multi-file web app into a single HTML file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use onepage_bundle::{Bundler, Variant};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "onepage")]
#[command(about = "Bundle a multi-file web app into a single versioned HTML file")]
#[command(version)]
pub struct Cli {
    /// Path to onepage.toml config file
    #[arg(short, long, default_value = "onepage.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Watch for changes and rebuild
    #[arg(short, long)]
    watch: bool,

    /// Build the test version instead of the normal one
    #[arg(short, long)]
    test: bool,

    /// Run the embedded test suite in headless Chrome after each test build
    #[arg(long, requires = "test")]
    run: bool,

    /// Delete the existing test build and exit
    #[arg(short, long, conflicts_with_all = ["watch", "test"])]
    delete_testbuild: bool,

    /// Do not write the unversioned dist/index.html copy
    #[arg(long)]
    no_latest: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let config = config::load(&cli.config)?;
    let bundler = Bundler::new(config.bundle_config(!cli.no_latest));

    if cli.delete_testbuild {
        commands::clean::run(&bundler);
        return Ok(());
    }

    let variant = if cli.test {
        Variant::Test
    } else {
        Variant::Normal
    };
    let tests = cli.run.then(|| commands::test::TestSettings::from(&config));

    if cli.watch {
        if let Err(e) = commands::build::run(&bundler, variant, tests.as_ref()) {
            tracing::error!("{:#}", e);
        }
        return commands::watch::run(&bundler, variant, tests.as_ref(), config.poll_interval());
    }

    commands::build::run(&bundler, variant, tests.as_ref())
}

//! Configuration file (onepage.toml).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use onepage_bundle::BundleConfig;
use serde::Deserialize;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub test: TestConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub build: BuildSettings,
}

#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_version_file")]
    pub version_file: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    #[serde(default = "default_harness")]
    pub harness: PathBuf,
    #[serde(default = "default_result_global")]
    pub result_global: String,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    /// Also write dist/index.html for normal builds
    #[serde(default = "default_true")]
    pub latest_copy: bool,
    #[serde(default)]
    pub minify_css: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            root: default_root(),
            input: default_input(),
            version_file: default_version_file(),
            output: default_output(),
        }
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            harness: default_harness(),
            result_global: default_result_global(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            latest_copy: true,
            minify_css: false,
        }
    }
}

fn default_name() -> String {
    "anonymat".to_string()
}
fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_input() -> PathBuf {
    PathBuf::from("index.html")
}
fn default_version_file() -> PathBuf {
    PathBuf::from("version.txt")
}
fn default_output() -> PathBuf {
    PathBuf::from("dist")
}
fn default_harness() -> PathBuf {
    PathBuf::from("test.js")
}
fn default_result_global() -> String {
    "window.testResults".to_string()
}
fn default_settle_ms() -> u64 {
    5000
}
fn default_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

impl ConfigFile {
    /// Bundler configuration derived from the file.
    pub fn bundle_config(&self, latest_copy: bool) -> BundleConfig {
        BundleConfig {
            root: self.project.root.clone(),
            input: self.project.input.clone(),
            version_file: self.project.version_file.clone(),
            output_dir: self.project.output.clone(),
            name: self.project.name.clone(),
            harness: self.test.harness.clone(),
            latest_copy: latest_copy && self.build.latest_copy,
            minify_css: self.build.minify_css,
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.test.settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.watch.interval_ms)
    }
}

/// Load configuration if the file exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

//! Bundle builder.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Instant;

use regex::{Captures, Regex};

use crate::inline::{find_references, AssetInliner, AssetKind};
use crate::version::{read_version, stamp_version};

/// Configuration for building bundles.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Working root; every relative path below resolves against it
    pub root: PathBuf,

    /// Root HTML document
    pub input: PathBuf,

    /// Single-line version file
    pub version_file: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Artifact name prefix
    pub name: String,

    /// Test harness script injected into test builds
    pub harness: PathBuf,

    /// Also write an unversioned `index.html` for normal builds
    pub latest_copy: bool,

    /// Minify inlined stylesheets
    pub minify_css: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            input: PathBuf::from("index.html"),
            version_file: PathBuf::from("version.txt"),
            output_dir: PathBuf::from("dist"),
            name: "anonymat".to_string(),
            harness: PathBuf::from("test.js"),
            latest_copy: true,
            minify_css: false,
        }
    }
}

/// Build flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Shipped build
    Normal,
    /// Build instrumented with the test harness
    Test,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Normal => f.write_str("normal"),
            Variant::Test => f.write_str("test"),
        }
    }
}

/// A written bundle.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Where the bundle was written
    pub path: PathBuf,

    /// Full bundle content
    pub content: String,

    /// Version stamped into the bundle
    pub version: String,

    /// Build flavor
    pub variant: Variant,

    /// Total build time in milliseconds
    pub duration_ms: u64,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of removing a test build.
#[derive(Debug)]
pub enum DeleteOutcome {
    /// The artifact was removed
    Deleted(PathBuf),

    /// No artifact existed at the path
    NotFound(PathBuf),

    /// The artifact exists but could not be removed
    Failed { path: PathBuf, error: io::Error },
}

static HEAD_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head>").expect("Invalid head regex"));

/// Single-file bundle builder.
pub struct Bundler {
    config: BundleConfig,
    inliner: AssetInliner,
}

impl Bundler {
    /// Create a new bundler.
    pub fn new(config: BundleConfig) -> Self {
        let inliner = AssetInliner::new(&config.root).with_minified_css(config.minify_css);
        Self { config, inliner }
    }

    /// Builder configuration.
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Current version from the version file.
    pub fn version(&self) -> String {
        read_version(&self.resolve(&self.config.version_file))
    }

    /// Output directory resolved against the working root.
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.config.output_dir)
    }

    /// Output path for a variant at a given version.
    pub fn artifact_path(&self, variant: Variant, version: &str) -> PathBuf {
        let file_name = match variant {
            Variant::Normal => format!("{}-{}.html", self.config.name, version),
            Variant::Test => format!("{}-test-{}.html", self.config.name, version),
        };
        self.output_dir().join(file_name)
    }

    /// Build the shipped bundle.
    pub fn build_normal(&self) -> Result<Artifact, BuildError> {
        self.build(Variant::Normal)
    }

    /// Build the test-instrumented bundle.
    pub fn build_test(&self) -> Result<Artifact, BuildError> {
        self.build(Variant::Test)
    }

    /// Assemble and write a bundle.
    pub fn build(&self, variant: Variant) -> Result<Artifact, BuildError> {
        let start = Instant::now();
        let version = self.version();
        let content = self.assemble(variant, &version)?;
        let path = self.artifact_path(variant, &version);

        write_file(&path, &content)?;

        if variant == Variant::Normal && self.config.latest_copy {
            write_file(&self.output_dir().join("index.html"), &content)?;
        }

        let artifact = Artifact {
            path,
            content,
            version,
            variant,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Built {} bundle {} ({} bytes) in {}ms",
            artifact.variant,
            artifact.path.display(),
            artifact.content.len(),
            artifact.duration_ms
        );

        Ok(artifact)
    }

    /// Assemble bundle content without writing it.
    pub fn assemble(&self, variant: Variant, version: &str) -> Result<String, BuildError> {
        let input = self.resolve(&self.config.input);
        let html = fs::read_to_string(&input).map_err(|source| BuildError::Read {
            path: input.clone(),
            source,
        })?;

        for kind in AssetKind::PASSES {
            let references = find_references(&html, kind);
            tracing::debug!(
                "{} {:?} references in {}",
                references.len(),
                kind,
                input.display()
            );
        }

        let html = stamp_version(&html, version);
        let html = self.inliner.inline_all(&html);

        Ok(match variant {
            Variant::Normal => html,
            Variant::Test => inject_harness(&html, &self.harness_source()),
        })
    }

    /// Remove the test bundle for the current version.
    pub fn delete_test_build(&self) -> DeleteOutcome {
        let path = self.artifact_path(Variant::Test, &self.version());

        if !path.exists() {
            return DeleteOutcome::NotFound(path);
        }

        match fs::remove_file(&path) {
            Ok(()) => DeleteOutcome::Deleted(path),
            Err(error) => DeleteOutcome::Failed { path, error },
        }
    }

    fn harness_source(&self) -> String {
        let path = self.resolve(&self.config.harness);
        fs::read_to_string(&path).unwrap_or_else(|e| {
            tracing::warn!("Test harness {} not readable: {}", path.display(), e);
            String::new()
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.config.root.join(path)
    }
}

/// Insert the harness script immediately before every `</head>`.
pub fn inject_harness(html: &str, harness: &str) -> String {
    HEAD_CLOSE_RE
        .replace_all(html, |caps: &Captures| {
            format!("<script>\n{}\n</script>\n{}", harness, &caps[0])
        })
        .into_owned()
}

fn write_file(path: &Path, content: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| BuildError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, content).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    const INDEX: &str = r#"<!DOCTYPE html>
<html>
<head>
<link rel="stylesheet" href="style.css">
<script>window.appVersion = "0.0.0";</script>
</head>
<body>
<script src="app.js"></script>
</body>
</html>
"#;

    fn project() -> (TempDir, Bundler) {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("index.html"), INDEX).unwrap();
        fs::write(root.join("app.js"), "start();").unwrap();
        fs::write(root.join("style.css"), "body { margin: 0; }").unwrap();
        fs::write(root.join("version.txt"), "1.2.3\n").unwrap();
        fs::write(root.join("test.js"), "runAllTests();").unwrap();

        let bundler = Bundler::new(BundleConfig {
            root: root.to_path_buf(),
            ..Default::default()
        });

        (temp, bundler)
    }

    #[test]
    fn builds_normal_bundle() {
        let (temp, bundler) = project();

        let artifact = bundler.build_normal().unwrap();

        assert_eq!(artifact.path, temp.path().join("dist/anonymat-1.2.3.html"));
        assert_eq!(artifact.variant, Variant::Normal);
        assert_eq!(artifact.version, "1.2.3");

        let written = fs::read_to_string(&artifact.path).unwrap();
        assert_eq!(written, artifact.content);
        assert!(written.contains("<script>\nstart();\n</script>"));
        assert!(written.contains("<style>\nbody { margin: 0; }\n</style>"));
        assert!(written.contains(r#"window.appVersion = "1.2.3""#));
        assert!(!written.contains("0.0.0"));
        assert!(!written.contains(r#"src="app.js""#));
        assert!(!written.contains("runAllTests"));
    }

    #[test]
    fn builds_test_bundle_with_harness_before_head_close() {
        let (temp, bundler) = project();

        let artifact = bundler.build_test().unwrap();

        assert_eq!(
            artifact.path,
            temp.path().join("dist/anonymat-test-1.2.3.html")
        );
        assert!(artifact
            .content
            .contains("<script>\nrunAllTests();\n</script>\n</head>"));
    }

    #[test]
    fn missing_harness_injects_empty_script() {
        let (temp, bundler) = project();
        fs::remove_file(temp.path().join("test.js")).unwrap();

        let artifact = bundler.build_test().unwrap();

        assert!(artifact.content.contains("<script>\n\n</script>\n</head>"));
    }

    #[test]
    fn missing_version_file_uses_default() {
        let (temp, bundler) = project();
        fs::remove_file(temp.path().join("version.txt")).unwrap();

        let artifact = bundler.build_normal().unwrap();

        assert_eq!(artifact.version, "0.0.0");
        assert!(artifact.path.ends_with("anonymat-0.0.0.html"));
    }

    #[test]
    fn rebuilds_are_byte_identical() {
        let (_temp, bundler) = project();

        let first = bundler.build_normal().unwrap();
        let first_bytes = fs::read(&first.path).unwrap();
        let second = bundler.build_normal().unwrap();
        let second_bytes = fs::read(&second.path).unwrap();

        assert_eq!(first_bytes, second_bytes);

        let test_first = bundler.build_test().unwrap();
        let test_second = bundler.build_test().unwrap();
        assert_eq!(test_first.content, test_second.content);
    }

    #[test]
    fn writes_latest_copy_by_default() {
        let (temp, bundler) = project();

        let artifact = bundler.build_normal().unwrap();
        let latest = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
        assert_eq!(latest, artifact.content);

        fs::remove_file(temp.path().join("dist/index.html")).unwrap();
        bundler.build_test().unwrap();
        assert!(!temp.path().join("dist/index.html").exists());
    }

    #[test]
    fn skips_latest_copy_when_disabled() {
        let (temp, _) = project();
        let bundler = Bundler::new(BundleConfig {
            root: temp.path().to_path_buf(),
            latest_copy: false,
            ..Default::default()
        });

        bundler.build_normal().unwrap();

        assert!(!temp.path().join("dist/index.html").exists());
    }

    #[test]
    fn asset_version_marker_is_left_alone() {
        let (temp, bundler) = project();
        fs::write(temp.path().join("app.js"), r#"window.appVersion = "dev";"#).unwrap();

        let html = bundler.assemble(Variant::Normal, "1.2.3").unwrap();

        assert!(html.contains(r#"<script>window.appVersion = "1.2.3";</script>"#));
        assert!(html.contains("<script>\nwindow.appVersion = \"dev\";\n</script>"));
    }

    #[test]
    fn missing_input_is_a_read_error() {
        let temp = tempdir().unwrap();
        let bundler = Bundler::new(BundleConfig {
            root: temp.path().to_path_buf(),
            ..Default::default()
        });

        let result = bundler.build_normal();

        assert!(matches!(result, Err(BuildError::Read { .. })));
    }

    #[test]
    fn unwritable_output_is_a_write_error() {
        let (temp, _) = project();
        fs::write(temp.path().join("blocker"), "").unwrap();
        let bundler = Bundler::new(BundleConfig {
            root: temp.path().to_path_buf(),
            output_dir: PathBuf::from("blocker/dist"),
            ..Default::default()
        });

        let result = bundler.build_normal();

        assert!(matches!(result, Err(BuildError::Write { .. })));
    }

    #[test]
    fn deletes_test_build() {
        let (_temp, bundler) = project();
        let artifact = bundler.build_test().unwrap();

        match bundler.delete_test_build() {
            DeleteOutcome::Deleted(path) => assert_eq!(path, artifact.path),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!artifact.path.exists());
        assert!(matches!(
            bundler.delete_test_build(),
            DeleteOutcome::NotFound(_)
        ));
    }

    #[test]
    fn injects_harness_case_insensitively() {
        let out = inject_harness("<HEAD></HEAD><body></body>", "t();");

        assert_eq!(out, "<HEAD><script>\nt();\n</script>\n</HEAD><body></body>");
    }
}

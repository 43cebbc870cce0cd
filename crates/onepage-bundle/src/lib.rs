//! Single-file HTML bundling.
//!
//! Inlines external scripts and stylesheets into an HTML shell, stamps the
//! application version, and writes normal or test-instrumented artifacts.

pub mod assets;
pub mod builder;
pub mod inline;
pub mod version;

pub use assets::MinifyError;
pub use builder::{
    inject_harness, Artifact, BuildError, BundleConfig, Bundler, DeleteOutcome, Variant,
};
pub use inline::{find_references, AssetInliner, AssetKind, AssetReference};
pub use version::{read_version, stamp_version, DEFAULT_VERSION};

//! Version stamping.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Version used when no version file exists.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Global the application reads its version from.
const VERSION_GLOBAL: &str = "window.appVersion";

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"{}\s*=\s*".*?""#, regex::escape(VERSION_GLOBAL)))
        .expect("Invalid version regex")
});

/// Read the version from a single-line version file.
///
/// Falls back to [`DEFAULT_VERSION`] when the file is missing or unreadable.
pub fn read_version(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content.trim().to_string(),
        Err(e) => {
            tracing::warn!(
                "Version file {} not readable ({}), using {}",
                path.display(),
                e,
                DEFAULT_VERSION
            );
            DEFAULT_VERSION.to_string()
        }
    }
}

/// Rewrite every `window.appVersion = "..."` assignment to `version`.
///
/// Documents without an assignment are returned unchanged.
pub fn stamp_version(html: &str, version: &str) -> String {
    VERSION_RE
        .replace_all(html, |_: &Captures| {
            format!(r#"{} = "{}""#, VERSION_GLOBAL, version)
        })
        .into_owned()
}

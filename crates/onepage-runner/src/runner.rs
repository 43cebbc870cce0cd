//! Test bundle execution.

use std::path::Path;
use std::time::Duration;

use crate::engine::RenderEngine;
use crate::result::{LogEntry, TestResult};

/// What a test run produced.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// Parsed result global, absent if the page never set it
    pub result: Option<TestResult>,

    /// Full console log of the page
    pub logs: Vec<LogEntry>,
}

/// Runs a test bundle inside a render engine.
#[derive(Debug, Clone)]
pub struct TestRunner {
    settle: Duration,
    result_global: String,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(5),
            result_global: "window.testResults".to_string(),
        }
    }
}

/// Releases the engine when dropped, including on unwind.
struct ReleaseGuard<'a, E: RenderEngine + ?Sized> {
    engine: &'a mut E,
}

impl<E: RenderEngine + ?Sized> Drop for ReleaseGuard<'_, E> {
    fn drop(&mut self) {
        self.engine.release();
    }
}

impl TestRunner {
    /// Create a runner that waits `settle` before reading `result_global`.
    pub fn new(settle: Duration, result_global: impl Into<String>) -> Self {
        Self {
            settle,
            result_global: result_global.into(),
        }
    }

    /// Load `artifact`, let the suite run, and collect its results.
    ///
    /// The engine is released before this returns on every path.
    pub fn run<E: RenderEngine + ?Sized>(&self, engine: &mut E, artifact: &Path) -> RunOutcome {
        let mut guard = ReleaseGuard { engine };
        let url = file_url(artifact);

        tracing::info!("Running tests in {}", url);

        if let Err(e) = guard.engine.load(&url) {
            tracing::error!("{}", e);
            return RunOutcome {
                result: None,
                logs: guard.engine.console_log(),
            };
        }

        guard.engine.wait(self.settle);

        let result = self.read_result(&mut *guard.engine);
        let logs = guard.engine.console_log();

        RunOutcome { result, logs }
    }

    fn read_result<E: RenderEngine + ?Sized>(&self, engine: &mut E) -> Option<TestResult> {
        let expression = format!("JSON.stringify({})", self.result_global);

        let value = match engine.evaluate(&expression) {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::warn!("Page did not set {}", self.result_global);
                return None;
            }
            Err(e) => {
                tracing::warn!("{}", e);
                return None;
            }
        };

        TestResult::from_page_value(value)
            .map_err(|e| tracing::warn!("Malformed {}: {}", self.result_global, e))
            .ok()
    }
}

/// Build a `file://` URL for a local path.
pub fn file_url(path: &Path) -> String {
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let mut raw = absolute.to_string_lossy().replace('\\', "/");

    // Windows verbatim prefix from canonicalize
    if let Some(stripped) = raw.strip_prefix("//?/") {
        raw = stripped.to_string();
    }

    let mut url = String::from("file://");
    if !raw.starts_with('/') {
        url.push('/');
    }

    for c in raw.chars() {
        match c {
            ' ' => url.push_str("%20"),
            '#' => url.push_str("%23"),
            '%' => url.push_str("%25"),
            '?' => url.push_str("%3F"),
            _ => url.push(c),
        }
    }

    url
}

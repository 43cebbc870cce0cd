//! Render engine capability.

use std::time::Duration;

use crate::result::LogEntry;

/// Errors raised by a render engine.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to load {url}: {message}")]
    Load { url: String, message: String },

    #[error("Failed to evaluate expression: {0}")]
    Evaluate(String),

    #[error("Browser already released")]
    Released,
}

/// A headless page the test runner can drive.
///
/// Implemented by [`crate::ChromeEngine`]; tests substitute a mock.
pub trait RenderEngine {
    /// Navigate to `url` and wait for the load to finish.
    fn load(&mut self, url: &str) -> Result<(), RunnerError>;

    /// Block for `duration` while the page keeps running.
    fn wait(&mut self, duration: Duration);

    /// Evaluate a JavaScript expression in the page.
    ///
    /// Returns `None` when the expression yields `undefined`.
    fn evaluate(&mut self, expression: &str) -> Result<Option<serde_json::Value>, RunnerError>;

    /// Every console message captured so far.
    fn console_log(&mut self) -> Vec<LogEntry>;

    /// Shut down the engine. Must be safe to call more than once.
    fn release(&mut self);
}

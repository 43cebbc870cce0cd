//! Headless test execution for onepage test builds.
//!
//! Loads a test bundle in a render engine, waits for the in-page suite to
//! settle, reads the result global and console log, and formats a report.

pub mod chrome;
pub mod engine;
pub mod report;
pub mod result;
pub mod runner;

pub use chrome::ChromeEngine;
pub use engine::{RenderEngine, RunnerError};
pub use report::{render_logs, render_report, report};
pub use result::{LogEntry, TestError, TestResult};
pub use runner::{file_url, RunOutcome, TestRunner};

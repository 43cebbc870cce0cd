//! Test results exposed by the page.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of the in-page test suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Whether every test case passed
    pub success: bool,

    /// Failing cases, in suite order
    #[serde(default)]
    pub errors: Vec<TestError>,
}

/// A single failing test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestError {
    /// Test case description
    pub description: String,

    /// Text fed to the anonymizer
    pub input: String,

    /// Expected anonymized text
    pub expected_anonymized: String,

    /// Actual anonymized text
    pub anonymize_output: String,

    /// Actual text after deanonymizing
    pub deanonymize_output: String,
}

impl TestResult {
    /// Parse the JSON value read from the page.
    ///
    /// Accepts either the object itself or its `JSON.stringify` form.
    pub fn from_page_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        match value {
            serde_json::Value::String(json) => serde_json::from_str(&json),
            other => serde_json::from_value(other),
        }
    }
}

/// A console message captured from the render engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Severity as reported by the engine
    pub level: String,

    /// Message text
    pub text: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.text)
    }
}

//! Human-readable test reports.

use std::fmt::Write;

use crate::result::{LogEntry, TestResult};

const DELIMITER: &str = "----------------------------------------";

/// Format a test result for the terminal.
pub fn render_report(result: Option<&TestResult>) -> String {
    let Some(result) = result else {
        return "Test run failed: no results were retrieved from the page.\n".to_string();
    };

    if result.success {
        return "All tests passed.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} test(s) failed:", result.errors.len());

    for error in &result.errors {
        let _ = writeln!(out, "Description: {}", error.description);
        let _ = writeln!(out, "Input: {}", error.input);
        let _ = writeln!(out, "Anonymize expected: {}", error.expected_anonymized);
        let _ = writeln!(out, "Anonymize actual: {}", error.anonymize_output);
        let _ = writeln!(out, "Deanonymize expected: {}", error.input);
        let _ = writeln!(out, "Deanonymize actual: {}", error.deanonymize_output);
        let _ = writeln!(out, "{}", DELIMITER);
    }

    out
}

/// Format captured console messages, one per line.
pub fn render_logs(logs: &[LogEntry]) -> String {
    logs.iter().map(|entry| format!("{}\n", entry)).collect()
}

/// Print a test report to stdout.
pub fn report(result: Option<&TestResult>) {
    print!("{}", render_report(result));
}

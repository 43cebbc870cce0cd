//! Stylesheet post-processing.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

/// Errors that can occur while minifying an inlined stylesheet.
#[derive(Debug, thiserror::Error)]
pub enum MinifyError {
    #[error("CSS parse error: {0}")]
    Parse(String),

    #[error("CSS print error: {0}")]
    Print(String),
}

/// Minify stylesheet content before it is inlined.
pub fn minify_css(css: &str) -> Result<String, MinifyError> {
    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| MinifyError::Parse(e.to_string()))?;

    stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map(|output| output.code)
        .map_err(|e| MinifyError::Print(e.to_string()))
}

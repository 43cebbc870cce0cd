//! Headless Chrome backend.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::{Browser, LaunchOptions, Tab};

use crate::engine::{RenderEngine, RunnerError};
use crate::result::LogEntry;

/// Render engine backed by an isolated headless Chrome process.
pub struct ChromeEngine {
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
    logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl ChromeEngine {
    /// Launch a fresh headless browser with a single tab.
    ///
    /// `idle_timeout` must exceed the settle delay, or Chrome is dropped
    /// while the page is still running.
    pub fn launch(idle_timeout: Duration) -> Result<Self, RunnerError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .idle_browser_timeout(idle_timeout)
            .build()
            .map_err(|e| RunnerError::Launch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| RunnerError::Launch(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| RunnerError::Launch(e.to_string()))?;

        let logs = Arc::new(Mutex::new(Vec::new()));
        capture_console(&tab, Arc::clone(&logs))?;

        tracing::debug!("Launched headless Chrome");

        Ok(Self {
            browser: Some(browser),
            tab: Some(tab),
            logs,
        })
    }

    fn tab(&self) -> Result<&Arc<Tab>, RunnerError> {
        self.tab.as_ref().ok_or(RunnerError::Released)
    }
}

/// Forward console and log-domain events into `logs`.
fn capture_console(tab: &Arc<Tab>, logs: Arc<Mutex<Vec<LogEntry>>>) -> Result<(), RunnerError> {
    tab.enable_log().map_err(|e| RunnerError::Launch(e.to_string()))?;
    tab.enable_runtime().map_err(|e| RunnerError::Launch(e.to_string()))?;

    tab.add_event_listener(Arc::new(move |event: &Event| {
        let entry = match event {
            Event::LogEntryAdded(e) => LogEntry {
                level: format!("{:?}", e.params.entry.level).to_lowercase(),
                text: e.params.entry.text.clone(),
            },
            Event::RuntimeConsoleAPICalled(e) => LogEntry {
                level: "console".to_string(),
                text: e
                    .params
                    .args
                    .iter()
                    .map(|arg| match (&arg.value, &arg.description) {
                        (Some(serde_json::Value::String(s)), _) => s.clone(),
                        (Some(value), _) => value.to_string(),
                        (None, Some(description)) => description.clone(),
                        (None, None) => String::new(),
                    })
                    .collect::<Vec<_>>()
                    .join(" "),
            },
            _ => return,
        };

        if let Ok(mut logs) = logs.lock() {
            logs.push(entry);
        }
    }))
    .map_err(|e| RunnerError::Launch(e.to_string()))?;

    Ok(())
}

impl RenderEngine for ChromeEngine {
    fn load(&mut self, url: &str) -> Result<(), RunnerError> {
        let tab = self.tab()?;
        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| RunnerError::Load {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn wait(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    fn evaluate(&mut self, expression: &str) -> Result<Option<serde_json::Value>, RunnerError> {
        let object = self
            .tab()?
            .evaluate(expression, false)
            .map_err(|e| RunnerError::Evaluate(e.to_string()))?;
        Ok(object.value)
    }

    fn console_log(&mut self) -> Vec<LogEntry> {
        self.logs
            .lock()
            .map(|logs| logs.clone())
            .unwrap_or_default()
    }

    fn release(&mut self) {
        if let Some(tab) = self.tab.take() {
            let _ = tab.close(false);
        }
        if self.browser.take().is_some() {
            tracing::debug!("Released headless Chrome");
        }
    }
}

impl Drop for ChromeEngine {
    fn drop(&mut self) {
        self.release();
    }
}

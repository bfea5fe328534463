// Report module - console output and file reports

pub mod console;
pub mod format;
pub mod json;
pub mod junit;

use crate::state::TestSuiteResult;
use anyhow::Result;
pub use console::ConsoleReporter;
pub use format::{format_case, format_suite, print_case, print_suite};
pub use json::JsonReporter;
pub use junit::JunitReporter;

/// Reporter trait
pub trait Reporter {
    /// Called when a test file starts
    fn on_suite_start(&self, file_path: &str);

    /// Called when a test file finishes
    fn on_suite_end(&self, suite: &TestSuiteResult) -> Result<()>;

    /// Called once every test file has run
    fn on_run_end(&self, suites: &[TestSuiteResult]) -> Result<()>;
}

/// Escape text for XML attributes and content
pub(crate) fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

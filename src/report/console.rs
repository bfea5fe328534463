// Console reporter - go test style output

use super::Reporter;
use super::format::{format_duration, print_suite};
use crate::state::TestSuiteResult;
use anyhow::{Context, Result};
use std::cell::RefCell;
use std::io::Write;
use std::time::Duration;
use tracing::debug;

/// Console reporter
pub struct ConsoleReporter {
    sink: RefCell<Box<dyn Write>>,
}

impl ConsoleReporter {
    /// Create a console reporter writing to stdout
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Create a console reporter writing to any sink
    pub fn new(sink: Box<dyn Write>) -> Self {
        Self {
            sink: RefCell::new(sink),
        }
    }

    /// Print the closing line across all files
    fn print_summary(&self, suites: &[TestSuiteResult]) -> Result<()> {
        let files_failed = suites.iter().filter(|s| s.has_failures()).count();
        let (total, failed) = suites.iter().fold((0, 0), |(total, failed), suite| {
            let summary = suite.summary();
            (total + summary.total, failed + summary.failed)
        });
        let duration: Duration = suites.iter().map(TestSuiteResult::duration).sum();

        let mut sink = self.sink.borrow_mut();
        let verdict = if files_failed > 0 { "FAILED" } else { "PASSED" };
        writeln!(
            sink,
            "{}: {} tests in {} files, {} passed, {} failed ({})",
            verdict,
            total,
            suites.len(),
            total - failed,
            failed,
            format_duration(duration)
        )
        .context("Failed to write run summary")?;
        Ok(())
    }
}

impl Reporter for ConsoleReporter {
    fn on_suite_start(&self, file_path: &str) {
        debug!("Running {}", file_path);
    }

    fn on_suite_end(&self, suite: &TestSuiteResult) -> Result<()> {
        let mut sink = self.sink.borrow_mut();
        print_suite(suite, &mut *sink)
            .with_context(|| format!("Failed to print results for {}", suite.file_path()))?;
        sink.flush().context("Failed to flush console output")?;
        Ok(())
    }

    fn on_run_end(&self, suites: &[TestSuiteResult]) -> Result<()> {
        // A single file already ends with its own verdict line
        if suites.len() > 1 {
            self.print_summary(suites)?;
        }
        Ok(())
    }
}

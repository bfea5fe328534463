// JSON reporter - outputs test results to a JSON file

use super::Reporter;
use crate::state::{SuiteSummary, TestSuiteResult};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;

/// JSON reporter
pub struct JsonReporter {
    output_path: PathBuf,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: SuiteSummary,
    failed_files: usize,
    suites: &'a [TestSuiteResult],
}

impl JsonReporter {
    /// Create new JSON reporter
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }
}

impl Reporter for JsonReporter {
    fn on_suite_start(&self, _file_path: &str) {
        // No-op for JSON file reporter
    }

    fn on_suite_end(&self, _suite: &TestSuiteResult) -> Result<()> {
        // The whole run is written at the end
        Ok(())
    }

    fn on_run_end(&self, suites: &[TestSuiteResult]) -> Result<()> {
        let summary = suites
            .iter()
            .map(TestSuiteResult::summary)
            .fold(SuiteSummary::default(), |acc, s| SuiteSummary {
                total: acc.total + s.total,
                passed: acc.passed + s.passed,
                failed: acc.failed + s.failed,
            });
        let report = JsonReport {
            summary,
            failed_files: suites.iter().filter(|s| s.has_failures()).count(),
            suites,
        };

        let file = File::create(&self.output_path).with_context(|| {
            format!(
                "Failed to create JSON report file: {}",
                self.output_path.display()
            )
        })?;

        serde_json::to_writer_pretty(file, &report)
            .context("Failed to serialize test results to JSON")?;

        Ok(())
    }
}

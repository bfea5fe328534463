// JUnit reporter - outputs test results in JUnit XML format

use super::format::format_case;
use super::{Reporter, xml_escape};
use crate::state::{Status, TestCaseResult, TestSuiteResult};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// JUnit reporter
pub struct JunitReporter {
    output_path: PathBuf,
}

impl JunitReporter {
    /// Create new JUnit reporter
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    /// One-line reason for a failed case
    fn failure_message(case: &TestCaseResult) -> String {
        if let Some(err) = case.error() {
            return err
                .to_string()
                .lines()
                .next()
                .unwrap_or("test failed")
                .to_string();
        }
        if case.has_failed_render() {
            return "render failed".to_string();
        }
        let hooks_failed = case
            .pre_test_hooks_results()
            .iter()
            .chain(case.post_test_hooks_results())
            .filter(|hook| hook.failed())
            .count();
        if hooks_failed > 0 {
            return format!("{} hook(s) failed", hooks_failed);
        }
        let summary = case.assertion_summary();
        if summary.has_failures() {
            return format!(
                "{} assertion(s) failed, {} error(s)",
                summary.failed, summary.errors
            );
        }
        "test failed".to_string()
    }
}

impl Reporter for JunitReporter {
    fn on_suite_start(&self, _file_path: &str) {
        // No-op for JUnit file reporter
    }

    fn on_suite_end(&self, _suite: &TestSuiteResult) -> Result<()> {
        Ok(())
    }

    fn on_run_end(&self, suites: &[TestSuiteResult]) -> Result<()> {
        let total: usize = suites.iter().map(|s| s.summary().total).sum();
        let failed: usize = suites.iter().map(|s| s.summary().failed).sum();
        let skipped: usize = suites
            .iter()
            .flat_map(TestSuiteResult::results)
            .filter(|case| case.status() == Status::Skip)
            .count();
        let time: f64 = suites.iter().map(|s| s.duration().as_secs_f64()).sum();

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<testsuites name=\"xrtestify\" time=\"{:.3}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\">\n",
            time, total, failed, skipped
        ));

        for suite in suites {
            let summary = suite.summary();
            xml.push_str(&format!(
                "  <testsuite name=\"{}\" time=\"{:.3}\" tests=\"{}\" failures=\"{}\" errors=\"0\" timestamp=\"{}\">\n",
                xml_escape(suite.file_path()),
                suite.duration().as_secs_f64(),
                summary.total,
                summary.failed,
                suite.start_time().to_rfc3339()
            ));

            for case in suite.results() {
                xml.push_str(&format!(
                    "    <testcase name=\"{}\" classname=\"{}\" time=\"{:.3}\">\n",
                    xml_escape(case.name()),
                    xml_escape(suite.file_path()),
                    case.duration().as_secs_f64()
                ));

                match case.status() {
                    Status::Fail | Status::Error => {
                        xml.push_str(&format!(
                            "      <failure message=\"{}\" type=\"TestFailure\">{}</failure>\n",
                            xml_escape(&Self::failure_message(case)),
                            xml_escape(&format_case(case))
                        ));
                    }
                    Status::Skip => {
                        xml.push_str("      <skipped />\n");
                    }
                    Status::Pass => {}
                }

                xml.push_str("    </testcase>\n");
            }

            xml.push_str("  </testsuite>\n");
        }
        xml.push_str("</testsuites>\n");

        let mut file = File::create(&self.output_path).with_context(|| {
            format!(
                "Failed to create JUnit report file: {}",
                self.output_path.display()
            )
        })?;

        file.write_all(xml.as_bytes())
            .context("Failed to write JUnit XML content")?;

        Ok(())
    }
}

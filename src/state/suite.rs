// Test suite result - all cases produced from one test file

use super::{Status, TestCaseResult, serialize_duration};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::warn;

/// Aggregate record of one test file
#[derive(Debug, Clone, Serialize)]
pub struct TestSuiteResult {
    file_path: String,
    verbose: bool,
    status: Status,
    start_time: DateTime<Utc>,
    #[serde(skip)]
    started: Instant,
    #[serde(serialize_with = "serialize_duration")]
    duration: Duration,
    results: Vec<TestCaseResult>,
}

/// Pass/fail counts of a suite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl TestSuiteResult {
    /// Create new suite result
    pub fn new(file_path: impl Into<String>, verbose: bool) -> Self {
        Self {
            file_path: file_path.into(),
            verbose,
            status: Status::Pass,
            start_time: Utc::now(),
            started: Instant::now(),
            duration: Duration::ZERO,
            results: Vec::new(),
        }
    }

    /// Append a finished case. A failing case fails the suite for good.
    pub fn add_result(&mut self, case: TestCaseResult) {
        if !case.is_completed() {
            warn!(
                "Test case '{}' added to {} before completion",
                case.name(),
                self.file_path
            );
        }
        if case.status().is_failure() {
            self.status = Status::Fail;
        }
        self.results.push(case);
    }

    /// Freeze the suite duration
    pub fn complete(&mut self) -> &mut Self {
        self.duration = self.started.elapsed();
        self
    }

    pub fn has_failures(&self) -> bool {
        self.status == Status::Fail
    }

    /// Cases addressable by id, for later cases in the same file.
    /// Cases without an id are left out whatever their status.
    pub fn get_completed_tests(&self) -> HashMap<&str, &TestCaseResult> {
        self.results
            .iter()
            .filter(|case| !case.id().is_empty())
            .map(|case| (case.id(), case))
            .collect()
    }

    pub fn summary(&self) -> SuiteSummary {
        let failed = self
            .results
            .iter()
            .filter(|case| case.status().is_failure())
            .count();
        SuiteSummary {
            total: self.results.len(),
            passed: self.results.len() - failed,
            failed,
        }
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn results(&self) -> &[TestCaseResult] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CaseError, DisplayOptions};

    fn passing(name: &str, id: &str) -> TestCaseResult {
        let mut case = TestCaseResult::new(name, id, DisplayOptions::default());
        case.complete().unwrap();
        case
    }

    fn failing(name: &str, id: &str) -> TestCaseResult {
        let mut case = TestCaseResult::new(name, id, DisplayOptions::default());
        case.fail(CaseError::other("boom")).unwrap();
        case
    }

    #[test]
    fn test_empty_suite_passes() {
        let suite = TestSuiteResult::new("a_xrtest.yaml", false);
        assert_eq!(suite.status(), Status::Pass);
        assert!(!suite.has_failures());
        assert_eq!(suite.duration(), Duration::ZERO);
    }

    #[test]
    fn test_failure_is_sticky() {
        let mut suite = TestSuiteResult::new("a_xrtest.yaml", false);
        suite.add_result(failing("one", ""));
        suite.add_result(passing("two", ""));
        suite.add_result(passing("three", ""));
        assert_eq!(suite.status(), Status::Fail);
        assert!(suite.has_failures());
        assert_eq!(
            suite.summary(),
            SuiteSummary {
                total: 3,
                passed: 2,
                failed: 1
            }
        );
    }

    #[test]
    fn test_completed_tests_only_with_id() {
        let mut suite = TestSuiteResult::new("a_xrtest.yaml", false);
        suite.add_result(passing("no id", ""));
        suite.add_result(failing("failed with id", "first"));
        suite.add_result(passing("passed with id", "second"));

        let completed = suite.get_completed_tests();
        assert_eq!(completed.len(), 2);
        assert_eq!(completed["first"].name(), "failed with id");
        assert_eq!(completed["second"].name(), "passed with id");
        assert!(!completed.contains_key(""));
    }
}

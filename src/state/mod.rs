// State module - test result model
// Cases, suites and their leaf results, plus the stage machine that drives a case

pub mod assertion;
pub mod case;
pub mod hook;
pub mod status;
pub mod suite;

pub use assertion::{AssertionResult, AssertionSummary};
pub use case::{
    CaseError, DisplayOptions, RenderedResource, Stage, TestCaseResult, VALIDATE_ERROR_MARKER,
    parse_rendered_resources, validate_output_has_error,
};
pub use hook::{HookError, HookResult};
pub use status::Status;
pub use suite::{SuiteSummary, TestSuiteResult};

use serde::Serializer;
use std::time::Duration;

/// Durations are reported in fractional seconds
pub(crate) fn serialize_duration<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

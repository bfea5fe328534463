// Assertion engine over rendered resource identities

use crate::parser::ast::AssertionSpec;
use crate::state::{AssertionResult, RenderedResource};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Built-in assertion kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionKind {
    /// Total number of rendered resources
    Count,
    /// A `Kind/Name` resource was rendered
    Exists,
    /// A `Kind/Name` resource was not rendered
    NotExists,
    /// Number of rendered resources of one kind
    CountByKind,
}

impl AssertionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssertionKind::Count => "Count",
            AssertionKind::Exists => "Exists",
            AssertionKind::NotExists => "NotExists",
            AssertionKind::CountByKind => "CountByKind",
        }
    }
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssertionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Count" => Ok(AssertionKind::Count),
            "Exists" => Ok(AssertionKind::Exists),
            "NotExists" => Ok(AssertionKind::NotExists),
            "CountByKind" => Ok(AssertionKind::CountByKind),
            other => Err(format!("unknown assertion type '{}'", other)),
        }
    }
}

/// Assertion engine
#[derive(Debug, Default)]
pub struct AssertionEngine;

impl AssertionEngine {
    /// Create a new assertion engine
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every assertion in file order
    pub fn evaluate_all(
        &self,
        assertions: &[AssertionSpec],
        resources: &[RenderedResource],
    ) -> Vec<AssertionResult> {
        assertions
            .iter()
            .map(|assertion| self.evaluate(assertion, resources))
            .collect()
    }

    /// Evaluate a single assertion.
    ///
    /// A spec that cannot be evaluated (unknown type, missing or ill-typed
    /// field) yields an ERROR result rather than a failure.
    pub fn evaluate(
        &self,
        assertion: &AssertionSpec,
        resources: &[RenderedResource],
    ) -> AssertionResult {
        let name = assertion.name.as_str();

        if assertion.skip {
            return AssertionResult::skip(name, "skipped");
        }

        let result = match assertion.kind.parse::<AssertionKind>() {
            Ok(kind) => match self.check(kind, assertion, resources) {
                Ok(result) => result,
                Err(message) => AssertionResult::error(name, message),
            },
            Err(message) => AssertionResult::error(name, message),
        };

        debug!(
            "Assertion '{}' ({}): {}",
            name, assertion.kind, result.status
        );
        result
    }

    fn check(
        &self,
        kind: AssertionKind,
        assertion: &AssertionSpec,
        resources: &[RenderedResource],
    ) -> Result<AssertionResult, String> {
        let name = assertion.name.as_str();

        match kind {
            AssertionKind::Count => {
                let expected = expected_count(assertion)?;
                let actual = resources.len();
                Ok(compare_counts(name, "resources", expected, actual))
            }
            AssertionKind::Exists | AssertionKind::NotExists => {
                let target = resource_reference(assertion)?;
                let found = resources.contains(&target);
                let want = kind == AssertionKind::Exists;
                Ok(match (want, found) {
                    (true, true) => {
                        AssertionResult::pass(name, format!("resource {} found", target))
                    }
                    (true, false) => {
                        AssertionResult::fail(name, format!("resource {} not found", target))
                    }
                    (false, false) => AssertionResult::pass(
                        name,
                        format!("resource {} absent as expected", target),
                    ),
                    (false, true) => AssertionResult::fail(
                        name,
                        format!("resource {} found but should not exist", target),
                    ),
                })
            }
            AssertionKind::CountByKind => {
                let kind_name = assertion
                    .resource
                    .as_deref()
                    .map(str::trim)
                    .filter(|kind| !kind.is_empty())
                    .ok_or("CountByKind requires 'resource' set to a kind")?;
                let expected = expected_count(assertion)?;
                let actual = resources.iter().filter(|r| r.kind == kind_name).count();
                Ok(compare_counts(
                    name,
                    &format!("{} resources", kind_name),
                    expected,
                    actual,
                ))
            }
        }
    }
}

fn expected_count(assertion: &AssertionSpec) -> Result<usize, String> {
    let value = assertion
        .value
        .as_ref()
        .ok_or_else(|| format!("{} requires a 'value'", assertion.kind))?;
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| format!("{} 'value' must be a non-negative integer", assertion.kind))
}

fn resource_reference(assertion: &AssertionSpec) -> Result<RenderedResource, String> {
    let reference = assertion
        .resource
        .as_deref()
        .ok_or_else(|| format!("{} requires a 'resource' of the form Kind/Name", assertion.kind))?;
    RenderedResource::parse_reference(reference)
        .ok_or_else(|| format!("invalid resource reference '{}': expected Kind/Name", reference))
}

fn compare_counts(name: &str, what: &str, expected: usize, actual: usize) -> AssertionResult {
    if expected == actual {
        AssertionResult::pass(name, format!("found {} {}", actual, what))
    } else {
        AssertionResult::fail(name, format!("expected {} {}, got {}", expected, what, actual))
    }
}

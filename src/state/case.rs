// Test case result - lifecycle record of a single test case
//
// A case moves through a fixed sequence of stages. Every mutator checks the
// current stage first and rejects out-of-order calls without touching the
// record, so the orchestrator cannot silently skip back or replay a stage.

use super::assertion::{AssertionResult, AssertionSummary};
use super::hook::{HookResult, serialize_lossy};
use super::{Status, serialize_duration};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Marker the validator prints when it rejects the rendered resources
pub const VALIDATE_ERROR_MARKER: &str = "crossplane: error:";

/// Lifecycle stage of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Created,
    PreHooks,
    Rendered,
    Validated,
    Asserted,
    PostHooks,
    Completed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Created => "created",
            Stage::PreHooks => "pre-test hooks",
            Stage::Rendered => "render",
            Stage::Validated => "validate",
            Stage::Asserted => "assertions",
            Stage::PostHooks => "post-test hooks",
            Stage::Completed => "completed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseError {
    /// A stage method was called in the wrong order
    #[error("cannot enter {attempted} stage from {current} stage")]
    OutOfOrder { current: Stage, attempted: Stage },

    /// The renderer produced output that is not valid YAML
    #[error("failed to parse rendered output: {message}")]
    RenderParse { message: String },

    /// The validator rejected the rendered resources
    #[error("{output}")]
    ValidateFailed { output: String },

    #[error("{message}")]
    Other { message: String },
}

impl CaseError {
    pub fn other(message: impl Into<String>) -> Self {
        CaseError::Other {
            message: message.into(),
        }
    }

    /// Validator errors already carry the validator's own glyphs
    pub fn is_validator_output(&self) -> bool {
        matches!(self, CaseError::ValidateFailed { .. })
    }
}

impl From<anyhow::Error> for CaseError {
    fn from(err: anyhow::Error) -> Self {
        CaseError::other(format!("{:#}", err))
    }
}

/// Which parts of a passing case get printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub show_render: bool,
    #[serde(default)]
    pub show_validate: bool,
    #[serde(default)]
    pub show_hooks: bool,
    #[serde(default)]
    pub show_assertions: bool,
}

/// Identity of one rendered resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct RenderedResource {
    pub kind: String,
    pub name: String,
}

impl RenderedResource {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }

    fn from_document(document: &serde_yaml::Value) -> Self {
        let kind = document
            .get("kind")
            .and_then(serde_yaml::Value::as_str)
            .unwrap_or_default();
        let name = document
            .get("metadata")
            .and_then(|metadata| metadata.get("name"))
            .and_then(serde_yaml::Value::as_str)
            .unwrap_or_default();
        Self::new(kind, name)
    }

    /// Parse a `Kind/Name` reference
    pub fn parse_reference(reference: &str) -> Option<Self> {
        let (kind, name) = reference.trim().split_once('/')?;
        if kind.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(kind, name))
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_empty() && self.name.is_empty()
    }
}

impl fmt::Display for RenderedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("<empty document>")
        } else {
            write!(f, "{}/{}", self.kind, self.name)
        }
    }
}

/// Split a multi-document YAML stream into resource identities.
///
/// Empty input yields no resources. A comment-only document between
/// separators still counts as one (empty) resource.
pub fn parse_rendered_resources(raw: &[u8]) -> Result<Vec<RenderedResource>, serde_yaml::Error> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut resources = Vec::new();
    for document in serde_yaml::Deserializer::from_slice(raw) {
        let value = serde_yaml::Value::deserialize(document)?;
        resources.push(RenderedResource::from_document(&value));
    }
    Ok(resources)
}

/// True when validator output contains a tool-level error line
pub fn validate_output_has_error(raw: &[u8]) -> bool {
    String::from_utf8_lossy(raw)
        .lines()
        .any(|line| line.contains(VALIDATE_ERROR_MARKER))
}

/// Lifecycle record of one test case
#[derive(Debug, Clone, Serialize)]
pub struct TestCaseResult {
    name: String,
    id: String,
    #[serde(flatten)]
    display: DisplayOptions,
    status: Status,
    error: Option<CaseError>,
    stage: Stage,
    start_time: DateTime<Utc>,
    #[serde(skip)]
    started: Instant,
    #[serde(serialize_with = "serialize_duration")]
    duration: Duration,
    #[serde(serialize_with = "serialize_lossy")]
    raw_render_output: Vec<u8>,
    rendered_resources: Vec<RenderedResource>,
    has_failed_render: bool,
    #[serde(serialize_with = "serialize_lossy")]
    raw_validate_output: Vec<u8>,
    has_failed_validate: bool,
    pre_test_hooks_results: Vec<HookResult>,
    post_test_hooks_results: Vec<HookResult>,
    assertions_results: Vec<AssertionResult>,
    has_failed_assertions: bool,
}

impl TestCaseResult {
    /// Start a new case. An empty `id` makes the case unaddressable by later cases.
    pub fn new(name: impl Into<String>, id: impl Into<String>, display: DisplayOptions) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            display,
            status: Status::Pass,
            error: None,
            stage: Stage::Created,
            start_time: Utc::now(),
            started: Instant::now(),
            duration: Duration::ZERO,
            raw_render_output: Vec::new(),
            rendered_resources: Vec::new(),
            has_failed_render: false,
            raw_validate_output: Vec::new(),
            has_failed_validate: false,
            pre_test_hooks_results: Vec::new(),
            post_test_hooks_results: Vec::new(),
            assertions_results: Vec::new(),
            has_failed_assertions: false,
        }
    }

    fn enter(&mut self, attempted: Stage, allowed_from: &[Stage]) -> Result<(), CaseError> {
        self.check_from(attempted, allowed_from)?;
        self.stage = attempted;
        Ok(())
    }

    fn check_from(&self, attempted: Stage, allowed_from: &[Stage]) -> Result<(), CaseError> {
        if allowed_from.contains(&self.stage) {
            Ok(())
        } else {
            Err(CaseError::OutOfOrder {
                current: self.stage,
                attempted,
            })
        }
    }

    // Status only ever gets worse.
    fn mark_failed(&mut self) {
        self.status = Status::Fail;
    }

    /// Record the already-executed pre-test hooks
    pub fn process_pre_test_hooks_output(
        &mut self,
        results: Vec<HookResult>,
    ) -> Result<(), CaseError> {
        self.enter(Stage::PreHooks, &[Stage::Created])?;
        if results.iter().any(HookResult::failed) {
            self.mark_failed();
        }
        self.pre_test_hooks_results = results;
        Ok(())
    }

    /// Record successful renderer output and extract resource identities.
    ///
    /// Malformed YAML returns [`CaseError::RenderParse`]; the raw output is
    /// kept and the stage still advances so the caller can `fail` the case.
    pub fn process_render_output(&mut self, raw: impl Into<Vec<u8>>) -> Result<(), CaseError> {
        self.enter(Stage::Rendered, &[Stage::Created, Stage::PreHooks])?;
        self.raw_render_output = raw.into();
        match parse_rendered_resources(&self.raw_render_output) {
            Ok(resources) => {
                self.rendered_resources = resources;
                Ok(())
            }
            Err(err) => Err(CaseError::RenderParse {
                message: err.to_string(),
            }),
        }
    }

    /// Record a renderer that reported a domain error
    pub fn fail_render(&mut self, raw: impl Into<Vec<u8>>) -> Result<(), CaseError> {
        self.enter(Stage::Rendered, &[Stage::Created, Stage::PreHooks])?;
        self.raw_render_output = raw.into();
        self.has_failed_render = true;
        self.mark_failed();
        Ok(())
    }

    /// Record validator output as captured
    pub fn process_validate_output(&mut self, raw: impl Into<Vec<u8>>) -> Result<(), CaseError> {
        self.enter(Stage::Validated, &[Stage::Rendered])?;
        self.raw_validate_output = raw.into();
        Ok(())
    }

    /// Flag the recorded validator output as a failure and build the error
    /// to pass to [`TestCaseResult::fail`].
    pub fn mark_validate_failed(&mut self) -> CaseError {
        if let Err(err) = self.check_from(Stage::Validated, &[Stage::Validated]) {
            return err;
        }
        self.has_failed_validate = true;
        self.mark_failed();
        CaseError::ValidateFailed {
            output: self.validate_output().trim_end().to_string(),
        }
    }

    /// True when the recorded validator output carries a tool-level error
    pub fn validate_output_has_error(&self) -> bool {
        validate_output_has_error(&self.raw_validate_output)
    }

    /// Record already-evaluated assertions
    pub fn process_assertions(&mut self, results: Vec<AssertionResult>) -> Result<(), CaseError> {
        self.enter(Stage::Asserted, &[Stage::Rendered, Stage::Validated])?;
        self.has_failed_assertions = AssertionSummary::from_results(&results).has_failures();
        if self.has_failed_assertions {
            self.mark_failed();
        }
        self.assertions_results = results;
        Ok(())
    }

    /// Record the already-executed post-test hooks
    pub fn process_post_test_hooks_output(
        &mut self,
        results: Vec<HookResult>,
    ) -> Result<(), CaseError> {
        self.enter(
            Stage::PostHooks,
            &[
                Stage::Created,
                Stage::PreHooks,
                Stage::Rendered,
                Stage::Validated,
                Stage::Asserted,
            ],
        )?;
        if results.iter().any(HookResult::failed) {
            self.mark_failed();
        }
        self.post_test_hooks_results = results;
        Ok(())
    }

    /// Freeze the duration and close the case
    pub fn complete(&mut self) -> Result<&mut Self, CaseError> {
        self.finish()?;
        Ok(self)
    }

    /// Close the case as failed with a case-level error
    pub fn fail(&mut self, err: impl Into<CaseError>) -> Result<&mut Self, CaseError> {
        self.finish()?;
        self.mark_failed();
        self.error = Some(err.into());
        Ok(self)
    }

    fn finish(&mut self) -> Result<(), CaseError> {
        if self.stage == Stage::Completed {
            return Err(CaseError::OutOfOrder {
                current: self.stage,
                attempted: Stage::Completed,
            });
        }
        self.stage = Stage::Completed;
        self.duration = self.started.elapsed();
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display(&self) -> DisplayOptions {
        self.display
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn error(&self) -> Option<&CaseError> {
        self.error.as_ref()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_completed(&self) -> bool {
        self.stage == Stage::Completed
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Zero until the case is completed
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn raw_render_output(&self) -> &[u8] {
        &self.raw_render_output
    }

    pub fn render_output(&self) -> String {
        String::from_utf8_lossy(&self.raw_render_output).into_owned()
    }

    pub fn rendered_resources(&self) -> &[RenderedResource] {
        &self.rendered_resources
    }

    pub fn has_failed_render(&self) -> bool {
        self.has_failed_render
    }

    pub fn raw_validate_output(&self) -> &[u8] {
        &self.raw_validate_output
    }

    pub fn validate_output(&self) -> String {
        String::from_utf8_lossy(&self.raw_validate_output).into_owned()
    }

    pub fn has_failed_validate(&self) -> bool {
        self.has_failed_validate
    }

    pub fn pre_test_hooks_results(&self) -> &[HookResult] {
        &self.pre_test_hooks_results
    }

    pub fn post_test_hooks_results(&self) -> &[HookResult] {
        &self.post_test_hooks_results
    }

    pub fn assertions_results(&self) -> &[AssertionResult] {
        &self.assertions_results
    }

    pub fn has_failed_assertions(&self) -> bool {
        self.has_failed_assertions
    }

    pub fn assertion_summary(&self) -> AssertionSummary {
        AssertionSummary::from_results(&self.assertions_results)
    }
}

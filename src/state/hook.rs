// Hook results - outcome of one pre/post-test hook invocation

use super::Status;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Why a hook failed. Decided once when the result is built.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum HookError {
    /// The process ran and exited with a non-zero status
    #[error("exit code: {0}")]
    ExitStatus(i32),

    /// Anything else: placeholder resolution, spawn or I/O failures
    #[error("error: {0}")]
    Other(String),
}

impl HookError {
    /// Build an `Other` error from the root cause of an error chain
    pub fn other(err: &anyhow::Error) -> Self {
        HookError::Other(err.root_cause().to_string())
    }

    /// Status whose glyph marks this kind of failure
    pub fn status(&self) -> Status {
        match self {
            HookError::ExitStatus(_) => Status::Fail,
            HookError::Other(_) => Status::Error,
        }
    }
}

/// Outcome of one executed hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookResult {
    pub name: String,
    /// Literal invocation text, for display
    pub command: String,
    #[serde(serialize_with = "serialize_lossy")]
    pub raw_output: Vec<u8>,
    pub error: Option<HookError>,
}

impl HookResult {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        raw_output: impl Into<Vec<u8>>,
        error: Option<HookError>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            raw_output: raw_output.into(),
            error,
        }
    }

    /// PASS when the hook ran cleanly, otherwise the status of its error kind
    pub fn status(&self) -> Status {
        self.error.as_ref().map_or(Status::Pass, HookError::status)
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// Captured output as text
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.raw_output).into_owned()
    }

    /// True when the output is whitespace only
    pub fn has_body(&self) -> bool {
        !self.output().trim().is_empty()
    }
}

pub(crate) fn serialize_lossy<S: Serializer>(
    bytes: &[u8],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

// Outcome status shared by cases, suites, hooks and assertions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of a test, a stage or an assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Pass,
    Fail,
    Skip,
    Error,
}

impl Status {
    /// Canonical string used for comparisons and serialization
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
            Status::Skip => "SKIP",
            Status::Error => "ERROR",
        }
    }

    /// Display glyph used in reports
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Pass => "[✓]",
            Status::Fail => "[x]",
            Status::Skip => "[-]",
            Status::Error => "[!]",
        }
    }

    /// FAIL and ERROR both mark the parent as failed; SKIP does not.
    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Fail | Status::Error)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASS" => Ok(Status::Pass),
            "FAIL" => Ok(Status::Fail),
            "SKIP" => Ok(Status::Skip),
            "ERROR" => Ok(Status::Error),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

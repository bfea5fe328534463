// Test file model
// Represents the parsed structure of an *_xrtest.yaml file

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete test file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestFile {
    /// File path (absolute or relative), filled in by the loader
    #[serde(skip)]
    pub file_path: PathBuf,

    /// Test cases in file order
    #[serde(default)]
    pub tests: Vec<TestCaseSpec>,
}

impl TestFile {
    /// Directory that relative input paths resolve against
    pub fn base_dir(&self) -> &Path {
        self.file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

/// One test case as written in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseSpec {
    pub name: String,

    /// Later tests reference this one through `${tests.<id>...}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub inputs: Inputs,

    #[serde(default)]
    pub hooks: Hooks,

    #[serde(default)]
    pub assertions: Vec<AssertionSpec>,
}

impl TestCaseSpec {
    /// Id or empty string when the test is not addressable
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

/// Render and validate inputs, relative to the test file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inputs {
    pub xr: String,
    pub composition: String,
    pub functions: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_resources: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_resources: Option<String>,

    /// Schemas for the validator; no validate stage without them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crds: Option<String>,
}

/// Pre and post-test hooks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hooks {
    #[serde(default)]
    pub pre: Vec<HookSpec>,

    #[serde(default)]
    pub post: Vec<HookSpec>,
}

/// A shell command run before or after a test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookSpec {
    pub name: String,
    pub run: String,
}

/// A named check against the rendered resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionSpec {
    pub name: String,

    /// Assertion kind: Count, Exists, NotExists or CountByKind
    #[serde(rename = "type")]
    pub kind: String,

    /// `Kind/Name` reference, or a bare kind for CountByKind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_yaml::Value>,

    #[serde(default)]
    pub skip: bool,
}

// Test file loader - reads *_xrtest.yaml files into the test model

use super::ast::TestFile;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Parse a test file from disk
pub fn parse_test_file(file_path: &Path) -> Result<TestFile> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read test file: {}", file_path.display()))?;
    parse_test_file_from_str(&content, file_path)
}

/// Parse test file content from a string
pub fn parse_test_file_from_str(content: &str, file_path: &Path) -> Result<TestFile> {
    let mut file: TestFile = serde_yaml::from_str(content)
        .with_context(|| format!("Failed to parse test file: {}", file_path.display()))?;
    file.file_path = file_path.to_path_buf();

    debug!(
        "Parsed {} with {} test(s)",
        file_path.display(),
        file.tests.len()
    );
    Ok(file)
}

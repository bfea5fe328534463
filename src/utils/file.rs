// Cross-platform file utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Suffix that marks a YAML file as a test file
pub const TEST_FILE_SUFFIX: &str = "_xrtest.yaml";

/// File utilities for cross-platform operations
pub struct FileUtils;

impl FileUtils {
    /// Check if a path names a test file
    pub fn is_test_file(path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(TEST_FILE_SUFFIX))
    }

    /// Collect all test files from a file or directory
    pub fn collect_test_files(path: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        if path.is_file() {
            if Self::is_test_file(path) {
                files.push(path.to_path_buf());
            }
        } else if path.is_dir() {
            let walker = walkdir::WalkDir::new(path).into_iter().filter_entry(|e| {
                // Always include the root directory itself, even if it starts with '.'
                if e.depth() == 0 {
                    return true;
                }
                !e.file_name().to_string_lossy().starts_with('.')
            });

            for entry in walker.flatten() {
                if entry.file_type().is_file() && Self::is_test_file(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        }

        files
    }

    /// Sort files by given criteria
    pub fn sort_files(files: &mut [PathBuf], sort_by: &str) {
        match sort_by {
            "name" => {
                files.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)))
            }
            _ => files.sort(), // Default path sort
        }
    }

    /// Read file content
    pub fn read_file(path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Write file content
    pub fn write_file(path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write file: {}", path.display()))
    }

    /// Resolve a path relative to a base file path
    pub fn resolve_relative_path(base_file_path: &Path, relative_path: &str) -> PathBuf {
        let path = Path::new(relative_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            let base_dir = base_file_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            base_dir.join(path)
        }
    }
}

// Test file validator - checks a parsed test file before it runs
// Required fields, unique ids, and hook placeholders that point backwards

use super::ast::*;
use crate::assert::AssertionKind;
use crate::execution::template::referenced_ids;
use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::HashSet;

/// Validation error
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub message: String,
    /// Name of the offending test, when there is one
    pub test: Option<String>,
    pub severity: ErrorSeverity,
}

/// Error severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Error,
    Warning,
}

impl ValidationError {
    fn error(test: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            test: test.map(str::to_string),
            severity: ErrorSeverity::Error,
        }
    }

    fn warning(test: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            test: test.map(str::to_string),
            severity: ErrorSeverity::Warning,
        }
    }
}

/// Validate a parsed test file (returns all errors/warnings without bailing)
pub fn validate_test_file_diagnostics(file: &TestFile) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if file.tests.is_empty() {
        errors.push(ValidationError::error(None, "at least one test is required"));
    }

    let mut seen_ids: HashSet<&str> = HashSet::new();
    for test in &file.tests {
        validate_test(test, &seen_ids, &mut errors);
        if let Some(id) = test.id.as_deref()
            && !seen_ids.insert(id)
        {
            errors.push(ValidationError::error(
                Some(test.name.as_str()),
                format!("duplicate test id '{}'", id),
            ));
        }
    }

    errors
}

/// Validate a parsed test file (bails on the first batch of errors)
pub fn validate_test_file(file: &TestFile) -> Result<Vec<ValidationError>> {
    let errors = validate_test_file_diagnostics(file);
    let has_errors = errors.iter().any(|e| e.severity == ErrorSeverity::Error);

    if has_errors {
        let error_messages: Vec<String> = errors
            .iter()
            .filter(|e| e.severity == ErrorSeverity::Error)
            .map(|e| match &e.test {
                Some(test) => format!("{}: {}", test, e.message),
                None => e.message.clone(),
            })
            .collect();

        bail!("Validation failed:\n{}", error_messages.join("\n"));
    }

    Ok(errors)
}

fn validate_test(
    test: &TestCaseSpec,
    earlier_ids: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    let name = Some(test.name.as_str());

    if test.name.trim().is_empty() {
        errors.push(ValidationError::error(None, "test name must not be empty"));
    }

    if let Some(id) = test.id.as_deref()
        && (id.is_empty()
            || !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'))
    {
        errors.push(ValidationError::error(
            name,
            format!("invalid test id '{}': use letters, digits, '-' and '_'", id),
        ));
    }

    for (field, value) in [
        ("xr", &test.inputs.xr),
        ("composition", &test.inputs.composition),
        ("functions", &test.inputs.functions),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::error(
                name,
                format!("inputs.{} is required", field),
            ));
        }
    }

    for (phase, hooks) in [("pre", &test.hooks.pre), ("post", &test.hooks.post)] {
        validate_hooks(test, phase, hooks, earlier_ids, errors);
    }

    for assertion in &test.assertions {
        if assertion.name.trim().is_empty() {
            errors.push(ValidationError::error(name, "assertion name must not be empty"));
        }
        if assertion.kind.parse::<AssertionKind>().is_err() {
            errors.push(ValidationError::warning(
                name,
                format!(
                    "assertion '{}' has unknown type '{}' and will report an error",
                    assertion.name, assertion.kind
                ),
            ));
        }
    }
}

fn validate_hooks(
    test: &TestCaseSpec,
    phase: &str,
    hooks: &[HookSpec],
    earlier_ids: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    let name = Some(test.name.as_str());
    let mut hook_names = HashSet::new();

    for hook in hooks {
        if hook.name.trim().is_empty() {
            errors.push(ValidationError::error(
                name,
                format!("{}-test hook name must not be empty", phase),
            ));
        } else if !hook_names.insert(hook.name.as_str()) {
            errors.push(ValidationError::warning(
                name,
                format!(
                    "duplicate {}-test hook name '{}': placeholders resolve to the first one",
                    phase, hook.name
                ),
            ));
        }

        if hook.run.trim().is_empty() {
            errors.push(ValidationError::error(
                name,
                format!("hook '{}' has an empty run command", hook.name),
            ));
        }

        for id in referenced_ids(&hook.run) {
            if !earlier_ids.contains(id.as_str()) {
                errors.push(ValidationError::error(
                    name,
                    format!(
                        "hook '{}' references test '{}', which is not defined by an earlier test",
                        hook.name, id
                    ),
                ));
            }
        }
    }
}

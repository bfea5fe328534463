// Placeholder resolution for hook commands
//
// Hooks can read what earlier tests in the same file recorded:
//   ${tests.<id>.status}        PASS / FAIL
//   ${tests.<id>.name}
//   ${tests.<id>.rendered}      raw renderer output
//   ${tests.<id>.validated}     raw validator output
//   ${tests.<id>.resources}     one Kind/Name per line
//   ${tests.<id>.hooks.pre.<hook name>}   trimmed hook output
//   ${tests.<id>.hooks.post.<hook name>}
// Values are substituted verbatim; quoting is up to the test author.

use crate::state::TestCaseResult;
use anyhow::{Result, anyhow, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{\s*tests\.([A-Za-z0-9_-]+)\.([^}]+?)\s*\}").expect("invalid placeholder regex")
});

/// Ids referenced by placeholders in a command, in order of appearance
pub fn referenced_ids(command: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(command)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Replace every placeholder with the value recorded by a completed test
pub fn resolve(command: &str, completed: &HashMap<&str, &TestCaseResult>) -> Result<String> {
    let mut resolved = String::with_capacity(command.len());
    let mut last = 0;

    for caps in PLACEHOLDER_REGEX.captures_iter(command) {
        let (Some(whole), Some(id), Some(field)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let case = completed
            .get(id.as_str())
            .ok_or_else(|| anyhow!("no completed test with id '{}'", id.as_str()))?;

        resolved.push_str(&command[last..whole.start()]);
        resolved.push_str(&lookup(case, field.as_str())?);
        last = whole.end();
    }

    resolved.push_str(&command[last..]);
    Ok(resolved)
}

fn lookup(case: &TestCaseResult, field: &str) -> Result<String> {
    match field {
        "status" => Ok(case.status().to_string()),
        "name" => Ok(case.name().to_string()),
        "rendered" => Ok(case.render_output()),
        "validated" => Ok(case.validate_output()),
        "resources" => Ok(case
            .rendered_resources()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")),
        _ => {
            let Some(hook_ref) = field.strip_prefix("hooks.") else {
                bail!("unknown field '{}' for test '{}'", field, case.id());
            };
            let (phase, name) = hook_ref
                .split_once('.')
                .ok_or_else(|| anyhow!("hook reference '{}' needs a phase and a name", field))?;
            let hooks = match phase {
                "pre" => case.pre_test_hooks_results(),
                "post" => case.post_test_hooks_results(),
                other => bail!("unknown hook phase '{}' for test '{}'", other, case.id()),
            };
            hooks
                .iter()
                .find(|hook| hook.name == name)
                .map(|hook| hook.output().trim().to_string())
                .ok_or_else(|| {
                    anyhow!("test '{}' has no {} hook named '{}'", case.id(), phase, name)
                })
        }
    }
}

// Suite runner
// Drives each test case through hooks, render, validate and assertions

use super::process::{self, CommandOutput};
use super::template;
use crate::assert::AssertionEngine;
use crate::parser::ast::{HookSpec, Inputs, TestCaseSpec, TestFile};
use crate::parser::{ErrorSeverity, parse_test_file, validate_test_file};
use crate::state::{
    CaseError, DisplayOptions, HookError, HookResult, TestCaseResult, TestSuiteResult,
};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Runs test files one case at a time, in file order
pub struct SuiteRunner {
    crossplane: String,
    display: DisplayOptions,
    assertion_engine: AssertionEngine,
}

impl SuiteRunner {
    pub fn new(crossplane: impl Into<String>, display: DisplayOptions) -> Self {
        Self {
            crossplane: crossplane.into(),
            display,
            assertion_engine: AssertionEngine::new(),
        }
    }

    pub fn crossplane(&self) -> &str {
        &self.crossplane
    }

    /// Load, check and run one test file
    pub fn run_file(&self, path: &Path) -> Result<TestSuiteResult> {
        let file = parse_test_file(path)?;
        for diagnostic in validate_test_file(&file)? {
            if diagnostic.severity == ErrorSeverity::Warning {
                warn!(
                    "{}: {}{}",
                    path.display(),
                    diagnostic
                        .test
                        .as_deref()
                        .map(|test| format!("{}: ", test))
                        .unwrap_or_default(),
                    diagnostic.message
                );
            }
        }
        Ok(self.run_suite(&file))
    }

    /// Run every case of an already-parsed file
    pub fn run_suite(&self, file: &TestFile) -> TestSuiteResult {
        info!(
            "Running {} ({} tests)",
            file.file_path.display(),
            file.tests.len()
        );
        let mut suite =
            TestSuiteResult::new(file.file_path.display().to_string(), self.display.verbose);

        for spec in &file.tests {
            let case = {
                let completed = suite.get_completed_tests();
                self.run_case(file, spec, &completed)
            };
            debug!("Test '{}' finished: {}", case.name(), case.status());
            suite.add_result(case);
        }

        suite.complete();
        suite
    }

    fn run_case(
        &self,
        file: &TestFile,
        spec: &TestCaseSpec,
        completed: &HashMap<&str, &TestCaseResult>,
    ) -> TestCaseResult {
        let mut case = TestCaseResult::new(&spec.name, spec.id(), self.display);
        let base_dir = file.base_dir();

        let fatal = self.run_stages(spec, base_dir, completed, &mut case).err();

        if !spec.hooks.post.is_empty() {
            let results = self.run_hooks(&spec.hooks.post, base_dir, completed);
            if let Err(err) = case.process_post_test_hooks_output(results) {
                warn!("Test '{}': {}", spec.name, err);
            }
        }

        let closed = match fatal {
            Some(err) => {
                debug!("Test '{}' failed: {}", spec.name, err);
                case.fail(err).map(|_| ())
            }
            None => case.complete().map(|_| ()),
        };
        if let Err(err) = closed {
            warn!("Test '{}': {}", spec.name, err);
        }

        case
    }

    /// Everything up to and including assertions. An error is case-fatal.
    fn run_stages(
        &self,
        spec: &TestCaseSpec,
        base_dir: &Path,
        completed: &HashMap<&str, &TestCaseResult>,
        case: &mut TestCaseResult,
    ) -> Result<(), CaseError> {
        if !spec.hooks.pre.is_empty() {
            let results = self.run_hooks(&spec.hooks.pre, base_dir, completed);
            case.process_pre_test_hooks_output(results)?;
        }

        let render = self.render(&spec.inputs, base_dir);
        match &render.error {
            None => case.process_render_output(render.stdout)?,
            Some(HookError::ExitStatus(code)) => {
                debug!("Render of '{}' exited with code {}", spec.name, code);
                let raw = if render.stderr.iter().all(u8::is_ascii_whitespace) {
                    render.combined()
                } else {
                    render.stderr
                };
                return case.fail_render(raw);
            }
            Some(HookError::Other(message)) => {
                return Err(CaseError::other(format!(
                    "failed to run {} render: {}",
                    self.crossplane, message
                )));
            }
        }

        if let Some(crds) = spec.inputs.crds.as_deref() {
            let validate = self.validate(crds, case.raw_render_output(), base_dir);
            if let Some(HookError::Other(message)) = &validate.error {
                return Err(CaseError::other(format!(
                    "failed to run {} beta validate: {}",
                    self.crossplane, message
                )));
            }
            case.process_validate_output(validate.combined())?;
            if case.validate_output_has_error() {
                return Err(case.mark_validate_failed());
            }
        }

        if !spec.assertions.is_empty() {
            let results = self
                .assertion_engine
                .evaluate_all(&spec.assertions, case.rendered_resources());
            case.process_assertions(results)?;
        }

        Ok(())
    }

    fn run_hooks(
        &self,
        hooks: &[HookSpec],
        base_dir: &Path,
        completed: &HashMap<&str, &TestCaseResult>,
    ) -> Vec<HookResult> {
        hooks
            .iter()
            .map(|hook| match template::resolve(&hook.run, completed) {
                Ok(command) => {
                    debug!("Running hook '{}': {}", hook.name, command);
                    let output = process::run_shell(&command, base_dir);
                    let raw_output = output.combined();
                    HookResult::new(&hook.name, command, raw_output, output.error)
                }
                Err(err) => {
                    warn!("Hook '{}' not run: {}", hook.name, err);
                    HookResult::new(&hook.name, &hook.run, Vec::new(), Some(HookError::other(&err)))
                }
            })
            .collect()
    }

    fn render(&self, inputs: &Inputs, base_dir: &Path) -> CommandOutput {
        let mut args = vec![
            "render".to_string(),
            inputs.xr.clone(),
            inputs.composition.clone(),
            inputs.functions.clone(),
        ];
        if let Some(extra) = &inputs.extra_resources {
            args.push(format!("--extra-resources={}", extra));
        }
        if let Some(observed) = &inputs.observed_resources {
            args.push(format!("--observed-resources={}", observed));
        }

        debug!("{} {}", self.crossplane, args.join(" "));
        process::run_command(&self.crossplane, &args[..], base_dir, None)
    }

    fn validate(&self, crds: &str, rendered: &[u8], base_dir: &Path) -> CommandOutput {
        let args = ["beta", "validate", crds, "-"];
        debug!("{} {}", self.crossplane, args.join(" "));
        process::run_command(&self.crossplane, &args[..], base_dir, Some(rendered))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::parser::parse_test_file_from_str;
    use crate::state::{Stage, Status};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    const FAKE_CROSSPLANE: &str = r#"#!/bin/sh
if [ "$1" = "render" ]; then
  cat "$2"
  exit 0
fi
if [ "$1" = "beta" ]; then
  cat > /dev/null
  echo "[✓] example.org/v1, Kind=Bucket, bucket-a validated successfully"
  exit 0
fi
exit 2
"#;

    fn setup(script: &str, tests: &str) -> (tempfile::TempDir, SuiteRunner, TestFile) {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("crossplane");
        fs::write(&bin, script).unwrap();
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(
            dir.path().join("xr.yaml"),
            "kind: XBucket\nmetadata:\n  name: composite\n---\nkind: Bucket\nmetadata:\n  name: bucket-a\n",
        )
        .unwrap();

        let path = dir.path().join("a_xrtest.yaml");
        let file = parse_test_file_from_str(tests, &path).unwrap();
        let runner = SuiteRunner::new(bin.to_string_lossy(), DisplayOptions::default());
        (dir, runner, file)
    }

    const INPUTS: &str = "    inputs: {xr: xr.yaml, composition: c.yaml, functions: f.yaml}\n";

    #[test]
    fn test_passing_case_with_assertions() {
        let tests = format!(
            "tests:\n  - name: renders\n{}    assertions:\n      - name: two\n        type: Count\n        value: 2\n",
            INPUTS
        );
        let (_dir, runner, file) = setup(FAKE_CROSSPLANE, &tests);
        let suite = runner.run_suite(&file);

        assert!(!suite.has_failures());
        let case = &suite.results()[0];
        assert_eq!(case.stage(), Stage::Completed);
        assert_eq!(case.rendered_resources().len(), 2);
        assert_eq!(case.assertion_summary().successful, 1);
    }

    #[test]
    fn test_render_failure_skips_assertions() {
        let script = "#!/bin/sh\necho 'crossplane: error: cannot render' >&2\nexit 1\n";
        let tests = format!(
            "tests:\n  - name: broken\n{}    assertions:\n      - name: two\n        type: Count\n        value: 2\n",
            INPUTS
        );
        let (_dir, runner, file) = setup(script, &tests);
        let suite = runner.run_suite(&file);

        let case = &suite.results()[0];
        assert_eq!(case.status(), Status::Fail);
        assert!(case.has_failed_render());
        assert!(case.error().is_none());
        assert!(case.assertions_results().is_empty());
        assert_eq!(case.render_output(), "crossplane: error: cannot render\n");
    }

    #[test]
    fn test_missing_binary_is_case_error() {
        let (_dir, _runner, file) =
            setup(FAKE_CROSSPLANE, &format!("tests:\n  - name: x\n{}", INPUTS));
        let runner = SuiteRunner::new("/nonexistent/crossplane", DisplayOptions::default());
        let suite = runner.run_suite(&file);

        let case = &suite.results()[0];
        assert_eq!(case.status(), Status::Fail);
        assert!(matches!(case.error(), Some(CaseError::Other { .. })));
    }

    #[test]
    fn test_hook_placeholder_sees_earlier_case() {
        let tests = format!(
            "tests:\n  - name: first\n    id: first\n{0}  - name: second\n{0}    hooks:\n      pre:\n        - name: peek\n          run: echo ${{tests.first.status}}\n",
            INPUTS
        );
        let (_dir, runner, file) = setup(FAKE_CROSSPLANE, &tests);
        let suite = runner.run_suite(&file);

        let hook = &suite.results()[1].pre_test_hooks_results()[0];
        assert!(!hook.failed());
        assert_eq!(hook.command, "echo PASS");
        assert_eq!(hook.output(), "PASS\n");
    }
}

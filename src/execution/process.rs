// External process execution for hooks, render and validate

use crate::state::HookError;
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;
use tracing::debug;

/// Captured result of one process invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// None when the process exited with status 0
    pub error: Option<HookError>,
}

impl CommandOutput {
    fn from_output(output: Output) -> Self {
        let error = if output.status.success() {
            None
        } else {
            match output.status.code() {
                Some(code) => Some(HookError::ExitStatus(code)),
                None => Some(HookError::Other(format!(
                    "process terminated by signal ({})",
                    output.status
                ))),
            }
        };
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            error,
        }
    }

    fn failed_to_run(err: &anyhow::Error) -> Self {
        Self {
            error: Some(HookError::other(err)),
            ..Default::default()
        }
    }

    /// True when the process never produced an exit status
    pub fn is_infrastructure_error(&self) -> bool {
        matches!(self.error, Some(HookError::Other(_)))
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> Vec<u8> {
        let mut combined = Vec::with_capacity(self.stdout.len() + self.stderr.len());
        combined.extend_from_slice(&self.stdout);
        combined.extend_from_slice(&self.stderr);
        combined
    }
}

/// Run a program to completion, optionally feeding `stdin`
pub fn run_command<S: AsRef<OsStr>>(
    program: impl AsRef<OsStr>,
    args: &[S],
    cwd: &Path,
    stdin: Option<&[u8]>,
) -> CommandOutput {
    let program = program.as_ref();
    match spawn_and_wait(program, args, cwd, stdin) {
        Ok(output) => {
            let output = CommandOutput::from_output(output);
            debug!(
                "{} exited ({}), {} bytes stdout, {} bytes stderr",
                program.to_string_lossy(),
                output
                    .error
                    .as_ref()
                    .map_or_else(|| "ok".to_string(), ToString::to_string),
                output.stdout.len(),
                output.stderr.len()
            );
            output
        }
        Err(err) => {
            debug!("{:#}", err);
            CommandOutput::failed_to_run(&err)
        }
    }
}

/// Run a hook command line through `sh -c`
pub fn run_shell(command: &str, cwd: &Path) -> CommandOutput {
    run_command("sh", &["-c", command], cwd, None)
}

fn spawn_and_wait<S: AsRef<OsStr>>(
    program: &OsStr,
    args: &[S],
    cwd: &Path,
    stdin: Option<&[u8]>,
) -> Result<Output> {
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {}", program.to_string_lossy()))?;

    // stdin is written on its own thread while output is drained here
    let writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => {
            let input = input.to_vec();
            Some(thread::spawn(move || pipe.write_all(&input)))
        }
        _ => None,
    };

    let output = child
        .wait_with_output()
        .with_context(|| format!("Failed to wait for {}", program.to_string_lossy()))?;

    if let Some(writer) = writer {
        match writer.join() {
            // A child that exits without reading all of stdin is not an error
            Ok(Err(err)) if err.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(result) => result.context("Failed to write to stdin")?,
            Err(_) => anyhow::bail!("stdin writer thread panicked"),
        }
    }

    Ok(output)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_run_shell_success() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_shell("echo out; echo err >&2", dir.path());
        assert!(output.error.is_none());
        assert_eq!(output.stdout, b"out\n");
        assert_eq!(output.combined(), b"out\nerr\n");
    }

    #[test]
    fn test_run_shell_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_shell("echo nope; exit 3", dir.path());
        assert_eq!(output.error, Some(HookError::ExitStatus(3)));
        assert!(!output.is_infrastructure_error());
        assert_eq!(output.stdout, b"nope\n");
    }

    #[test]
    fn test_runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();
        let output = run_shell("cat marker.txt", dir.path());
        assert_eq!(output.stdout, b"here");
    }

    #[test]
    fn test_stdin_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_command("cat", &["-"], dir.path(), Some(&b"kind: Bucket\n"[..]));
        assert!(output.error.is_none());
        assert_eq!(output.stdout, b"kind: Bucket\n");
    }

    #[test]
    fn test_missing_program_is_infrastructure_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_command(
            "definitely-not-a-real-binary-xyz",
            &[] as &[&str],
            dir.path(),
            None,
        );
        assert!(output.is_infrastructure_error());
        assert!(output.stdout.is_empty());
    }
}

// Text formatting of case and suite results
//
// Layout follows `go test`: an optional `=== RUN` line, an outcome line,
// then indented sections in a fixed order. Everything here is a pure
// function of the result; callers choose the sink.

use crate::state::{CaseError, HookResult, TestCaseResult, TestSuiteResult, VALIDATE_ERROR_MARKER};
use std::io::{self, Write};
use std::time::Duration;

const SECTION_INDENT: &str = "    ";
const ITEM_INDENT: &str = "        ";
const BODY_INDENT: &str = "            ";

/// Glyph prefixed to errors raised by the runner itself
pub const ERROR_GLYPH: &str = "[!]";

/// Seconds with two decimals, e.g. `0.12s`
pub fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f64())
}

fn indented(indent: &str, text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("{}{}", indent, text)
    }
}

/// Render failure body: only the first line carries the error glyph,
/// the rest keep a fixed continuation indent.
pub fn format_render_failure(raw: &str) -> Vec<String> {
    let mut lines = raw.trim().lines();
    let first = lines.next().unwrap_or("renderer produced no output");

    let mut out = vec![format!("{}{} {}", ITEM_INDENT, ERROR_GLYPH, first)];
    out.extend(lines.map(|line| indented(BODY_INDENT, line.trim_end())));
    out
}

/// Validator output with tool-level error lines moved to the top.
/// Per-resource lines keep the validator's own glyphs untouched.
pub fn format_validate_output(raw: &str) -> Vec<String> {
    let (errors, details): (Vec<&str>, Vec<&str>) = raw
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .partition(|line| line.contains(VALIDATE_ERROR_MARKER));

    errors
        .into_iter()
        .chain(details)
        .map(|line| format!("{}{}", ITEM_INDENT, line.trim_start()))
        .collect()
}

fn format_hook(hook: &HookResult, verbose: bool) -> Vec<String> {
    let mut out = vec![format!("{}{} {}", ITEM_INDENT, hook.status().symbol(), hook.name)];
    if verbose {
        out.push(format!("{}$ {}", BODY_INDENT, hook.command));
    }
    if let Some(err) = &hook.error {
        out.push(format!("{}{}", BODY_INDENT, err));
    }
    if hook.has_body() {
        let output = hook.output();
        out.extend(
            output
                .trim_end()
                .lines()
                .map(|line| indented(BODY_INDENT, line.trim_end())),
        );
    }
    out
}

/// A hook section lists every hook when requested, otherwise only failures
pub fn format_hooks_section(
    title: &str,
    hooks: &[HookResult],
    show_all: bool,
    verbose: bool,
) -> Vec<String> {
    let listed: Vec<&HookResult> = hooks
        .iter()
        .filter(|hook| show_all || hook.failed())
        .collect();
    if listed.is_empty() {
        return Vec::new();
    }

    let mut out = vec![format!("{}{}:", SECTION_INDENT, title)];
    for hook in listed {
        out.extend(format_hook(hook, verbose));
    }
    out
}

fn render_section(case: &TestCaseResult) -> Vec<String> {
    let mut out = Vec::new();
    if case.has_failed_render() {
        out.push(format!("{}Render:", SECTION_INDENT));
        out.extend(format_render_failure(&case.render_output()));
    } else if case.display().show_render {
        out.push(format!("{}Render:", SECTION_INDENT));
        // Unparseable output is shown as captured
        if let Some(CaseError::RenderParse { .. }) = case.error() {
            out.extend(
                case.render_output()
                    .trim_end()
                    .lines()
                    .map(|line| indented(ITEM_INDENT, line.trim_end())),
            );
            return out;
        }
        if case.rendered_resources().is_empty() {
            out.push(format!("{}<no resources>", ITEM_INDENT));
        }
        for resource in case.rendered_resources() {
            out.push(format!("{}{}", ITEM_INDENT, resource));
        }
    }
    out
}

fn validate_section(case: &TestCaseResult) -> Vec<String> {
    let display = case.display();
    let failed = case.has_failed_validate() || case.validate_output_has_error();
    let raw = case.validate_output();

    if raw.trim().is_empty() && !failed {
        return Vec::new();
    }
    if !failed && !display.verbose && !display.show_validate {
        return Vec::new();
    }

    let mut out = vec![format!("{}Validate:", SECTION_INDENT)];
    out.extend(format_validate_output(&raw));
    out
}

fn assertions_section(case: &TestCaseResult) -> Vec<String> {
    let display = case.display();
    let summary = case.assertion_summary();
    let show_all = display.verbose && display.show_assertions;

    if summary.total == 0 || (!show_all && !summary.has_failures()) {
        return Vec::new();
    }

    let mut out = vec![format!("{}Assertions:", SECTION_INDENT)];
    for assertion in case
        .assertions_results()
        .iter()
        .filter(|assertion| show_all || assertion.status.is_failure())
    {
        if assertion.message.is_empty() {
            out.push(format!(
                "{}{} {}",
                ITEM_INDENT,
                assertion.status.symbol(),
                assertion.name
            ));
        } else {
            out.push(format!(
                "{}{} {}: {}",
                ITEM_INDENT,
                assertion.status.symbol(),
                assertion.name,
                assertion.message
            ));
        }
    }
    out.push(format!(
        "{}Total: {} assertions, {} successful, {} failed, {} errors",
        ITEM_INDENT, summary.total, summary.successful, summary.failed, summary.errors
    ));
    out
}

/// Case body sections in their fixed order
fn case_body(case: &TestCaseResult) -> Vec<String> {
    let display = case.display();
    let mut body = Vec::new();
    body.extend(format_hooks_section(
        "Pre-test Hooks",
        case.pre_test_hooks_results(),
        display.show_hooks,
        display.verbose,
    ));
    body.extend(render_section(case));
    body.extend(validate_section(case));
    body.extend(format_hooks_section(
        "Post-test Hooks",
        case.post_test_hooks_results(),
        display.show_hooks,
        display.verbose,
    ));
    body.extend(assertions_section(case));
    body
}

fn error_lines(case: &TestCaseResult) -> Vec<String> {
    let Some(err) = case.error() else {
        return Vec::new();
    };
    // The Validate section prints validator output, hoisted
    if err.is_validator_output() {
        return Vec::new();
    }
    err.to_string()
        .lines()
        .map(|line| format!("{}{} {}", SECTION_INDENT, ERROR_GLYPH, line.trim_end()))
        .collect()
}

/// Format one case. A passing, quiet case with nothing requested formats to
/// an empty string.
pub fn format_case(case: &TestCaseResult) -> String {
    let display = case.display();
    let body = case_body(case);
    let duration = format_duration(case.duration());
    let mut lines = Vec::new();

    if display.verbose {
        lines.push(format!("=== RUN   {}", case.name()));
    }
    if case.status().is_failure() {
        lines.push(format!("--- FAIL: {} ({})", case.name(), duration));
        lines.extend(error_lines(case));
    } else if display.verbose || !body.is_empty() {
        lines.push(format!(
            "--- {}: {} ({})",
            case.status(),
            case.name(),
            duration
        ));
    }
    lines.extend(body);

    join_lines(lines)
}

/// Format a whole suite: every case, then the file verdict
pub fn format_suite(suite: &TestSuiteResult) -> String {
    let mut out = String::new();
    for case in suite.results() {
        out.push_str(&format_case(case));
    }

    let duration = format_duration(suite.duration());
    if suite.has_failures() {
        out.push_str("FAIL\n");
        out.push_str(&format!("FAIL {} ({})\n", suite.file_path(), duration));
    } else {
        if suite.verbose() {
            out.push_str("PASS\n");
        }
        out.push_str(&format!("ok {} ({})\n", suite.file_path(), duration));
    }
    out
}

fn join_lines(lines: Vec<String>) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Write one case to a sink
pub fn print_case<W: Write + ?Sized>(case: &TestCaseResult, sink: &mut W) -> io::Result<()> {
    sink.write_all(format_case(case).as_bytes())
}

/// Write one suite to a sink
pub fn print_suite<W: Write + ?Sized>(suite: &TestSuiteResult, sink: &mut W) -> io::Result<()> {
    sink.write_all(format_suite(suite).as_bytes())
}

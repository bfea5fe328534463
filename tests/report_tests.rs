// Tests for report generators - public API only

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use xrtestify::report::{
    ConsoleReporter, JsonReporter, JunitReporter, Reporter, format_case, format_suite, print_case,
};
use xrtestify::state::{
    AssertionResult, DisplayOptions, HookResult, TestCaseResult, TestSuiteResult,
};

const RENDERED: &str = "kind: XBucket\nmetadata:\n  name: demo\n---\nkind: Bucket\nmetadata:\n  name: demo-bucket\n";

fn passing_case(name: &str, display: DisplayOptions) -> TestCaseResult {
    let mut case = TestCaseResult::new(name, "", display);
    case.process_render_output(RENDERED).unwrap();
    case.process_validate_output(
        "[✓] example.org/v1, Kind=XBucket, demo validated successfully\nTotal 1 resources: 0 missing schemas, 1 success cases, 0 failure cases\n",
    )
    .unwrap();
    case.complete().unwrap();
    case
}

fn failing_case(name: &str) -> TestCaseResult {
    let mut case = TestCaseResult::new(name, "", DisplayOptions::default());
    case.fail_render("crossplane: error: cannot render\n  bad patch\n")
        .unwrap();
    case.complete().unwrap();
    case
}

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_quiet_passing_case_prints_nothing() {
    let case = passing_case("renders", DisplayOptions::default());

    let mut out = Vec::new();
    print_case(&case, &mut out).unwrap();

    assert!(out.is_empty());
}

#[test]
fn test_verbose_hooks_are_listed_with_output() {
    let display = DisplayOptions {
        verbose: true,
        show_hooks: true,
        ..Default::default()
    };
    let mut case = TestCaseResult::new("t1", "", display);
    case.process_pre_test_hooks_output(vec![HookResult::new(
        "greet",
        r"printf 'hello\nworld\n'",
        "hello\nworld\n",
        None,
    )])
    .unwrap();
    case.process_render_output(RENDERED).unwrap();
    case.complete().unwrap();

    let out = format_case(&case);

    assert!(out.starts_with("=== RUN   t1\n--- PASS: t1 ("));
    assert!(out.contains("    Pre-test Hooks:\n"));
    assert!(out.contains("        [✓] greet\n"));
    assert!(out.contains(r"            $ printf 'hello\nworld\n'"));
    assert!(out.contains("            hello\n            world\n"));
}

#[test]
fn test_validate_error_line_comes_first() {
    let mut case = TestCaseResult::new("validates", "", DisplayOptions::default());
    case.process_render_output(RENDERED).unwrap();
    case.process_validate_output(
        "[✓] example.org/v1, Kind=XBucket, demo validated successfully\n[!] could not find CRD/XRD for: s3.aws/v1, Kind=Bucket\ncrossplane: error: cannot validate resources\n",
    )
    .unwrap();
    assert!(case.validate_output_has_error());
    let err = case.mark_validate_failed();
    case.fail(err).unwrap();

    let out = format_case(&case);
    let error_at = out.find("crossplane: error:").unwrap();
    let ok_at = out.find("[✓]").unwrap();
    let missing_at = out.find("[!] could not find").unwrap();

    assert!(out.starts_with("--- FAIL: validates ("));
    assert_eq!(out.matches("crossplane: error:").count(), 1);
    assert_eq!(out.matches("[✓]").count(), 1);
    assert!(error_at < ok_at);
    assert!(error_at < missing_at);
}

#[test]
fn test_suite_with_one_failure_fails() {
    let mut suite = TestSuiteResult::new("suite/bucket_xrtest.yaml", false);
    suite.add_result(failing_case("broken"));
    suite.add_result(passing_case("fine", DisplayOptions::default()));
    suite.complete();

    assert!(suite.has_failures());
    let out = format_suite(&suite);
    assert!(out.contains("--- FAIL: broken ("));
    assert!(!out.contains("fine"));
    assert!(out.contains("FAIL\nFAIL suite/bucket_xrtest.yaml ("));
    assert!(!out.contains("ok suite/bucket_xrtest.yaml"));
}

#[test]
fn test_render_failure_has_single_glyph() {
    let mut case = TestCaseResult::new("broken", "", DisplayOptions::default());
    case.fail_render("line one\nline two\nline three [!] not a glyph of ours\n")
        .unwrap();
    case.complete().unwrap();

    let out = format_case(&case);
    let render = &out[out.find("    Render:").unwrap()..];
    let first_glyph_lines = render
        .lines()
        .filter(|line| line.trim_start().starts_with("[!]"))
        .count();
    assert_eq!(first_glyph_lines, 1);
    assert!(render.contains("        [!] line one\n"));
}

#[test]
fn test_assertion_counts_include_hidden_passes() {
    let mut case = TestCaseResult::new("asserts", "", DisplayOptions::default());
    case.process_render_output(RENDERED).unwrap();
    case.process_assertions(vec![
        AssertionResult::pass("count", "found 2 resources"),
        AssertionResult::fail("bucket", "resource Bucket/other not found"),
        AssertionResult::error("odd", "unknown assertion type 'Magic'"),
        AssertionResult::skip("later", "skipped"),
    ])
    .unwrap();
    case.complete().unwrap();

    let out = format_case(&case);
    assert!(!out.contains("count"));
    assert!(out.contains("        [x] bucket: resource Bucket/other not found\n"));
    assert!(out.contains("        [!] odd: unknown assertion type 'Magic'\n"));
    assert!(out.contains("        Total: 4 assertions, 1 successful, 1 failed, 1 errors\n"));
}

#[test]
fn test_console_reporter_summary_for_many_files() {
    let buffer = SharedBuffer::default();
    let reporter = ConsoleReporter::new(Box::new(buffer.clone()));

    let mut first = TestSuiteResult::new("a_xrtest.yaml", false);
    first.add_result(passing_case("one", DisplayOptions::default()));
    first.complete();
    let mut second = TestSuiteResult::new("b_xrtest.yaml", false);
    second.add_result(failing_case("two"));
    second.complete();

    reporter.on_suite_end(&first).unwrap();
    reporter.on_suite_end(&second).unwrap();
    reporter.on_run_end(&[first, second]).unwrap();

    let out = buffer.contents();
    assert!(out.starts_with("ok a_xrtest.yaml ("));
    assert!(out.contains("FAIL b_xrtest.yaml ("));
    assert!(out.contains("FAILED: 2 tests in 2 files, 1 passed, 1 failed ("));
}

#[test]
fn test_junit_reporter_escapes_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xml");

    let mut suite = TestSuiteResult::new("a_xrtest.yaml", false);
    suite.add_result(failing_case("bucket <main> & \"friends\""));
    suite.complete();

    JunitReporter::new(path.clone())
        .on_run_end(&[suite])
        .unwrap();

    let xml = std::fs::read_to_string(&path).unwrap();
    assert!(xml.contains("name=\"bucket &lt;main&gt; &amp; &quot;friends&quot;\""));
    assert!(xml.contains("<failure message=\"render failed\""));
    assert!(xml.contains("tests=\"1\" failures=\"1\""));
}

#[test]
fn test_json_reporter_writes_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");

    let mut suite = TestSuiteResult::new("a_xrtest.yaml", false);
    suite.add_result(passing_case("one", DisplayOptions::default()));
    suite.add_result(failing_case("two"));
    suite.complete();

    JsonReporter::new(path.clone()).on_run_end(&[suite]).unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(report["summary"]["total"], 2);
    assert_eq!(report["summary"]["failed"], 1);
    assert_eq!(report["failed_files"], 1);
    assert_eq!(report["suites"][0]["results"][1]["status"], "FAIL");
    assert_eq!(
        report["suites"][0]["results"][0]["rendered_resources"][1]["name"],
        "demo-bucket"
    );
}

// Tests for the test file parser and validator - public API only

use std::path::Path;

use xrtestify::parser::{
    ErrorSeverity, parse_test_file, parse_test_file_from_str, validate_test_file,
    validate_test_file_diagnostics,
};

const FULL_FILE: &str = r#"
tests:
  - name: renders bucket
    id: bucket
    inputs:
      xr: xr.yaml
      composition: composition.yaml
      functions: functions.yaml
      extraResources: extra.yaml
      observedResources: observed.yaml
      crds: crds/
    hooks:
      pre:
        - name: setup
          run: echo hello
      post:
        - name: cleanup
          run: echo bye
    assertions:
      - name: three resources
        type: Count
        value: 3
      - name: bucket exists
        type: Exists
        resource: Bucket/my-bucket
      - name: later
        type: NotExists
        resource: Bucket/other
        skip: true
  - name: reads earlier test
    inputs:
      xr: xr.yaml
      composition: composition.yaml
      functions: functions.yaml
    hooks:
      pre:
        - name: check status
          run: test "${tests.bucket.status}" = PASS
"#;

#[test]
fn test_parse_full_file() {
    let file = parse_test_file_from_str(FULL_FILE, Path::new("suite/bucket_xrtest.yaml")).unwrap();

    assert_eq!(file.tests.len(), 2);
    let first = &file.tests[0];
    assert_eq!(first.id(), "bucket");
    assert_eq!(first.inputs.extra_resources.as_deref(), Some("extra.yaml"));
    assert_eq!(first.inputs.observed_resources.as_deref(), Some("observed.yaml"));
    assert_eq!(first.inputs.crds.as_deref(), Some("crds/"));
    assert_eq!(first.hooks.pre[0].run, "echo hello");
    assert_eq!(first.assertions.len(), 3);
    assert_eq!(first.assertions[0].kind, "Count");
    assert!(first.assertions[2].skip);

    let second = &file.tests[1];
    assert_eq!(second.id(), "");
    assert!(second.inputs.crds.is_none());
}

#[test]
fn test_full_file_is_valid() {
    let file = parse_test_file_from_str(FULL_FILE, Path::new("bucket_xrtest.yaml")).unwrap();
    let diagnostics = validate_test_file(&file).unwrap();
    assert!(diagnostics.is_empty());
}

#[test]
fn test_missing_required_input_fails_to_parse() {
    let content = "tests:\n  - name: x\n    inputs:\n      xr: xr.yaml\n";
    assert!(parse_test_file_from_str(content, Path::new("x_xrtest.yaml")).is_err());
}

#[test]
fn test_self_reference_is_rejected() {
    let content = r#"
tests:
  - name: loops
    id: me
    inputs: {xr: a, composition: b, functions: c}
    hooks:
      pre:
        - name: peek
          run: echo ${tests.me.status}
"#;
    let file = parse_test_file_from_str(content, Path::new("x_xrtest.yaml")).unwrap();
    let diagnostics = validate_test_file_diagnostics(&file);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, ErrorSeverity::Error);
    assert_eq!(diagnostics[0].test.as_deref(), Some("loops"));
}

#[test]
fn test_duplicate_hook_names_warn() {
    let content = r#"
tests:
  - name: twice
    inputs: {xr: a, composition: b, functions: c}
    hooks:
      post:
        - name: same
          run: echo 1
        - name: same
          run: echo 2
"#;
    let file = parse_test_file_from_str(content, Path::new("x_xrtest.yaml")).unwrap();
    let diagnostics = validate_test_file(&file).unwrap();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, ErrorSeverity::Warning);
}

#[test]
fn test_parse_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk_xrtest.yaml");
    std::fs::write(&path, FULL_FILE).unwrap();

    let file = parse_test_file(&path).unwrap();
    assert_eq!(file.file_path, path);
    assert_eq!(file.base_dir(), dir.path());
}

#[test]
fn test_parse_missing_file() {
    let err = parse_test_file(Path::new("does/not/exist_xrtest.yaml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read test file"));
}

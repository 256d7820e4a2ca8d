use std::path::Path;
use std::process::Command;

fn jstv(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_jstv"))
        .args(args)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("failed to run jstv")
}

#[test]
fn fixture_suite_passes() {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures");
    let output = jstv(&["test", "--no-color", fixtures.to_str().expect("utf-8 path")]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{}", stderr);
    assert!(stderr.contains("test result: ok."));
}

#[test]
fn search_counts_matches() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = dir.path().join("input.js");
    std::fs::write(&file, "s.substr(1);\nt.substr(2, 3);\ns.slice(1);\n").expect("write failed");

    let output = jstv(&[
        "search",
        "--count",
        "--spread",
        "args",
        "${s}.substr(${args})",
        file.to_str().expect("utf-8 path"),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim_end().ends_with(": 2"), "{}", stdout);
}

#[test]
fn parse_reports_syntax_errors() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = dir.path().join("broken.js");
    std::fs::write(&file, "foo(;\n").expect("write failed");

    let output = jstv(&["parse", "--no-color", file.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error"));
}

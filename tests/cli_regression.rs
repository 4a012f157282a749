// Regression tests for the `ctest` binary: exit status, report text and
// miette-rendered configuration errors.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

#[test]
fn self_test_suite_passes() {
    let mut cmd = Command::cargo_bin("ctest").unwrap();
    cmd.assert()
        .success()
        .stdout(contains("ctest\n├─session\n"))
        .stdout(contains("\x1b[0;32mPASS "))
        .stdout(contains("\x1b[0;31mFAIL").not());
}

#[test]
fn quiet_prints_only_the_summary() {
    let mut cmd = Command::cargo_bin("ctest").unwrap();
    let output = cmd.arg("--quiet").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("\x1b[0;32mPASS "));
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn json_summary_follows_report() {
    let mut cmd = Command::cargo_bin("ctest").unwrap();
    cmd.args(["--quiet", "--json"])
        .assert()
        .success()
        .stdout(contains(r#""failed":0"#).and(contains(r#""passed":"#)));
}

#[test]
fn filter_limits_groups() {
    let mut cmd = Command::cargo_bin("ctest").unwrap();
    cmd.args(["--filter", "check"])
        .assert()
        .success()
        .stdout(contains("├─check\n"))
        .stdout(contains("├─session\n").not())
        .stdout(contains("PASS 5 TESTS"));
}

#[test]
fn bad_config_is_reported_with_diagnostics() {
    let bad_file = std::env::temp_dir().join("ctest_bad_config.json");
    fs::write(&bad_file, "{ \"capture_limit\": \"lots\" }").unwrap();

    let mut cmd = Command::cargo_bin("ctest").unwrap();
    cmd.arg("--config").arg(&bad_file);
    cmd.assert()
        .failure()
        .stderr(contains("ctest::config::parse").or(contains("help:")));

    let _ = fs::remove_file(bad_file);
}

#[test]
fn config_file_is_applied() {
    let config = std::env::temp_dir().join("ctest_print_false.json");
    fs::write(&config, r#"{ "print": false }"#).unwrap();

    let mut cmd = Command::cargo_bin("ctest").unwrap();
    let output = cmd.arg("--config").arg(&config).output().unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let _ = fs::remove_file(config);
}

// End-to-end report scenarios driven through the public API.

use std::cell::Cell;
use std::rc::Rc;

use ctest::report::{GREEN, RED, RESET};
use ctest::{
    expect_eq, expect_str, OutputBuffer, Session, SessionConfig, SharedOutput, Site, TestResult,
};

const SITE: Site = Site::new("file", 0);

fn session() -> (Session, OutputBuffer) {
    let mut session = Session::new(SessionConfig::default().with_print(false));
    let out = OutputBuffer::new();
    session.set_sink(SharedOutput::new(out.clone()));
    (session, out)
}

fn passing(s: &mut Session) -> TestResult {
    let mut t = s.start("test_passing");
    expect_eq!(t, 1 + 1, 2);
    t.end()
}

fn failing(s: &mut Session) -> TestResult {
    let mut t = s.start("test_failing");
    expect_str!(t, "a\na", "b\na");
    t.end()
}

#[test]
fn group_with_one_failure_reports_fraction() {
    let (mut session, out) = session();
    let result = session.group("test_suite", |s, g| {
        s.run(g, passing);
        s.run(g, passing);
        s.run(g, failing);
    });

    assert_eq!(result, TestResult::Failed);
    let report = out.contents();
    assert!(report.starts_with(&format!("suite\n├─{GREEN}PASS passing{RESET}\n")));
    assert!(report.ends_with(&format!("└─{RED}FAIL 1/3 TESTS{RESET}\n")));

    let summary = session.finish();
    assert_eq!((summary.passed, summary.failed), (2, 1));
    assert_eq!(summary.exit_code(), 1);
    assert!(out
        .contents()
        .ends_with(&format!("{RED}FAIL 1/3 TESTS{RESET}\n")));
}

#[test]
fn failing_string_reports_first_divergence() {
    let (mut session, out) = session();
    let result = session.run_top(failing, true);
    assert_eq!(result, TestResult::Failed);

    let report = out.contents();
    assert!(report.starts_with(&format!("├─{RED}FAIL failing{RESET}\n")));
    assert!(report.contains(&format!("│ {RED}exp:0: b\\n{RESET}\n")));
    assert!(report.contains(&format!("│ {RED}act:0: a\\n{RESET}\n")));
    assert!(report.ends_with(&format!("│ {RED}       ^{RESET}\n")));
}

#[test]
fn leaked_byte_fails_an_otherwise_passing_test() {
    let (mut session, out) = session();
    let live = Rc::new(Cell::new(100usize));
    session.set_mem_counter(live.clone());

    let group = session.group_start("test_outer");
    let inner = session.group_start("test_inner");
    out.take();

    let t = session.start("test_func");
    live.set(live.get() + 1);
    assert_eq!(t.end_at(SITE), TestResult::Failed);

    assert_eq!(
        out.take(),
        format!("│ ├─{RED}LEAK func{RESET}\n│ │ {RED}file:0: 1 B{RESET}\n")
    );
    // The leaf ran outside `Session::run`, so neither group recorded it.
    assert!(!session.group_end(inner));
    assert!(!session.group_end(group));
    assert_eq!(session.depth(), -1);
    assert_eq!(session.summary().failed, 1);
}

#[test]
fn captured_output_mismatch() {
    let (mut session, out) = session();
    let mut t = session.start("test_capture");
    let capture = t.capture_start("aa");
    assert_eq!(t.capture().append("bb"), 2);
    assert!(!t.capture_end(SITE, capture));
    let _ = t.end();

    assert_eq!(
        out.contents(),
        format!(
            "├─{RED}FAIL capture{RESET}\n\
             │ {RED}file:0: {RESET}\n\
             │ {RED}exp:0: aa{RESET}\n\
             │ {RED}act:0: bb{RESET}\n\
             │ {RED}       ^{RESET}\n"
        )
    );
}

#[test]
fn silent_run_restores_sinks() {
    let (mut session, out) = session();
    let result = session.run_top(failing, false);
    assert_eq!(result, TestResult::Failed);
    assert!(out.is_empty());

    session.run_top(passing, true);
    assert_eq!(out.contents(), format!("├─{GREEN}PASS passing{RESET}\n"));
}

#[test]
fn custom_prefix_is_stripped() {
    let mut session = Session::new(
        SessionConfig::default()
            .with_print(false)
            .with_name_prefix("case_"),
    );
    let out = OutputBuffer::new();
    session.set_sink(SharedOutput::new(out.clone()));

    let _ = session.start("case_alpha").end();
    let _ = session.start("test_beta").end();
    assert_eq!(
        out.contents(),
        format!("├─{GREEN}PASS alpha{RESET}\n├─{GREEN}PASS test_beta{RESET}\n")
    );
}

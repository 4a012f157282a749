//! The harness's own test suite, written with the harness.
//!
//! Each leaf drives a private probe session whose sinks are in-memory
//! buffers, then checks the exact bytes the probe reported. The `ctest`
//! binary runs [`run_suite`].

use std::cell::Cell;
use std::rc::Rc;

use crate::config::SessionConfig;
use crate::diff;
use crate::report::{GREEN, RED, RESET};
use crate::scan::{FormatScanner, ScanValue, Scanner};
use crate::sink::{OutputBuffer, SharedOutput};
use crate::{Operand, RawScalar, Relation, Session, Site, TestResult};

pub type SuiteFn = fn(&mut Session) -> TestResult;

/// Top-level groups, in run order.
pub const GROUPS: &[(&str, SuiteFn)] = &[
    ("test_session", test_session),
    ("test_report", test_report),
    ("test_check", test_check),
    ("test_expect", test_expect),
];

/// Runs every group whose display name contains `filter` inside one
/// `ctest` group.
pub fn run_suite(s: &mut Session, filter: Option<&str>) -> TestResult {
    s.group("test_ctest", |s, g| {
        for (name, test) in GROUPS {
            let selected = filter.map_or(true, |f| s.config().display_name(name).contains(f));
            if selected {
                s.run(g, *test);
            }
        }
    })
}

const SITE: Site = Site::new("file", 0);

/// A silent session reporting into a buffer, plus a handle to the buffer.
fn probe() -> (Session, OutputBuffer) {
    let mut session = Session::new(SessionConfig::default().with_print(false));
    let out = OutputBuffer::new();
    session.set_sink(SharedOutput::new(out.clone()));
    (session, out)
}

fn red(text: &str) -> String {
    format!("{RED}{text}{RESET}")
}

/// `exp`/`act`/caret lines as printed at top level. `exp` and `act` are
/// whole lines, header included.
fn diff_tail(exp: &str, act: &str, caret: usize) -> String {
    format!(
        "│ {}\n│ {}\n│ {}\n",
        red(exp),
        red(act),
        red(&format!("{}^", " ".repeat(caret)))
    )
}

/// [`diff_tail`] preceded by an empty location line.
fn diff_block(exp: &str, act: &str, caret: usize) -> String {
    format!("│ {}\n{}", red(""), diff_tail(exp, act, caret))
}

// ============================================================================
// SESSION
// ============================================================================

fn test_init_finish(s: &mut Session) -> TestResult {
    let mut t = s.start("test_init_finish");

    let (inner, out) = probe();
    let summary = inner.finish();
    expect_eq!(t, summary.exit_code(), 0);
    expect_str!(t, out.take(), format!("{GREEN}PASS 0 TESTS{RESET}\n"));

    let (mut inner, out) = probe();
    inner.run_top(
        |s| {
            let mut t = s.start("test_failing");
            t.fail("failing");
            t.end()
        },
        false,
    );
    let summary = inner.finish();
    expect_eq!(t, summary.exit_code(), 1);
    expect_str!(t, out.take(), format!("{RED}FAIL 1/1 TEST{RESET}\n"));

    t.end()
}

fn test_run(s: &mut Session) -> TestResult {
    let mut t = s.start("test_run");

    let (mut inner, out) = probe();
    let before = inner.sink().clone();
    let result = inner.run_top(|s| s.start("test_empty").end(), false);
    expect!(t, result == TestResult::Passed);
    expect!(t, out.is_empty());
    expect!(t, inner.sink().same_sink(&before));

    inner.run_top(|s| s.start("test_empty").end(), true);
    expect_str!(t, out.take(), format!("├─{GREEN}PASS empty{RESET}\n"));

    t.end()
}

fn test_user_data(s: &mut Session) -> TestResult {
    let mut t = s.start("test_user_data");

    let (mut inner, _out) = probe();
    inner.set_user_data(7i32);
    expect!(t, inner.user_data::<i32>() == Some(&7));
    expect!(t, inner.user_data::<u8>().is_none());

    t.end()
}

fn test_setup_teardown(s: &mut Session) -> TestResult {
    let mut t = s.start("test_setup_teardown");

    let (mut inner, _out) = probe();
    let calls = Rc::new(Cell::new(0u32));
    let setup_calls = calls.clone();
    inner.set_setup(move |_| setup_calls.set(setup_calls.get() + 1));
    let teardown_calls = calls.clone();
    inner.set_teardown(move |_| teardown_calls.set(teardown_calls.get() + 10));

    let mut failing = inner.start("test_failing");
    failing.fail("x");
    let _ = failing.end();
    expect_eq!(t, calls.get(), 11);

    let _ = inner.start("test_passing").end();
    expect_eq!(t, calls.get(), 22);

    t.end()
}

fn test_start_end(s: &mut Session) -> TestResult {
    let mut t = s.start("test_start_end");

    let (mut inner, out) = probe();
    let result = inner.start("test_func").end_at(SITE);
    expect!(t, result == TestResult::Passed);
    expect_str!(t, out.take(), format!("├─{GREEN}PASS func{RESET}\n"));

    t.end()
}

fn test_end_leak(s: &mut Session) -> TestResult {
    let mut t = s.start("test_end_leak");

    let (mut inner, out) = probe();
    let counter = Rc::new(Cell::new(0usize));
    inner.set_mem_counter(counter.clone());
    let mut group = inner.group_start("test_outer");
    let inner_group = inner.group_start("test_inner");
    out.take();

    let leaf = inner.start("test_func");
    counter.set(1);
    let result = leaf.end_at(SITE);
    group.record(result);
    let _ = inner.group_end(inner_group);
    let _ = inner.group_end(group);

    expect!(t, result == TestResult::Failed);
    expect_eq!(t, inner.failed(), 1);
    expect!(t, out
        .take()
        .starts_with(&format!("│ ├─{}\n│ │ {}\n", red("LEAK func"), red("file:0: 1 B"))));

    t.end()
}

fn test_capture(s: &mut Session) -> TestResult {
    let mut t = s.start("test_capture");

    let mut inner = Session::new(
        SessionConfig::default()
            .with_print(false)
            .with_capture_capacity(1),
    );
    let out = OutputBuffer::new();
    inner.set_sink(SharedOutput::new(out.clone()));

    let mut leaf = inner.start("test_func");
    let capture = leaf.capture_start("aa");
    let written = leaf.capture().append("bb");
    let matched = leaf.capture_end(SITE, capture);
    let _ = leaf.end();

    expect_eq!(t, written, 2);
    expect!(t, !matched);
    let report = out.take();
    expect!(t, report.ends_with(&diff_tail("exp:0: aa", "act:0: bb", 7)));

    t.end()
}

fn test_session(s: &mut Session) -> TestResult {
    s.group("test_session", |s, g| {
        s.run(g, test_init_finish);
        s.run(g, test_run);
        s.run(g, test_user_data);
        s.run(g, test_setup_teardown);
        s.run(g, test_start_end);
        s.run(g, test_end_leak);
        s.run(g, test_capture);
    })
}

// ============================================================================
// REPORT
// ============================================================================

fn test_group_start(s: &mut Session) -> TestResult {
    let mut t = s.start("test_group_start");

    let (mut inner, out) = probe();
    let outer = inner.group_start("test_func");
    expect_str!(t, out.take(), "func\n");
    let middle = inner.group_start("test_middle");
    let inner_group = inner.group_start("test_func");
    expect_str!(t, out.take(), "├─middle\n│ ├─func\n");
    expect_eq!(t, inner.depth(), 2);

    let _ = inner.group_end(inner_group);
    let _ = inner.group_end(middle);
    let _ = inner.group_end(outer);
    expect_eq!(t, inner.depth(), -1);

    t.end()
}

fn test_group_end(s: &mut Session) -> TestResult {
    let mut t = s.start("test_group_end");

    let cases = [
        (0, 1, true, red("FAIL 1/1 TEST")),
        (1, 2, true, red("FAIL 2/3 TESTS")),
        (1, 0, false, format!("{GREEN}PASS 1 TEST{RESET}")),
        (2, 0, false, format!("{GREEN}PASS 2 TESTS{RESET}")),
    ];
    for (passed, failed, signal, line) in cases {
        let (mut inner, out) = probe();
        let mut group = inner.group_start("test_func");
        for _ in 0..passed {
            group.record(TestResult::Passed);
        }
        for _ in 0..failed {
            group.record(TestResult::Failed);
        }
        out.take();
        expect_eq!(t, inner.group_end(group), signal);
        expect_str!(t, out.take(), format!("└─{line}\n"));
    }

    t.end()
}

fn test_group_members(s: &mut Session) -> TestResult {
    let mut t = s.start("test_group_members");

    let (mut inner, out) = probe();
    let result = inner.group("test_suite", |s, g| {
        s.run(g, |s| s.start("test_a").end());
        s.run(g, |s| s.start("test_b").end());
        s.run(g, |s| {
            let mut t = s.start("test_c");
            t.fail("c");
            t.end()
        });
    });
    expect!(t, result == TestResult::Failed);
    expect!(t, out.take().ends_with(&format!("└─{}\n", red("FAIL 1/3 TESTS"))));
    expect_eq!(t, inner.summary().passed, 2);

    t.end()
}

fn test_set_sink(s: &mut Session) -> TestResult {
    let mut t = s.start("test_set_sink");

    let (mut inner, out) = probe();
    let previous = inner.set_sink(SharedOutput::null());
    let wide = inner.set_wide_sink(SharedOutput::null());
    let _ = inner.start("test_silent").end();
    expect!(t, out.is_empty());

    inner.set_sink(previous);
    inner.set_wide_sink(wide);
    let _ = inner.start("test_loud").end();
    expect!(t, !out.is_empty());

    t.end()
}

fn test_report(s: &mut Session) -> TestResult {
    s.group("test_report", |s, g| {
        s.run(g, test_group_start);
        s.run(g, test_group_end);
        s.run(g, test_group_members);
        s.run(g, test_set_sink);
    })
}

// ============================================================================
// CHECK
// ============================================================================

fn test_scan(s: &mut Session) -> TestResult {
    let mut t = s.start("test_scan");

    let scanned = FormatScanner.scan("123", "%3u");
    expect!(t, matches!(scanned.as_deref(), Ok([ScanValue::Uint(123)])));
    expect!(t, matches!(FormatScanner.scan("aaa", "%3u").as_deref(), Ok([])));

    t.end()
}

fn test_strcmp(s: &mut Session) -> TestResult {
    let mut t = s.start("test_strcmp");

    expect!(t, diff::str_eq(None, None));
    expect!(t, !diff::str_eq(Some(""), None));
    expect!(t, !diff::str_eq(None, Some("")));
    expect!(t, diff::str_eq(Some(""), Some("")));
    expect!(t, !diff::str_eq(Some(""), Some(" ")));
    expect!(t, !diff::str_eq(Some(" "), Some("")));
    expect!(t, diff::str_eq(Some("a"), Some("a")));
    expect!(t, !diff::str_eq(Some("a"), Some("b")));
    expect!(t, !diff::str_eq(Some("b"), Some("a")));

    t.end()
}

fn test_strncmp(s: &mut Session) -> TestResult {
    let mut t = s.start("test_strncmp");

    expect!(t, diff::strn_eq(None, None, 0));
    expect!(t, !diff::strn_eq(None, None, 1));
    expect!(t, !diff::strn_eq(Some(""), None, 0));
    expect!(t, !diff::strn_eq(None, Some(""), 0));
    expect!(t, diff::strn_eq(Some(""), Some(""), 0));
    expect!(t, !diff::strn_eq(Some(""), Some(" "), 1));
    expect!(t, diff::strn_eq(Some(" "), Some(""), 0));
    expect!(t, diff::strn_eq(Some("a"), Some("a"), 1));
    expect!(t, !diff::strn_eq(Some("a"), Some("b"), 1));
    expect!(t, !diff::strn_eq(Some("b"), Some("a"), 1));

    t.end()
}

fn test_wstrcmp(s: &mut Session) -> TestResult {
    let mut t = s.start("test_wstrcmp");

    let (empty, space, a, b): (&[char], &[char], &[char], &[char]) = (&[], &[' '], &['a'], &['b']);
    expect!(t, diff::wstr_eq(None, None));
    expect!(t, !diff::wstr_eq(Some(empty), None));
    expect!(t, !diff::wstr_eq(None, Some(empty)));
    expect!(t, diff::wstr_eq(Some(empty), Some(empty)));
    expect!(t, !diff::wstr_eq(Some(empty), Some(space)));
    expect!(t, !diff::wstr_eq(Some(space), Some(empty)));
    expect!(t, diff::wstr_eq(Some(a), Some(a)));
    expect!(t, !diff::wstr_eq(Some(a), Some(b)));
    expect!(t, !diff::wstr_eq(Some(b), Some(a)));

    t.end()
}

fn test_wstrncmp(s: &mut Session) -> TestResult {
    let mut t = s.start("test_wstrncmp");

    let (empty, space, a, b): (&[char], &[char], &[char], &[char]) = (&[], &[' '], &['a'], &['b']);
    expect!(t, diff::wstrn_eq(None, None, 0));
    expect!(t, !diff::wstrn_eq(None, None, 1));
    expect!(t, !diff::wstrn_eq(Some(empty), None, 0));
    expect!(t, !diff::wstrn_eq(None, Some(empty), 0));
    expect!(t, diff::wstrn_eq(Some(empty), Some(empty), 0));
    expect!(t, !diff::wstrn_eq(Some(empty), Some(space), 1));
    expect!(t, diff::wstrn_eq(Some(space), Some(empty), 0));
    expect!(t, diff::wstrn_eq(Some(a), Some(a), 1));
    expect!(t, !diff::wstrn_eq(Some(a), Some(b), 1));
    expect!(t, !diff::wstrn_eq(Some(b), Some(a), 1));

    t.end()
}

fn test_check(s: &mut Session) -> TestResult {
    s.group("test_check", |s, g| {
        s.run(g, test_scan);
        s.run(g, test_strcmp);
        s.run(g, test_strncmp);
        s.run(g, test_wstrcmp);
        s.run(g, test_wstrncmp);
    })
}

// ============================================================================
// EXPECT
// ============================================================================

fn test_expect_check(s: &mut Session) -> TestResult {
    let mut t = s.start("test_expect_check");

    let (mut inner, out) = probe();
    let mut leaf = inner.start("test_func");
    leaf.expect(SITE, false, "check");
    let _ = leaf.end();
    expect_str!(
        t,
        out.take(),
        format!("├─{}\n│ {}\n", red("FAIL func"), red("file:0: check"))
    );

    t.end()
}

fn test_expect_raw(s: &mut Session) -> TestResult {
    let mut t = s.start("test_expect_raw");

    let cases = [
        (0, 0, 1, "(0 == 1)"),
        (1, u8::MIN as u64, u8::MAX as u64, "(00000000 == 11111111)"),
        (2, u16::MIN as u64, u16::MAX as u64, "(0000 == FFFF)"),
        (3, 0, 0, "(Unsupported type of size: 3)"),
        (4, u32::MIN as u64, u32::MAX as u64, "(00000000 == FFFFFFFF)"),
        (8, u64::MIN, u64::MAX, "(0000000000000000 == FFFFFFFFFFFFFFFF)"),
    ];
    for (width, act, exp, values) in cases {
        let (mut inner, out) = probe();
        let mut leaf = inner.start("test_func");
        let held = leaf.expect_raw(
            SITE,
            Relation::Eq,
            Operand::new("(null)", RawScalar::new(width, act)),
            Operand::new("(null)", RawScalar::new(width, exp)),
        );
        let _ = leaf.end();
        expect!(t, !held);
        let line = format!("│ {}\n", red(&format!("file:0: (null) == (null) {values}")));
        expect!(t, out.take().ends_with(&line));
    }

    t.end()
}

fn test_expect_masked(s: &mut Session) -> TestResult {
    let mut t = s.start("test_expect_masked");

    let (mut inner, out) = probe();
    let mut leaf = inner.start("test_func");
    let held = leaf.expect_masked(
        SITE,
        Relation::Eq,
        Operand::new("(null)", false),
        Operand::new("(null)", true),
        1,
    );
    let _ = leaf.end();
    expect!(t, !held);
    let line = format!("│ {}\n", red("file:0: (null) == (null) (0 == 1) & 00000001"));
    expect!(t, out.take().ends_with(&line));

    t.end()
}

/// Diff cases: actual, expected, line, exp text, act text, and the caret
/// column under a narrow header.
const STR_CASES: &[(&str, &str, usize, &str, &str, usize)] = &[
    ("", "", 0, "", "", 7),
    ("a", "a", 0, "a", "a", 8),
    ("\n", "\n", 1, "", "", 7),
    ("a", "b", 0, "b", "a", 7),
    ("a\na", "b\na", 0, "b\\n", "a\\n", 7),
    ("\r\t\x1ba", "\r\t\x1bb", 0, "\\r\\t\\033b", "\\r\\t\\033a", 15),
    ("\n", "\t", 0, "\\t", "\\n", 8),
    ("a", "b\na", 0, "b\\n", "a", 7),
    ("b\na", "a", 0, "a", "b\\n", 7),
];

fn test_expect_str(s: &mut Session) -> TestResult {
    let mut t = s.start("test_expect_str");

    for &(act, exp, line, exp_text, act_text, caret) in STR_CASES {
        let (inner, out) = probe();
        inner.diff_lines(None, act.as_bytes(), exp.as_bytes());
        let block = diff_block(
            &format!("exp:{line}: {exp_text}"),
            &format!("act:{line}: {act_text}"),
            caret,
        );
        expect_str!(t, out.take(), block);
    }

    let (mut inner, out) = probe();
    let mut leaf = inner.start("test_func");
    leaf.expect_str(SITE, Some(""), None);
    let _ = leaf.end();
    expect!(t, out.take().starts_with(&format!(
        "├─{}\n│ {}\n│ {}\n",
        red("FAIL func"),
        red("file:0: "),
        red("exp:0: ")
    )));

    let (mut inner, out) = probe();
    let mut leaf = inner.start("test_func");
    expect!(t, !leaf.expect_strn(SITE, None, None, 1));
    let _ = leaf.end();
    expect!(t, out.take().ends_with(&format!("│ {}\n", red("       ^"))));

    t.end()
}

fn test_expect_wstr(s: &mut Session) -> TestResult {
    let mut t = s.start("test_expect_wstr");

    for &(act, exp, line, exp_text, act_text, caret) in STR_CASES {
        let (mut inner, out) = probe();
        let wide = OutputBuffer::new();
        inner.set_wide_sink(SharedOutput::new(wide.clone()));

        let act: Vec<char> = act.chars().collect();
        let exp: Vec<char> = exp.chars().collect();
        inner.diff_lines(None, &act, &exp);

        // Wide headers are one character longer.
        let block = diff_block(&format!("exp({line}): "), &format!("act({line}): "), caret + 1);
        expect_str!(t, out.take(), block);
        expect_str!(t, wide.take(), format!("{exp_text}{act_text}"));
    }

    t.end()
}

fn test_expect_fmt(s: &mut Session) -> TestResult {
    let mut t = s.start("test_expect_fmt");

    let (mut inner, out) = probe();
    let mut leaf = inner.start("test_func");
    let fields = leaf.expect_fmt(SITE, "%u", 1, "");
    let _ = leaf.end();
    expect!(t, fields.is_empty());
    expect!(t, out.take().ends_with(&diff_tail("exp:0: ", "act:0: %u", 7)));

    let (mut inner, _out) = probe();
    let mut leaf = inner.start("test_func");
    let fields = leaf.expect_fmt(SITE, "x=4", 1, "x=%d");
    expect!(t, leaf.passed());
    let _ = leaf.end();
    expect!(t, fields == [ScanValue::Int(4)]);

    t.end()
}

fn test_expect_fail(s: &mut Session) -> TestResult {
    let mut t = s.start("test_expect_fail");

    let (mut inner, out) = probe();
    let mut leaf = inner.start("test_func");
    expect_fail!(leaf, "{}", "FAIL");
    let _ = leaf.end();
    expect_str!(t, out.take(), format!("├─{}\n│ {}\n", red("FAIL func"), red("FAIL")));

    t.end()
}

fn test_expect_output(s: &mut Session) -> TestResult {
    let mut t = s.start("test_expect_output");

    let (mut inner, out) = probe();
    let mut leaf = inner.start("test_func");
    let held = leaf.expect_output(SITE, "42", |buf| {
        buf.append_fmt(format_args!("{}", 42));
    });
    expect!(t, held);
    expect!(t, leaf.end() == TestResult::Passed);
    expect!(t, !out.take().contains("FAIL"));

    let mut inner = Session::new(
        SessionConfig::default()
            .with_print(false)
            .with_capture_limit(4),
    );
    let out = OutputBuffer::new();
    inner.set_sink(SharedOutput::new(out.clone()));
    let mut leaf = inner.start("test_func");
    let held = leaf.expect_output(SITE, "abc", |buf| {
        buf.append("abcdef");
    });
    let _ = leaf.end();
    expect!(t, !held);
    expect!(t, out
        .take()
        .ends_with(&format!("│ {}\n", red("capture truncated: 3 B dropped"))));

    t.end()
}

fn test_expect(s: &mut Session) -> TestResult {
    s.group("test_expect", |s, g| {
        s.run(g, test_expect_check);
        s.run(g, test_expect_raw);
        s.run(g, test_expect_masked);
        s.run(g, test_expect_str);
        s.run(g, test_expect_wstr);
        s.run(g, test_expect_fmt);
        s.run(g, test_expect_fail);
        s.run(g, test_expect_output);
    })
}

#[cfg(test)]
mod selftest_tests {
    use super::*;

    #[test]
    fn suite_passes() {
        let (mut session, out) = probe();
        let result = session.run_top(|s| run_suite(s, None), true);
        assert_eq!(result, TestResult::Passed, "{}", out.contents());
        assert_eq!(session.failed(), 0);
        assert!(out.contents().starts_with("ctest\n├─session\n"));
    }

    #[test]
    fn filter_selects_groups() {
        let (mut session, out) = probe();
        run_suite(&mut session, Some("check"));
        let report = out.contents();
        assert!(report.contains("├─check\n"));
        assert!(!report.contains("├─session\n"));
        assert_eq!(session.passed(), 5);
    }
}

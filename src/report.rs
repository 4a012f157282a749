//! Tree-shaped report writer.
//!
//! Every line is indented by one vertical unit per open group below the
//! current depth. Leaves and group openings hang off a branch connector, a
//! group's tally hangs off the final-branch connector. Failures are red,
//! passes green; the escape sequences and box-drawing glyphs are fixed
//! because downstream tooling parses them.

use crate::diff::{DiffReport, DiffUnit};
use crate::mem;
use crate::outcome::{Summary, TestResult};
use crate::session::Session;

pub const RED: &str = "\x1b[0;31m";
pub const GREEN: &str = "\x1b[0;32m";
pub const RESET: &str = "\x1b[0m";

pub const VERTICAL: &str = "│ ";
pub const BRANCH: &str = "├─";
pub const LAST_BRANCH: &str = "└─";

/// Where an assertion or test end was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub file: &'static str,
    pub line: u32,
}

impl Site {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self::new(location.file(), location.line())
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// An open group. Returned by [`Session::group_start`] and consumed by
/// [`Session::group_end`], which restores the depth recorded here.
#[must_use = "a group must be closed with `group_end`"]
#[derive(Debug)]
pub struct Group {
    depth: i32,
    passed: u32,
    failed: u32,
}

impl Group {
    pub fn record(&mut self, result: TestResult) {
        if result.is_failed() {
            self.failed += 1;
        } else {
            self.passed += 1;
        }
    }

    pub fn passed(&self) -> u32 {
        self.passed
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }
}

/// `PASS n TEST[S]` in green or `FAIL f/(f+n) TEST[S]` in red.
pub fn tally(passed: u64, failed: u64) -> String {
    let noun = |count: u64| if count == 1 { "TEST" } else { "TESTS" };
    if failed == 0 {
        format!("{GREEN}PASS {passed} {}{RESET}\n", noun(passed))
    } else {
        format!(
            "{RED}FAIL {failed}/{} {}{RESET}\n",
            failed + passed,
            noun(failed)
        )
    }
}

impl Session {
    pub(crate) fn emit(&self, text: &str) -> usize {
        self.sink.emit(text)
    }

    fn indent(&self) {
        for _ in 0..self.depth.max(0) {
            self.emit(VERTICAL);
        }
    }

    // ------------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------------

    /// Prints the group's display name and descends one level.
    pub fn group_start(&mut self, name: &str) -> Group {
        self.indent();
        if self.depth >= 0 {
            self.emit(BRANCH);
        }
        self.emit(&format!("{}\n", self.config.display_name(name)));

        let group = Group {
            depth: self.depth,
            passed: 0,
            failed: 0,
        };
        self.depth += 1;
        tracing::debug!(name, depth = self.depth, "group opened");
        group
    }

    /// Prints the group tally and returns to the depth the group opened at.
    /// Returns true if any member failed.
    pub fn group_end(&mut self, group: Group) -> bool {
        self.indent();
        self.emit(LAST_BRANCH);
        self.emit(&tally(group.passed.into(), group.failed.into()));
        self.depth = group.depth;
        tracing::debug!(
            passed = group.passed,
            failed = group.failed,
            depth = self.depth,
            "group closed"
        );
        group.failed > 0
    }

    // ------------------------------------------------------------------------
    // Leaves
    // ------------------------------------------------------------------------

    /// Closes a leaf test. Teardown runs first regardless of outcome. A
    /// failed test only bumps the counter since its assertions already
    /// printed the details. A passing test whose allocation count moved is
    /// reported as a leak and counted as failed.
    pub(crate) fn leaf_end(&mut self, name: &str, passed: bool, site: Site) -> TestResult {
        self.run_teardown();

        if !passed {
            self.failed += 1;
            return TestResult::Failed;
        }

        self.indent();
        self.emit(BRANCH);

        let name = self.config.display_name(name);
        let delta = mem::delta(self.mem_snapshot, self.mem.live_bytes());
        if delta != 0 {
            tracing::warn!(test = name, bytes = delta, "allocation imbalance");
            self.emit(&format!("{RED}LEAK {name}{RESET}\n"));
            self.failure_line(Some(site), &format!("{delta} B"));
            self.failed += 1;
            return TestResult::Failed;
        }

        self.emit(&format!("{GREEN}PASS {name}{RESET}\n"));
        self.passed += 1;
        TestResult::Passed
    }

    pub(crate) fn print_summary(&self, summary: &Summary) {
        self.emit(&tally(summary.passed, summary.failed));
    }

    // ------------------------------------------------------------------------
    // Failure lines
    // ------------------------------------------------------------------------

    /// `├─FAIL <name>` at the test's own level.
    pub(crate) fn failure_banner(&self, name: &str) {
        self.indent();
        self.emit(BRANCH);
        self.emit(&format!(
            "{RED}FAIL {}{RESET}\n",
            self.config.display_name(name)
        ));
    }

    /// Indentation one level below the test, red on, optional location.
    pub(crate) fn failure_prefix(&self, site: Option<Site>) {
        self.indent();
        self.emit(VERTICAL);
        self.emit(RED);
        if let Some(site) = site {
            self.emit(&format!("{site}: "));
        }
    }

    pub(crate) fn failure_line(&self, site: Option<Site>, text: &str) {
        self.failure_prefix(site);
        self.emit(text);
        self.emit(RESET);
        self.emit("\n");
    }

    /// Location line followed by the `exp`/`act`/caret triple. For wide
    /// units the escaped line content goes to the wide sink and everything
    /// else stays on the narrow one.
    pub(crate) fn diff_lines<T: DiffUnit>(&self, site: Option<Site>, act: &[T], exp: &[T]) {
        self.failure_line(site, "");

        let report = DiffReport::new(act, exp);
        for (label, line) in [("exp", &report.exp), ("act", &report.act)] {
            self.failure_prefix(None);
            self.emit(&report.header(label));
            if report.wide {
                self.wide_sink.emit(&line.text);
            } else {
                self.emit(&line.text);
            }
            self.emit(RESET);
            self.emit("\n");
        }

        let caret = format!("{}^", " ".repeat(report.caret_offset()));
        self.failure_line(None, &caret);
    }
}

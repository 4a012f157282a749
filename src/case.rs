//! Leaf-test context.
//!
//! [`Session::start`] hands out a [`TestCase`]; its `expect_*` methods check
//! one condition each and, on failure, write the explanation through the
//! session's sink. The first failure in a test also prints the test's
//! `FAIL` banner. Every method returns whether its condition held and the
//! body keeps running either way. [`TestCase::end`] closes the test.

use std::fmt;

use crate::capture::{Capture, CaptureBuffer};
use crate::diff::{self, DiffUnit};
use crate::outcome::TestResult;
use crate::report::Site;
use crate::scalar::{self, IntoScalar, RawScalar, Relation};
use crate::scan::ScanValue;
use crate::session::Session;

/// A compared value together with the source text that produced it.
#[derive(Debug, Clone, Copy)]
pub struct Operand<'a, T> {
    pub expr: &'a str,
    pub value: T,
}

impl<'a, T> Operand<'a, T> {
    pub fn new(expr: &'a str, value: T) -> Self {
        Self { expr, value }
    }
}

#[must_use = "a test must be finished with `end`"]
pub struct TestCase<'s> {
    session: &'s mut Session,
    name: &'s str,
    passed: bool,
}

impl<'s> TestCase<'s> {
    pub(crate) fn new(session: &'s mut Session, name: &'s str) -> Self {
        Self {
            session,
            name,
            passed: true,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// False once any assertion in this test has failed.
    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn session(&mut self) -> &mut Session {
        self.session
    }

    pub fn user_data<T: 'static>(&self) -> Option<&T> {
        self.session.user_data()
    }

    pub fn user_data_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.session.user_data_mut()
    }

    fn begin_failure(&mut self) {
        if self.passed {
            self.session.failure_banner(self.name);
            self.passed = false;
        }
    }

    fn report(&mut self, site: Option<Site>, text: &str) {
        self.begin_failure();
        self.session.failure_line(site, text);
    }

    fn report_diff<T: DiffUnit>(&mut self, site: Site, act: &[T], exp: &[T]) {
        self.begin_failure();
        self.session.diff_lines(Some(site), act, exp);
    }

    // ------------------------------------------------------------------------
    // Conditions and scalars
    // ------------------------------------------------------------------------

    /// Fails with the source text of `check` when `ok` is false.
    pub fn expect(&mut self, site: Site, ok: bool, check: &str) -> bool {
        if !ok {
            self.report(Some(site), check);
        }
        ok
    }

    /// Compares two typed values with `rel`; on failure prints both
    /// expressions and both values rendered for their width.
    pub fn expect_cmp<T>(&mut self, site: Site, rel: Relation, act: Operand<'_, T>, exp: Operand<'_, T>) -> bool
    where
        T: PartialOrd + IntoScalar,
    {
        let ok = rel.holds(&act.value, &exp.value);
        if !ok {
            let line = scalar::describe(
                act.expr,
                rel,
                exp.expr,
                act.value.into_scalar(),
                exp.value.into_scalar(),
            );
            self.report(Some(site), &line);
        }
        ok
    }

    /// Compares only the bits selected by `mask`. With `Relation::Eq` this
    /// holds iff `(act ^ exp) & mask == 0`.
    pub fn expect_masked<A, B>(
        &mut self,
        site: Site,
        rel: Relation,
        act: Operand<'_, A>,
        exp: Operand<'_, B>,
        mask: u64,
    ) -> bool
    where
        A: IntoScalar,
        B: IntoScalar,
    {
        let (a, b) = (act.value.into_scalar(), exp.value.into_scalar());
        let ok = match rel {
            Relation::Eq => scalar::masked_eq(a, b, mask),
            Relation::Ne => !scalar::masked_eq(a, b, mask),
            _ => rel.holds(&(a.bits() & mask), &(b.bits() & mask)),
        };
        if !ok {
            let line = scalar::describe_masked(act.expr, rel, exp.expr, a, b, mask);
            self.report(Some(site), &line);
        }
        ok
    }

    /// Compares values whose widths are only known at runtime. An
    /// unsupported width never passes.
    pub fn expect_raw(
        &mut self,
        site: Site,
        rel: Relation,
        act: Operand<'_, RawScalar>,
        exp: Operand<'_, RawScalar>,
    ) -> bool {
        let ok = match (act.value.scalar(), exp.value.scalar()) {
            (Ok(a), Ok(b)) => rel.holds(&a.bits(), &b.bits()),
            _ => false,
        };
        if !ok {
            let line = scalar::describe_raw(act.expr, rel, exp.expr, act.value, exp.value);
            self.report(Some(site), &line);
        }
        ok
    }

    // ------------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------------

    pub fn expect_str(&mut self, site: Site, act: Option<&str>, exp: Option<&str>) -> bool {
        let ok = diff::str_eq(act, exp);
        if !ok {
            let (act, exp) = (act.unwrap_or_default(), exp.unwrap_or_default());
            self.report_diff(site, act.as_bytes(), exp.as_bytes());
        }
        ok
    }

    /// Compares the first `n` bytes. Fails outright unless `exp` is exactly
    /// `n` bytes long.
    pub fn expect_strn(&mut self, site: Site, act: Option<&str>, exp: Option<&str>, n: usize) -> bool {
        let ok = diff::strn_eq(act, exp, n);
        if !ok {
            let act = act.unwrap_or_default().as_bytes();
            let exp = exp.unwrap_or_default().as_bytes();
            self.report_diff(site, &act[..n.min(act.len())], exp);
        }
        ok
    }

    pub fn expect_wstr(&mut self, site: Site, act: Option<&[char]>, exp: Option<&[char]>) -> bool {
        let ok = diff::wstr_eq(act, exp);
        if !ok {
            let (act, exp) = (act.unwrap_or_default(), exp.unwrap_or_default());
            self.report_diff(site, act, exp);
        }
        ok
    }

    pub fn expect_wstrn(
        &mut self,
        site: Site,
        act: Option<&[char]>,
        exp: Option<&[char]>,
        n: usize,
    ) -> bool {
        let ok = diff::wstrn_eq(act, exp, n);
        if !ok {
            let (act, exp) = (act.unwrap_or_default(), exp.unwrap_or_default());
            self.report_diff(site, &act[..n.min(act.len())], exp);
        }
        ok
    }

    /// Scans `input` with `fmt` and expects exactly `count` fields. On a
    /// count mismatch the input is diffed against the format. A malformed
    /// format fails the test with the scanner's error.
    pub fn expect_fmt(&mut self, site: Site, input: &str, count: usize, fmt: &str) -> Vec<ScanValue> {
        match self.session.scanner.scan(input, fmt) {
            Ok(values) => {
                if values.len() != count {
                    self.report_diff(site, input.as_bytes(), fmt.as_bytes());
                }
                values
            }
            Err(err) => {
                self.report(Some(site), &err.to_string());
                Vec::new()
            }
        }
    }

    /// Unconditional failure with a free-form message.
    pub fn fail(&mut self, message: impl fmt::Display) {
        self.report(None, &message.to_string());
    }

    // ------------------------------------------------------------------------
    // Captured output
    // ------------------------------------------------------------------------

    /// Resets the scratch buffer for a capture of `expected`.
    pub fn capture_start<'e>(&mut self, expected: &'e str) -> Capture<'e> {
        if let Err(err) = self.session.capture.reset(expected.len()) {
            tracing::warn!(error = %err, "capture buffer growth refused");
        }
        Capture::new(expected)
    }

    /// The scratch buffer code under test writes into.
    pub fn capture(&mut self) -> &mut CaptureBuffer {
        &mut self.session.capture
    }

    /// Compares the captured text with the capture's expected string. A
    /// capture that dropped bytes never matches.
    pub fn capture_end(&mut self, site: Site, capture: Capture<'_>) -> bool {
        let expected = capture.expected();
        let dropped = self.session.capture.dropped();
        let ok = dropped == 0 && self.session.capture.as_bytes() == expected.as_bytes();
        if ok {
            return true;
        }

        self.begin_failure();
        let session = &*self.session;
        session.diff_lines(Some(site), session.capture.as_bytes(), expected.as_bytes());
        if dropped > 0 {
            session.failure_line(None, &format!("capture truncated: {dropped} B dropped"));
        }
        false
    }

    /// Captures whatever `print` writes and compares it with `expected`.
    pub fn expect_output<F>(&mut self, site: Site, expected: &str, print: F) -> bool
    where
        F: FnOnce(&mut CaptureBuffer),
    {
        let capture = self.capture_start(expected);
        print(self.capture());
        self.capture_end(site, capture)
    }

    // ------------------------------------------------------------------------
    // End
    // ------------------------------------------------------------------------

    /// Closes the test; the caller's location is used for a leak report.
    #[track_caller]
    pub fn end(self) -> TestResult {
        let site = Site::caller();
        self.end_at(site)
    }

    pub fn end_at(self, site: Site) -> TestResult {
        self.session.leaf_end(self.name, self.passed, site)
    }
}

impl fmt::Debug for TestCase<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("passed", &self.passed)
            .finish()
    }
}

//! Harness session state.
//!
//! A [`Session`] owns everything a run needs: the two output sinks, the
//! nesting depth, the pass/fail counters, setup and teardown hooks, the
//! caller's user data, the capture scratch buffer, the allocation counter
//! and the scanner. It is created once, threaded through every test by
//! `&mut`, and consumed by [`Session::finish`].

use std::any::Any;
use std::rc::Rc;

use crate::capture::CaptureBuffer;
use crate::case::TestCase;
use crate::config::SessionConfig;
use crate::mem::{MemCounter, NoMemStats};
use crate::outcome::{Summary, TestResult};
use crate::report::Group;
use crate::scan::{FormatScanner, Scanner};
use crate::sink::SharedOutput;

/// Setup/teardown hook. Receives the session's user data, if any.
pub type Hook = Box<dyn FnMut(Option<&mut (dyn Any + 'static)>)>;

pub struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) sink: SharedOutput,
    pub(crate) wide_sink: SharedOutput,
    pub(crate) depth: i32,
    pub(crate) passed: u64,
    pub(crate) failed: u64,
    pub(crate) setup: Option<Hook>,
    pub(crate) teardown: Option<Hook>,
    pub(crate) user_data: Option<Box<dyn Any>>,
    pub(crate) capture: CaptureBuffer,
    pub(crate) mem: Rc<dyn MemCounter>,
    pub(crate) mem_snapshot: usize,
    pub(crate) scanner: Box<dyn Scanner>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("depth", &self.depth)
            .field("passed", &self.passed)
            .field("failed", &self.failed)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Fresh session at top level with zeroed counters. Output goes to
    /// stdout unless `config.print` is false.
    pub fn new(config: SessionConfig) -> Self {
        let (sink, wide_sink) = if config.print {
            (SharedOutput::stdout(), SharedOutput::stdout())
        } else {
            (SharedOutput::null(), SharedOutput::null())
        };
        let capture = CaptureBuffer::new(config.capture_capacity, config.capture_limit);

        Self {
            config,
            sink,
            wide_sink,
            depth: -1,
            passed: 0,
            failed: 0,
            setup: None,
            teardown: None,
            user_data: None,
            capture,
            mem: Rc::new(NoMemStats),
            mem_snapshot: 0,
            scanner: Box::new(FormatScanner),
        }
    }

    /// Prints the run summary line and returns the counters.
    pub fn finish(self) -> Summary {
        let summary = self.summary();
        self.print_summary(&summary);
        summary
    }

    pub fn summary(&self) -> Summary {
        Summary {
            passed: self.passed,
            failed: self.failed,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn passed(&self) -> u64 {
        self.passed
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    // ------------------------------------------------------------------------
    // Sinks
    // ------------------------------------------------------------------------

    /// Installs `sink` for narrow output and returns the previous one.
    pub fn set_sink(&mut self, sink: SharedOutput) -> SharedOutput {
        std::mem::replace(&mut self.sink, sink)
    }

    /// Installs `sink` for wide output and returns the previous one.
    pub fn set_wide_sink(&mut self, sink: SharedOutput) -> SharedOutput {
        std::mem::replace(&mut self.wide_sink, sink)
    }

    pub fn sink(&self) -> &SharedOutput {
        &self.sink
    }

    pub fn wide_sink(&self) -> &SharedOutput {
        &self.wide_sink
    }

    // ------------------------------------------------------------------------
    // Collaborators
    // ------------------------------------------------------------------------

    /// Replaces the user data, returning the previous value.
    pub fn set_user_data<T: Any>(&mut self, data: T) -> Option<Box<dyn Any>> {
        self.user_data.replace(Box::new(data))
    }

    pub fn take_user_data(&mut self) -> Option<Box<dyn Any>> {
        self.user_data.take()
    }

    pub fn user_data<T: Any>(&self) -> Option<&T> {
        self.user_data.as_deref()?.downcast_ref()
    }

    pub fn user_data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.user_data.as_deref_mut()?.downcast_mut()
    }

    pub fn set_setup<F>(&mut self, hook: F)
    where
        F: FnMut(Option<&mut (dyn Any + 'static)>) + 'static,
    {
        self.setup = Some(Box::new(hook));
    }

    pub fn set_teardown<F>(&mut self, hook: F)
    where
        F: FnMut(Option<&mut (dyn Any + 'static)>) + 'static,
    {
        self.teardown = Some(Box::new(hook));
    }

    pub fn clear_hooks(&mut self) {
        self.setup = None;
        self.teardown = None;
    }

    pub fn set_mem_counter(&mut self, counter: Rc<dyn MemCounter>) {
        self.mem = counter;
    }

    pub fn set_scanner(&mut self, scanner: Box<dyn Scanner>) {
        self.scanner = scanner;
    }

    pub(crate) fn run_setup(&mut self) {
        if let Some(setup) = self.setup.as_mut() {
            setup(self.user_data.as_deref_mut());
        }
    }

    pub(crate) fn run_teardown(&mut self) {
        if let Some(teardown) = self.teardown.as_mut() {
            teardown(self.user_data.as_deref_mut());
        }
    }

    // ------------------------------------------------------------------------
    // Running tests
    // ------------------------------------------------------------------------

    /// Begins a leaf test: snapshots the allocation counter, runs setup and
    /// hands back the assertion context. Finish it with [`TestCase::end`].
    pub fn start<'s>(&'s mut self, name: &'s str) -> TestCase<'s> {
        self.mem_snapshot = self.mem.live_bytes();
        self.run_setup();
        TestCase::new(self, name)
    }

    /// Runs a test or group at top level. With `print == false` both sinks
    /// are replaced by null sinks for the duration and restored afterwards.
    pub fn run_top<F>(&mut self, test: F, print: bool) -> TestResult
    where
        F: FnOnce(&mut Session) -> TestResult,
    {
        if print {
            return test(self);
        }

        tracing::debug!("suppressing output for top-level run");
        let sink = self.set_sink(SharedOutput::null());
        let wide_sink = self.set_wide_sink(SharedOutput::null());
        let result = test(self);
        self.set_sink(sink);
        self.set_wide_sink(wide_sink);
        result
    }

    /// Runs `test` as a member of `group` and records its result there.
    pub fn run<F>(&mut self, group: &mut Group, test: F) -> TestResult
    where
        F: FnOnce(&mut Session) -> TestResult,
    {
        let result = test(self);
        group.record(result);
        result
    }

    /// Opens a group, runs `body` inside it and closes it.
    pub fn group<F>(&mut self, name: &str, body: F) -> TestResult
    where
        F: FnOnce(&mut Session, &mut Group),
    {
        let mut group = self.group_start(name);
        body(self, &mut group);
        TestResult::from_failed(self.group_end(group))
    }
}

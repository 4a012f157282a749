//! Output destinations for harness reports.
//!
//! The harness never decides where its text goes. It writes through an
//! [`OutputSink`], and the session holds two of them: one for narrow text and
//! one for wide-character content. Sinks are shared handles so a caller can
//! keep a clone of an [`OutputBuffer`] and read what the harness wrote.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

// ============================================================================
// SINK TRAIT
// ============================================================================

/// A destination for formatted harness text.
pub trait OutputSink {
    /// Writes `text` and returns the number of bytes accepted.
    fn emit(&mut self, text: &str) -> usize;

    /// Running byte offset: total bytes accepted since the sink was created.
    fn offset(&self) -> usize;
}

// ============================================================================
// SINK IMPLEMENTATIONS
// ============================================================================

/// Discards everything. Used to run tests silently.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _text: &str) -> usize {
        0
    }

    fn offset(&self) -> usize {
        0
    }
}

/// Writes to the process stdout.
#[derive(Debug, Default)]
pub struct StdoutSink {
    written: usize,
}

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) -> usize {
        let mut out = std::io::stdout().lock();
        if out.write_all(text.as_bytes()).is_err() {
            return 0;
        }
        self.written += text.len();
        text.len()
    }

    fn offset(&self) -> usize {
        self.written
    }
}

/// Collects output into memory, for testing the harness itself.
///
/// Clones share the same storage, so a test keeps one clone and hands the
/// other to the session.
#[derive(Debug, Default, Clone)]
pub struct OutputBuffer {
    buffer: Rc<RefCell<String>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> String {
        self.buffer.borrow().clone()
    }

    /// Returns the contents and empties the buffer.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buffer.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.borrow().is_empty()
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str) -> usize {
        self.buffer.borrow_mut().push_str(text);
        text.len()
    }

    fn offset(&self) -> usize {
        self.buffer.borrow().len()
    }
}

// ============================================================================
// SHARED HANDLE
// ============================================================================

/// Cloneable handle to a boxed sink. Swapping a session's sink moves these
/// handles around; the previous one is returned so callers can restore it.
#[derive(Clone)]
pub struct SharedOutput(pub Rc<RefCell<dyn OutputSink>>);

impl SharedOutput {
    /// Create a new SharedOutput from any OutputSink.
    pub fn new<T: OutputSink + 'static>(sink: T) -> Self {
        SharedOutput(Rc::new(RefCell::new(sink)))
    }

    pub fn null() -> Self {
        Self::new(NullSink)
    }

    pub fn stdout() -> Self {
        Self::new(StdoutSink::default())
    }

    /// Emit text via the sink, returning the bytes accepted.
    pub fn emit(&self, text: &str) -> usize {
        self.0.borrow_mut().emit(text)
    }

    pub fn offset(&self) -> usize {
        self.0.borrow().offset()
    }

    /// True when both handles point at the same sink.
    pub fn same_sink(&self, other: &SharedOutput) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for SharedOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedOutput")
            .field("offset", &self.offset())
            .finish()
    }
}

#[cfg(test)]
mod sink_tests {
    use super::*;

    #[test]
    fn buffer_clones_share_storage() {
        let buf = OutputBuffer::new();
        let out = SharedOutput::new(buf.clone());
        assert_eq!(out.emit("ab"), 2);
        assert_eq!(out.emit("c"), 1);
        assert_eq!(buf.contents(), "abc");
        assert_eq!(out.offset(), 3);
        assert_eq!(buf.take(), "abc");
        assert!(buf.is_empty());
    }

    #[test]
    fn null_sink_accepts_nothing() {
        let out = SharedOutput::null();
        assert_eq!(out.emit("ignored"), 0);
        assert_eq!(out.offset(), 0);
    }

    #[test]
    fn same_sink_compares_handles() {
        let a = SharedOutput::null();
        let b = a.clone();
        let c = SharedOutput::null();
        assert!(a.same_sink(&b));
        assert!(!a.same_sink(&c));
    }
}

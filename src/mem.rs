//! Allocation counter capability used for leak detection.
//!
//! The harness does not count allocations itself. Whatever wraps the
//! allocator exposes the current number of live bytes, and the session reads
//! it once when a leaf test starts and once when it ends.

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};

pub trait MemCounter {
    /// Total bytes currently allocated and not yet freed.
    fn live_bytes(&self) -> usize;
}

/// Reports zero forever, which disables leak detection.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMemStats;

impl MemCounter for NoMemStats {
    fn live_bytes(&self) -> usize {
        0
    }
}

impl MemCounter for Cell<usize> {
    fn live_bytes(&self) -> usize {
        self.get()
    }
}

impl MemCounter for AtomicUsize {
    fn live_bytes(&self) -> usize {
        self.load(Ordering::Relaxed)
    }
}

/// Signed byte delta between a snapshot and the current count.
pub fn delta(snapshot: usize, now: usize) -> i64 {
    now as i64 - snapshot as i64
}

#[cfg(test)]
mod mem_tests {
    use super::*;

    #[test]
    fn counters_report_current_value() {
        let cell = Cell::new(5);
        assert_eq!(cell.live_bytes(), 5);
        cell.set(9);
        assert_eq!(cell.live_bytes(), 9);

        let atomic = AtomicUsize::new(3);
        assert_eq!(atomic.live_bytes(), 3);
        assert_eq!(NoMemStats.live_bytes(), 0);
    }

    #[test]
    fn delta_is_signed() {
        assert_eq!(delta(10, 11), 1);
        assert_eq!(delta(10, 6), -4);
        assert_eq!(delta(0, 0), 0);
    }
}

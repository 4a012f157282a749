//! Scratch buffer for captured output.
//!
//! Code under test writes formatted text into the buffer between a capture
//! start and end; the end call compares it with the expected string. Growth
//! failures are soft: the buffer keeps its previous capacity and content, and
//! bytes that do not fit are counted as dropped so the comparison cannot pass
//! on truncated data.

use std::fmt;

use crate::error::HarnessError;

/// Growable, zero-filled byte buffer. The bytes past `len` are always zero,
/// so the content is terminated whenever `capacity > len`.
#[derive(Debug, Clone)]
pub struct CaptureBuffer {
    data: Vec<u8>,
    len: usize,
    limit: Option<usize>,
    dropped: usize,
}

impl CaptureBuffer {
    pub fn new(capacity: usize, limit: Option<usize>) -> Self {
        let capacity = limit.map_or(capacity, |limit| capacity.min(limit));
        Self {
            data: vec![0; capacity],
            len: 0,
            limit,
            dropped: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Bytes refused since the last reset because the buffer could not grow.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn grow(&mut self, requested: usize) -> Result<(), HarnessError> {
        if requested <= self.capacity() {
            return Ok(());
        }
        if let Some(limit) = self.limit {
            if requested > limit {
                return Err(HarnessError::CaptureLimit { requested, limit });
            }
        }
        self.data
            .try_reserve_exact(requested - self.data.len())
            .map_err(|source| HarnessError::CaptureAlloc { requested, source })?;
        self.data.resize(requested, 0);
        Ok(())
    }

    /// Empties the buffer and makes room for `expected_len` bytes plus the
    /// terminator. On growth failure the buffer is still emptied and keeps
    /// its old capacity; the error is returned for the caller to log.
    pub fn reset(&mut self, expected_len: usize) -> Result<(), HarnessError> {
        let grown = self.grow(expected_len + 1);
        self.data.fill(0);
        self.len = 0;
        self.dropped = 0;
        grown
    }

    /// Appends `text` at the current length, doubling capacity as needed.
    /// Returns the number of bytes stored, which is less than `text.len()`
    /// only when growth failed.
    pub fn append(&mut self, text: &str) -> usize {
        let needed = self.len + text.len() + 1;
        if needed > self.capacity() {
            let mut target = needed.max(self.capacity().saturating_mul(2));
            if let Some(limit) = self.limit {
                target = target.min(limit);
            }
            if let Err(err) = self.grow(target) {
                tracing::warn!(error = %err, "capture buffer growth refused");
            }
        }

        let room = self.capacity().saturating_sub(self.len + 1);
        let stored = text.len().min(room);
        self.data[self.len..self.len + stored].copy_from_slice(&text.as_bytes()[..stored]);
        self.len += stored;
        if stored < text.len() {
            self.dropped += text.len() - stored;
            tracing::warn!(dropped = text.len() - stored, "capture buffer full");
        }
        stored
    }

    /// Formats `args` into the buffer, returning the bytes stored.
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) -> usize {
        match args.as_str() {
            Some(text) => self.append(text),
            None => self.append(&args.to_string()),
        }
    }
}

impl fmt::Write for CaptureBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append(s);
        Ok(())
    }
}

/// Borrowed expected string for one capture cycle. Produced by a capture
/// start and consumed by the matching end.
#[must_use = "a capture must be finished with `capture_end`"]
#[derive(Debug, Clone, Copy)]
pub struct Capture<'e> {
    expected: &'e str,
}

impl<'e> Capture<'e> {
    pub(crate) fn new(expected: &'e str) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> &'e str {
        self.expected
    }
}

#[cfg(test)]
mod capture_tests {
    use std::fmt::Write;

    use super::*;

    #[test]
    fn reset_grows_to_expected_plus_terminator() {
        let mut buf = CaptureBuffer::new(1, None);
        buf.reset(2).unwrap();
        assert_eq!(buf.capacity(), 3);
        assert_eq!(buf.append("bb"), 2);
        assert_eq!(buf.as_bytes(), b"bb");
    }

    #[test]
    fn reset_zero_fills_previous_content() {
        let mut buf = CaptureBuffer::new(8, None);
        buf.append("abcdef");
        buf.reset(0).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 8);
        buf.append("x");
        assert_eq!(buf.as_bytes(), b"x");
    }

    #[test]
    fn append_doubles_capacity() {
        let mut buf = CaptureBuffer::new(4, None);
        assert_eq!(buf.append("abcde"), 5);
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.append("fghijklmnop"), 11);
        assert_eq!(buf.capacity(), 17);
        assert_eq!(buf.as_bytes(), b"abcdefghijklmnop");
        assert_eq!(buf.dropped(), 0);
    }

    #[test]
    fn limit_makes_growth_fail_soft() {
        let mut buf = CaptureBuffer::new(4, Some(6));
        let err = buf.reset(8).unwrap_err();
        assert!(matches!(err, HarnessError::CaptureLimit { requested: 9, limit: 6 }));
        assert_eq!(buf.capacity(), 4);

        assert_eq!(buf.append("abcdefgh"), 5);
        assert_eq!(buf.capacity(), 6);
        assert_eq!(buf.as_bytes(), b"abcde");
        assert_eq!(buf.dropped(), 3);

        buf.reset(1).unwrap();
        assert_eq!(buf.dropped(), 0);
    }

    #[test]
    fn fmt_write_appends() {
        let mut buf = CaptureBuffer::new(2, None);
        write!(buf, "{}-{}", 12, "ab").unwrap();
        assert_eq!(buf.as_bytes(), b"12-ab");
        assert_eq!(buf.append_fmt(format_args!("{}", 3)), 1);
        assert_eq!(buf.len(), 6);
    }
}

use serde::Serialize;

/// Outcome of a leaf test or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestResult {
    Passed,
    Failed,
}

impl TestResult {
    pub fn is_failed(self) -> bool {
        self == TestResult::Failed
    }

    /// `Failed` when `failed` is true.
    pub fn from_failed(failed: bool) -> Self {
        if failed {
            TestResult::Failed
        } else {
            TestResult::Passed
        }
    }
}

/// Whole-run counters reported by [`crate::Session::finish`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: u64,
    pub failed: u64,
}

impl Summary {
    /// Process exit status: the failure count, saturated to what a process
    /// can report. 0 means every test passed.
    pub fn exit_code(&self) -> i32 {
        self.failed.min(255) as i32
    }
}

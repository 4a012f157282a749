//! Harness error values.
//!
//! Assertion failures are not errors: they are counted and reported through
//! the sink. The variants here describe the few places where the harness
//! itself cannot do what was asked. None of them abort a run.

use std::collections::TryReserveError;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("Unsupported type of size: {width}")]
    #[diagnostic(
        code(ctest::scalar::width),
        help("scalar operands must be 0 (bit), 1, 2, 4 or 8 bytes wide")
    )]
    UnsupportedWidth { width: usize },

    #[error("capture buffer growth to {requested} B exceeds the configured limit of {limit} B")]
    #[diagnostic(code(ctest::capture::limit))]
    CaptureLimit { requested: usize, limit: usize },

    #[error("capture buffer growth to {requested} B was refused by the allocator")]
    #[diagnostic(code(ctest::capture::alloc))]
    CaptureAlloc {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("malformed conversion in scan format {fmt:?} at byte {position}")]
    #[diagnostic(code(ctest::scan::format))]
    ScanFormat { fmt: String, position: usize },

    #[error("failed to read session config {}", path.display())]
    #[diagnostic(code(ctest::config::read))]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid session config {}", path.display())]
    #[diagnostic(
        code(ctest::config::parse),
        help("expected a JSON object with any of: name_prefix, capture_capacity, capture_limit, print")
    )]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod error_tests {
    use miette::Report;

    use super::*;

    #[test]
    fn unsupported_width_matches_report_text() {
        let err = HarnessError::UnsupportedWidth { width: 3 };
        assert_eq!(err.to_string(), "Unsupported type of size: 3");
    }

    #[test]
    fn diagnostics_carry_codes() {
        let err = HarnessError::CaptureLimit {
            requested: 10,
            limit: 4,
        };
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("ctest::capture::limit"));
    }
}

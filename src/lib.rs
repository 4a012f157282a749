pub use crate::capture::{Capture, CaptureBuffer};
pub use crate::case::{Operand, TestCase};
pub use crate::config::SessionConfig;
pub use crate::error::HarnessError;
pub use crate::mem::{MemCounter, NoMemStats};
pub use crate::outcome::{Summary, TestResult};
pub use crate::report::{Group, Site};
pub use crate::scalar::{IntoScalar, RawScalar, Relation, Scalar};
pub use crate::scan::{FormatScanner, ScanValue, Scanner};
pub use crate::session::{Hook, Session};
pub use crate::sink::{NullSink, OutputBuffer, OutputSink, SharedOutput, StdoutSink};

#[macro_use]
mod macros;

pub mod capture;
pub mod case;
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod mem;
pub mod outcome;
pub mod report;
pub mod scalar;
pub mod scan;
pub mod selftest;
pub mod session;
pub mod sink;

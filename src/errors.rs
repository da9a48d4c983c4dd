//! Common error plumbing for workflow operations.

use failure::Fail;
use std::borrow::Cow;

pub use docflow_macros::WorkflowError;

/// An error raised by a workflow operation.
///
/// Errors which are intended to be reported to the caller in detail carry
/// a stable machine-readable code, used to identify the failure outside
/// the system (CLI output, logs).
pub trait WorkflowError: Fail {
    /// Stable code describing this error.
    ///
    /// `None` marks an internal error; such errors are logged but only
    /// reported to the caller as a generic failure.
    fn code(&self) -> Option<Cow<str>>;
}

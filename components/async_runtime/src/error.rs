//! Errors raised by the host runtime while driving tasks and microtasks.
//!
//! Promise rejections are never reported here: a rejected promise is just
//! settled state. These errors describe failures of the loop itself.

use core_types::JsError;
use thiserror::Error;

/// Failure of an event loop run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A task returned an error; the loop stops at that task.
    #[error("task failed: {0}")]
    TaskFailed(#[from] JsError),

    /// A single microtask checkpoint ran more jobs than the configured budget.
    #[error("microtask checkpoint exceeded its budget of {limit} jobs")]
    MicrotaskBudgetExceeded {
        /// The configured budget
        limit: usize,
    },
}

/// Result type for event loop operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

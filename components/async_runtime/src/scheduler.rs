//! The seam between promises and the host's job queue.
//!
//! A promise never runs a reaction itself. It hands a [`MicroTask`] to the
//! [`Scheduler`] it was created with, and every promise derived from it
//! inherits the same scheduler. Any FIFO queue that runs jobs after the
//! current synchronous work unwinds satisfies the contract.

use crate::promise::Promise;
use crate::task_queue::MicroTask;
use std::rc::Rc;

/// Shared handle to a scheduler, captured by every promise.
pub type SchedulerRef = Rc<dyn Scheduler>;

/// What happened to a promise's observed status, for rejection tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionOperation {
    /// The promise was rejected while no reaction had ever been registered.
    Reject,
    /// A reaction was attached to a promise previously reported as `Reject`.
    Handle,
}

/// Host job queue used by promises.
pub trait Scheduler {
    /// Queues `job` to run after the current synchronous execution, in FIFO
    /// order with every other microtask.
    fn enqueue_microtask(&self, job: MicroTask);

    /// Observes rejections nobody has handled yet. The default ignores them.
    fn promise_rejection_tracker(&self, _promise: &Promise, _operation: RejectionOperation) {}
}

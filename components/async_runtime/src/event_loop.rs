//! Event loop implementation.
//!
//! This module provides the host event loop that coordinates task, timer and
//! microtask execution, and that serves as the [`Scheduler`] for promises.

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::promise::Promise;
use crate::scheduler::{RejectionOperation, Scheduler, SchedulerRef};
use crate::task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue, TimerQueue};
use core_types::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, trace, warn};

#[derive(Debug, Default)]
struct LoopState {
    config: RuntimeConfig,
    task_queue: RefCell<TaskQueue>,
    microtask_queue: RefCell<MicrotaskQueue>,
    timers: RefCell<TimerQueue>,
    now: Cell<u64>,
    unhandled: RefCell<Vec<UnhandledRejection>>,
}

/// A promise that was rejected while nothing observed it.
///
/// Only the id and reason are kept, so a recorded rejection does not keep
/// its promise (and through it, the loop) alive.
#[derive(Debug, Clone, PartialEq)]
pub struct UnhandledRejection {
    /// Id of the rejected promise, as returned by [`Promise::id`]
    pub promise_id: u64,
    /// The rejection reason
    pub reason: Value,
}

impl Scheduler for LoopState {
    fn enqueue_microtask(&self, job: MicroTask) {
        self.microtask_queue.borrow_mut().enqueue(job);
    }

    fn promise_rejection_tracker(&self, promise: &Promise, operation: RejectionOperation) {
        if !self.config.track_rejections {
            return;
        }
        let mut unhandled = self.unhandled.borrow_mut();
        match operation {
            RejectionOperation::Reject => {
                debug!(promise = promise.id(), "rejected without handlers");
                unhandled.push(UnhandledRejection {
                    promise_id: promise.id(),
                    reason: promise.value().unwrap_or(Value::Undefined),
                });
            }
            RejectionOperation::Handle => {
                unhandled.retain(|entry| entry.promise_id != promise.id());
            }
        }
    }
}

/// The event loop.
///
/// `EventLoop` is a cheap handle; clones share the same queues, so a task
/// can capture a clone to schedule more work. Each iteration (turn) of the
/// loop:
/// 1. Takes the oldest task, or if there is none the earliest timer, and runs it
/// 2. Drains all microtasks in the microtask queue
/// 3. Repeats
///
/// Timers run on a virtual clock: the loop never sleeps, it jumps the clock
/// to the next deadline once no ordinary task is ready.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Handler, Promise};
/// use core_types::Value;
///
/// let event_loop = EventLoop::new();
/// let promise = Promise::resolve(&event_loop.scheduler(), Value::from(1));
/// let doubled = promise.then(
///     Some(Handler::new(|v| match v {
///         Value::Smi(n) => Ok(Value::Smi(n * 2)),
///         other => Ok(other),
///     })),
///     None,
/// );
///
/// event_loop.run_until_done().unwrap();
/// assert_eq!(doubled.value(), Some(Value::Smi(2)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLoop {
    state: Rc<LoopState>,
}

impl EventLoop {
    /// Creates a new EventLoop with empty queues and the default config.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Creates a new EventLoop with the given config.
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            state: Rc::new(LoopState {
                config,
                ..LoopState::default()
            }),
        }
    }

    /// The configuration this loop was created with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.state.config
    }

    /// Returns the scheduler handle promises use to queue their reactions.
    pub fn scheduler(&self) -> SchedulerRef {
        self.state.clone()
    }

    /// Current reading of the virtual clock, in milliseconds.
    pub fn now(&self) -> u64 {
        self.state.now.get()
    }

    /// Adds a task to the task queue.
    pub fn enqueue_task(&self, task: Task) {
        self.state.task_queue.borrow_mut().enqueue(task);
    }

    /// Adds a microtask to the microtask queue.
    pub fn enqueue_microtask(&self, microtask: MicroTask) {
        self.state.enqueue_microtask(microtask);
    }

    /// Schedules `task` to run once the virtual clock has advanced by `delay_ms`.
    pub fn set_timeout(&self, delay_ms: u64, task: Task) {
        let deadline = self.now().saturating_add(delay_ms);
        trace!(deadline, "timer scheduled");
        self.state.timers.borrow_mut().schedule(deadline, task);
    }

    /// Returns true if the task queue is empty.
    pub fn is_task_queue_empty(&self) -> bool {
        self.state.task_queue.borrow().is_empty()
    }

    /// Returns true if the microtask queue is empty.
    pub fn is_microtask_queue_empty(&self) -> bool {
        self.state.microtask_queue.borrow().is_empty()
    }

    /// Returns the number of timers that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.state.timers.borrow().len()
    }

    /// Runs all microtasks in the queue until empty.
    ///
    /// New microtasks added during execution are also processed before this
    /// method returns, subject to the configured budget.
    pub fn run_all_microtasks(&self) -> RuntimeResult<()> {
        let budget = self.state.config.microtask_budget;
        let mut ran = 0usize;
        loop {
            if let Some(limit) = budget {
                if ran >= limit && !self.is_microtask_queue_empty() {
                    warn!(limit, "microtask budget exhausted");
                    return Err(RuntimeError::MicrotaskBudgetExceeded { limit });
                }
            }
            let next = self.state.microtask_queue.borrow_mut().dequeue();
            let Some(microtask) = next else {
                break;
            };
            ran += 1;
            microtask.run();
        }
        if ran > 0 {
            trace!(ran, "microtask checkpoint complete");
        }
        Ok(())
    }

    /// Runs all queued tasks (without processing microtasks between them).
    ///
    /// This is primarily for testing purposes.
    pub fn run_all_tasks(&self) -> RuntimeResult<()> {
        loop {
            let next = self.state.task_queue.borrow_mut().dequeue();
            match next {
                Some(task) => task.run()?,
                None => return Ok(()),
            }
        }
    }

    /// Processes one complete cycle: one task (or due timer) followed by all
    /// microtasks.
    ///
    /// Returns `false` if there was no task or timer to run.
    pub fn process_one_cycle(&self) -> RuntimeResult<bool> {
        let ran = match self.next_task() {
            Some(task) => {
                task.run()?;
                true
            }
            None => false,
        };
        self.run_all_microtasks()?;
        Ok(ran)
    }

    /// Runs the event loop until all tasks, timers and microtasks are processed.
    pub fn run_until_done(&self) -> RuntimeResult<()> {
        self.run_all_microtasks()?;
        while self.process_one_cycle()? {}
        Ok(())
    }

    /// Drains the promises rejected without a handler since the last call.
    ///
    /// Always empty unless the loop was configured with rejection tracking.
    pub fn take_unhandled_rejections(&self) -> Vec<UnhandledRejection> {
        let rejected = std::mem::take(&mut *self.state.unhandled.borrow_mut());
        for entry in &rejected {
            let reason = &entry.reason;
            warn!(
                promise = entry.promise_id,
                reason = %reason,
                "unhandled promise rejection"
            );
        }
        rejected
    }

    fn next_task(&self) -> Option<Task> {
        if let Some(task) = self.state.task_queue.borrow_mut().dequeue() {
            return Some(task);
        }
        let (deadline, task) = self.state.timers.borrow_mut().pop_next()?;
        if deadline > self.now() {
            trace!(from = self.now(), to = deadline, "advancing virtual clock");
            self.state.now.set(deadline);
        }
        Some(task)
    }
}

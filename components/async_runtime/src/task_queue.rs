//! Task, microtask and timer queue management.
//!
//! This module provides the queues used by the event loop. Tasks are executed
//! one at a time, with all microtasks draining after each task. Timers are
//! tasks held back until the loop's virtual clock reaches their deadline.

use core_types::JsError;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// A task to be executed by the event loop.
///
/// Tasks represent host-driven work such as timer callbacks. A task that
/// returns an error stops the loop.
pub struct Task {
    callback: Box<dyn FnOnce() -> Result<(), JsError>>,
}

impl Task {
    /// Creates a new Task from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), JsError> + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the task.
    pub fn run(self) -> Result<(), JsError> {
        (self.callback)()
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task {{ ... }}")
    }
}

/// A microtask to be executed by the event loop.
///
/// Promise reaction jobs are microtasks. They cannot fail: every error a
/// reaction produces is captured as a rejection of its derived promise.
pub struct MicroTask {
    callback: Box<dyn FnOnce()>,
}

impl MicroTask {
    /// Creates a new MicroTask from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the microtask.
    pub fn run(self) {
        (self.callback)()
    }
}

impl std::fmt::Debug for MicroTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MicroTask {{ ... }}")
    }
}

/// A queue for tasks.
///
/// Tasks are processed in FIFO order, one at a time.
#[derive(Debug, Default)]
pub struct TaskQueue {
    queue: VecDeque<Task>,
}

impl TaskQueue {
    /// Creates a new empty TaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a task to the end of the queue.
    pub fn enqueue(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    /// Removes and returns the next task from the queue.
    pub fn dequeue(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of tasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// A queue for microtasks.
///
/// Microtasks are drained completely after each task.
#[derive(Debug, Default)]
pub struct MicrotaskQueue {
    queue: VecDeque<MicroTask>,
}

impl MicrotaskQueue {
    /// Creates a new empty MicrotaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a microtask to the end of the queue.
    pub fn enqueue(&mut self, microtask: MicroTask) {
        self.queue.push_back(microtask);
    }

    /// Removes and returns the next microtask from the queue.
    pub fn dequeue(&mut self) -> Option<MicroTask> {
        self.queue.pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of microtasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

#[derive(Debug)]
struct TimerEntry {
    deadline: u64,
    seq: u64,
    task: Task,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    // Reversed so the max-heap pops the earliest deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Tasks waiting for a deadline on a virtual clock.
///
/// Timers with equal deadlines fire in the order they were scheduled.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<TimerEntry>,
    next_seq: u64,
}

impl TimerQueue {
    /// Creates a new empty TimerQueue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to fire at `deadline`.
    pub fn schedule(&mut self, deadline: u64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(TimerEntry {
            deadline,
            seq,
            task,
        });
    }

    /// Removes the earliest timer, returning its deadline and task.
    pub fn pop_next(&mut self) -> Option<(u64, Task)> {
        self.heap.pop().map(|entry| (entry.deadline, entry.task))
    }

    /// Deadline of the earliest timer, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.heap.peek().map(|entry| entry.deadline)
    }

    /// Returns true if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the number of pending timers.
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

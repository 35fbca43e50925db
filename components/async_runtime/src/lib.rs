//! Async runtime for JavaScript-style deferred values.
//!
//! This crate provides:
//! - A Promise implementation following the Promise/A+ resolution procedure
//! - The `resolve`, `reject` and `all` combinators
//! - An event loop with task, timer and microtask queues that promises
//!   schedule their reactions on
//!
//! # Overview
//!
//! - [`Promise`] - Settle-once deferred value with `then`/`catch`/`finally`
//! - [`Scheduler`] - The job queue contract promises rely on
//! - [`EventLoop`] - Single-threaded host loop implementing [`Scheduler`]
//! - [`RuntimeConfig`] - Event loop tunables
//!
//! Everything here is single-threaded: promises are `Rc` handles and reaction
//! jobs run one at a time from the loop's microtask queue.
//!
//! # Examples
//!
//! ```
//! use async_runtime::{EventLoop, Promise, Task};
//! use core_types::Value;
//!
//! let event_loop = EventLoop::new();
//! let capability = Promise::with_resolvers(&event_loop.scheduler());
//!
//! let fulfill = capability.fulfill.clone();
//! event_loop.set_timeout(10, Task::new(move || {
//!     fulfill.call(Value::from("data"));
//!     Ok(())
//! }));
//!
//! let logged = capability.promise.finally(|| Ok(Value::Undefined));
//! event_loop.run_until_done().unwrap();
//!
//! assert_eq!(logged.value(), Some(Value::from("data")));
//! assert_eq!(event_loop.now(), 10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod combinators;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod promise;
mod resolution;
pub mod scheduler;
pub mod task_queue;

// Re-export main types at crate root
pub use config::RuntimeConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use event_loop::{EventLoop, UnhandledRejection};
pub use promise::{
    Handler, Promise, PromiseCapability, PromiseReaction, PromiseState, ResolvingFunction,
};
pub use resolution::CHAINING_CYCLE_MESSAGE;
pub use scheduler::{RejectionOperation, Scheduler, SchedulerRef};
pub use task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue, TimerQueue};

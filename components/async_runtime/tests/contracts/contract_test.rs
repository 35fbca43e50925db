//! Contract tests for async_runtime component
//!
//! These tests pin the public surface other components rely on: the promise
//! API, the scheduler seam, and the event loop configuration format.

use async_runtime::{
    EventLoop, Handler, MicroTask, Promise, PromiseCapability, PromiseState, RejectionOperation,
    RuntimeConfig, Scheduler, SchedulerRef, Task,
};
use core_types::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A host queue that is not the crate's EventLoop.
#[derive(Default)]
struct ManualScheduler {
    jobs: RefCell<VecDeque<MicroTask>>,
    tracked: RefCell<Vec<RejectionOperation>>,
}

impl ManualScheduler {
    fn run(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.jobs.borrow_mut().pop_front();
            match next {
                Some(job) => {
                    job.run();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn enqueue_microtask(&self, job: MicroTask) {
        self.jobs.borrow_mut().push_back(job);
    }

    fn promise_rejection_tracker(&self, _promise: &Promise, operation: RejectionOperation) {
        self.tracked.borrow_mut().push(operation);
    }
}

mod event_loop_contract {
    use super::*;

    #[test]
    fn event_loop_enqueue_task_accepts_task() {
        let event_loop = EventLoop::new();
        event_loop.enqueue_task(Task::new(|| Ok(())));
        assert!(event_loop.run_until_done().is_ok());
    }

    #[test]
    fn event_loop_scheduler_is_shared_handle() {
        let event_loop = EventLoop::new();
        let scheduler: SchedulerRef = event_loop.scheduler();
        scheduler.enqueue_microtask(MicroTask::new(|| {}));
        assert!(!event_loop.is_microtask_queue_empty());
    }

    #[test]
    fn event_loop_clones_share_queues() {
        let event_loop = EventLoop::new();
        let clone = event_loop.clone();
        clone.enqueue_task(Task::new(|| Ok(())));
        assert!(!event_loop.is_task_queue_empty());
    }
}

mod promise_contract {
    use super::*;

    #[test]
    fn promise_then_returns_promise() {
        let event_loop = EventLoop::new();
        let promise = Promise::new(&event_loop.scheduler(), |_, _| Ok(()));
        let chained: Promise = promise.then(None, None);
        assert!(!chained.ptr_eq(&promise));
    }

    #[test]
    fn with_resolvers_returns_capability() {
        let event_loop = EventLoop::new();
        let PromiseCapability {
            promise,
            fulfill,
            reject,
        } = Promise::with_resolvers(&event_loop.scheduler());
        fulfill.call(Value::from(1));
        reject.call(Value::from(2));
        assert_eq!(promise.state(), PromiseState::Fulfilled);
    }

    #[test]
    fn resolving_function_as_settle_fn() {
        let event_loop = EventLoop::new();
        let capability = Promise::with_resolvers(&event_loop.scheduler());
        let settle = capability.reject.clone().into_settle_fn();
        settle(Value::from("reason"));
        assert_eq!(capability.promise.result(), Some(Err(Value::from("reason"))));
    }

    #[test]
    fn promise_value_displays_as_object() {
        let event_loop = EventLoop::new();
        let value = Promise::resolve(&event_loop.scheduler(), Value::Null).into_value();
        assert_eq!(value.to_string(), "[object Promise]");
        assert!(value.is_object());
    }
}

mod scheduler_contract {
    use super::*;

    #[test]
    fn promises_run_on_injected_scheduler() {
        let manual = Rc::new(ManualScheduler::default());
        let scheduler: SchedulerRef = manual.clone();

        let result = Promise::resolve(&scheduler, Value::from(20)).then(
            Some(Handler::new(|v| match v {
                Value::Smi(n) => Ok(Value::Smi(n + 1)),
                other => Ok(other),
            })),
            None,
        );
        assert_eq!(result.state(), PromiseState::Pending);

        assert_eq!(manual.run(), 1);
        assert_eq!(result.value(), Some(Value::from(21)));
    }

    #[test]
    fn derived_promises_inherit_scheduler() {
        let manual = Rc::new(ManualScheduler::default());
        let scheduler: SchedulerRef = manual.clone();
        let derived = Promise::resolve(&scheduler, Value::Null).then(None, None);
        assert!(Rc::ptr_eq(derived.scheduler(), &scheduler));
    }

    #[test]
    fn rejection_tracker_sees_reject_then_handle() {
        let manual = Rc::new(ManualScheduler::default());
        let scheduler: SchedulerRef = manual.clone();

        let rejected = Promise::reject(&scheduler, Value::from("e"));
        let _ = rejected.catch(Ok);
        manual.run();

        assert_eq!(
            *manual.tracked.borrow(),
            vec![RejectionOperation::Reject, RejectionOperation::Handle]
        );
    }
}

mod config_contract {
    use super::*;

    #[test]
    fn config_fields_default_when_missing() {
        let config: RuntimeConfig =
            serde_json::from_str(r#"{ "track_rejections": true }"#).unwrap();
        assert_eq!(config.microtask_budget, None);
        assert!(config.track_rejections);
    }

    #[test]
    fn config_reads_budget() {
        let config: RuntimeConfig =
            serde_json::from_str(r#"{ "microtask_budget": 500 }"#).unwrap();
        assert_eq!(config, RuntimeConfig::new().with_microtask_budget(500));
    }
}

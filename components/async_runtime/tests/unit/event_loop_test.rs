//! Unit tests for EventLoop scheduling and rejection tracking

use async_runtime::{
    EventLoop, MicroTask, Promise, RuntimeConfig, RuntimeError, Task,
};
use core_types::{JsError, Value};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn new_event_loop_is_empty() {
    let el = EventLoop::new();
    assert!(el.is_task_queue_empty());
    assert!(el.is_microtask_queue_empty());
    assert_eq!(el.pending_timers(), 0);
    assert_eq!(el.config(), &RuntimeConfig::default());
}

#[test]
fn enqueue_task_and_microtask() {
    let el = EventLoop::new();
    el.enqueue_task(Task::new(|| Ok(())));
    el.enqueue_microtask(MicroTask::new(|| {}));
    assert!(!el.is_task_queue_empty());
    assert!(!el.is_microtask_queue_empty());

    el.run_until_done().unwrap();
    assert!(el.is_task_queue_empty());
    assert!(el.is_microtask_queue_empty());
}

#[test]
fn microtasks_run_before_next_task() {
    let el = EventLoop::new();
    let order = Rc::new(RefCell::new(vec![]));

    let o = order.clone();
    let handle = el.clone();
    el.enqueue_task(Task::new(move || {
        o.borrow_mut().push("task-1");
        let o2 = o.clone();
        handle.enqueue_microtask(MicroTask::new(move || o2.borrow_mut().push("micro")));
        Ok(())
    }));
    let o = order.clone();
    el.enqueue_task(Task::new(move || {
        o.borrow_mut().push("task-2");
        Ok(())
    }));

    el.run_until_done().unwrap();
    assert_eq!(*order.borrow(), vec!["task-1", "micro", "task-2"]);
}

#[test]
fn tasks_run_before_timers() {
    let el = EventLoop::new();
    let order = Rc::new(RefCell::new(vec![]));

    let o = order.clone();
    el.set_timeout(0, Task::new(move || {
        o.borrow_mut().push("timer");
        Ok(())
    }));
    let o = order.clone();
    el.enqueue_task(Task::new(move || {
        o.borrow_mut().push("task");
        Ok(())
    }));

    el.run_until_done().unwrap();
    assert_eq!(*order.borrow(), vec!["task", "timer"]);
}

#[test]
fn process_one_cycle_reports_idle() {
    let el = EventLoop::new();
    assert!(!el.process_one_cycle().unwrap());
    el.enqueue_task(Task::new(|| Ok(())));
    assert!(el.process_one_cycle().unwrap());
    assert!(!el.process_one_cycle().unwrap());
}

#[test]
fn failing_task_is_reported() {
    let el = EventLoop::new();
    el.enqueue_task(Task::new(|| Err(JsError::error("task failed"))));
    let err = el.run_until_done().unwrap_err();
    assert!(matches!(err, RuntimeError::TaskFailed(_)));
    assert_eq!(err.to_string(), "task failed: Error: task failed");
}

#[test]
fn microtask_budget_stops_runaway_chains() {
    let el = EventLoop::with_config(RuntimeConfig::new().with_microtask_budget(100));

    fn reschedule(el: EventLoop) {
        let next = el.clone();
        el.enqueue_microtask(MicroTask::new(move || reschedule(next)));
    }
    reschedule(el.clone());

    let err = el.run_until_done().unwrap_err();
    assert_eq!(err, RuntimeError::MicrotaskBudgetExceeded { limit: 100 });
}

#[test]
fn unhandled_rejections_are_not_tracked_by_default() {
    let el = EventLoop::new();
    let _rejected = Promise::reject(&el.scheduler(), Value::from("nobody listens"));
    el.run_until_done().unwrap();
    assert!(el.take_unhandled_rejections().is_empty());
}

#[test]
fn unhandled_rejections_are_tracked_when_enabled() {
    let el = EventLoop::with_config(RuntimeConfig::new().with_rejection_tracking(true));
    let rejected = Promise::reject(&el.scheduler(), Value::from("nobody listens"));
    el.run_until_done().unwrap();

    let unhandled = el.take_unhandled_rejections();
    assert_eq!(unhandled.len(), 1);
    assert_eq!(unhandled[0].promise_id, rejected.id());
    assert_eq!(unhandled[0].reason, Value::from("nobody listens"));
    assert!(el.take_unhandled_rejections().is_empty());
}

#[test]
fn late_handler_clears_tracked_rejection() {
    let el = EventLoop::with_config(RuntimeConfig::new().with_rejection_tracking(true));
    let rejected = Promise::reject(&el.scheduler(), Value::from("handled later"));
    let recovered = rejected.catch(Ok);
    el.run_until_done().unwrap();

    assert!(el.take_unhandled_rejections().is_empty());
    assert_eq!(recovered.value(), Some(Value::from("handled later")));
}

#[test]
fn rejection_propagated_to_unobserved_derived_promise_is_tracked() {
    let el = EventLoop::with_config(RuntimeConfig::new().with_rejection_tracking(true));
    let derived = Promise::reject(&el.scheduler(), Value::from("lost")).then(None, None);
    el.run_until_done().unwrap();

    let unhandled = el.take_unhandled_rejections();
    assert_eq!(unhandled.len(), 1);
    assert_eq!(unhandled[0].promise_id, derived.id());
}

#[test]
fn undrained_rejections_do_not_keep_loop_alive() {
    let el = EventLoop::with_config(RuntimeConfig::new().with_rejection_tracking(true));
    let scheduler = el.scheduler();
    let weak_scheduler = Rc::downgrade(&scheduler);
    let _ = Promise::reject(&scheduler, Value::from(JsError::error("dropped")));
    el.run_until_done().unwrap();

    drop(scheduler);
    drop(el);
    assert!(weak_scheduler.upgrade().is_none());
}

//! Built-in promise scenarios.
//!
//! Each scenario wires up promises on the loop it is given and returns the
//! promise whose settlement is reported.

use async_runtime::{EventLoop, Handler, Promise, Task};
use core_types::{JsError, JsObject, SettleFn, ThenFn, Value};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// A named, self-contained promise program.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    /// Name used on the command line
    pub name: &'static str,
    /// One-line summary shown by `list`
    pub description: &'static str,
    /// Builds the scenario on `event_loop` and returns the promise to report
    pub build: fn(&EventLoop) -> Promise,
}

/// All scenarios, in the order `list` prints them.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "settle-once",
        description: "fulfill, reject and fulfill again; only the first call counts",
        build: settle_once,
    },
    Scenario {
        name: "chain",
        description: "values flow through a chain of then handlers",
        build: chain,
    },
    Scenario {
        name: "adopt-pending",
        description: "a handler returns a promise that settles from a timer",
        build: adopt_pending,
    },
    Scenario {
        name: "cycle",
        description: "a handler returns its own derived promise",
        build: cycle,
    },
    Scenario {
        name: "finally-pass",
        description: "finally keeps the original value",
        build: finally_pass,
    },
    Scenario {
        name: "finally-override",
        description: "a throwing finally replaces the original value",
        build: finally_override,
    },
    Scenario {
        name: "all-timers",
        description: "all keeps input order while timers finish out of order",
        build: all_timers,
    },
    Scenario {
        name: "all-reject",
        description: "all rejects with the first rejection",
        build: all_reject,
    },
    Scenario {
        name: "thenable",
        description: "a foreign thenable calling back twice is adopted once",
        build: foreign_thenable,
    },
];

/// Looks up a scenario by name.
pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|scenario| scenario.name == name)
}

fn settle_once(event_loop: &EventLoop) -> Promise {
    Promise::new(&event_loop.scheduler(), |fulfill, reject| {
        fulfill.call(Value::from("first"));
        reject.call(Value::from("ignored"));
        fulfill.call(Value::from("also ignored"));
        Ok(())
    })
}

fn add(amount: i32) -> Handler {
    Handler::new(move |value| match value {
        Value::Smi(n) => Ok(Value::Smi(n + amount)),
        other => Err(Value::from(JsError::type_error(format!(
            "expected a number, got {}",
            other
        )))),
    })
}

fn chain(event_loop: &EventLoop) -> Promise {
    Promise::resolve(&event_loop.scheduler(), Value::from(1))
        .then(Some(add(1)), None)
        .then(Some(add(10)), None)
        .then(Some(add(100)), None)
}

/// A promise fulfilled with `value` once `delay_ms` has passed on the loop's clock.
fn delayed(event_loop: &EventLoop, delay_ms: u64, value: Value) -> Promise {
    let capability = Promise::with_resolvers(&event_loop.scheduler());
    let fulfill = capability.fulfill;
    event_loop.set_timeout(
        delay_ms,
        Task::new(move || {
            fulfill.call(value);
            Ok(())
        }),
    );
    capability.promise
}

fn adopt_pending(event_loop: &EventLoop) -> Promise {
    let handle = event_loop.clone();
    Promise::resolve(&event_loop.scheduler(), Value::Undefined).then(
        Some(Handler::new(move |_| {
            Ok(delayed(&handle, 50, Value::from("inner")).into_value())
        })),
        None,
    )
}

fn cycle(event_loop: &EventLoop) -> Promise {
    let slot: Rc<RefCell<Option<Promise>>> = Rc::new(RefCell::new(None));
    let own = slot.clone();
    let derived = Promise::resolve(&event_loop.scheduler(), Value::Undefined).then(
        Some(Handler::new(move |_| {
            Ok(own
                .borrow()
                .clone()
                .map(Promise::into_value)
                .unwrap_or(Value::Undefined))
        })),
        None,
    );
    *slot.borrow_mut() = Some(derived.clone());
    derived
}

fn finally_pass(event_loop: &EventLoop) -> Promise {
    let handle = event_loop.clone();
    Promise::resolve(&event_loop.scheduler(), Value::from("original"))
        .finally(move || Ok(delayed(&handle, 10, Value::from("replacement?")).into_value()))
}

fn finally_override(event_loop: &EventLoop) -> Promise {
    Promise::resolve(&event_loop.scheduler(), Value::from("original"))
        .finally(|| Err(Value::from(JsError::error("cleanup failed"))))
}

fn all_timers(event_loop: &EventLoop) -> Promise {
    let items = vec![
        delayed(event_loop, 30, Value::from("slow")).into_value(),
        delayed(event_loop, 10, Value::from("fast")).into_value(),
        Value::from("now"),
        delayed(event_loop, 20, Value::from("medium")).into_value(),
    ];
    Promise::all(&event_loop.scheduler(), items)
}

fn all_reject(event_loop: &EventLoop) -> Promise {
    let scheduler = event_loop.scheduler();
    let late = Promise::with_resolvers(&scheduler);
    let reject_late = late.reject;
    event_loop.set_timeout(
        100,
        Task::new(move || {
            reject_late.call(Value::from("late"));
            Ok(())
        }),
    );
    let items = vec![
        Value::from(1),
        late.promise.into_value(),
        Promise::reject(&scheduler, Value::from(JsError::error("first"))).into_value(),
    ];
    Promise::all(&scheduler, items)
}

/// A thenable outside the runtime that calls every callback it is given.
struct EagerThenable {
    value: Value,
}

impl JsObject for EagerThenable {
    fn get_then(&self) -> Result<Option<ThenFn>, Value> {
        let value = self.value.clone();
        let then: ThenFn = Rc::new(
            move |fulfill: SettleFn, reject: SettleFn| -> Result<(), Value> {
                fulfill(value.clone());
                reject(Value::from("ignored"));
                fulfill(Value::from("ignored"));
                Ok(())
            },
        );
        Ok(Some(then))
    }

    fn class_name(&self) -> &str {
        "EagerThenable"
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

fn foreign_thenable(event_loop: &EventLoop) -> Promise {
    let thenable: Rc<dyn JsObject> = Rc::new(EagerThenable {
        value: Value::from("from thenable"),
    });
    Promise::resolve(&event_loop.scheduler(), Value::Object(thenable))
}

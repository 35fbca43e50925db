//! Static promise constructors: `resolve`, `reject` and `all`.
//!
//! These are built only on the public contract of [`Promise`] plus the
//! resolution procedure.

use crate::promise::{Handler, Promise};
use crate::resolution::resolve_promise;
use crate::scheduler::SchedulerRef;
use core_types::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

impl Promise {
    /// Returns `value` itself if it already holds a promise, otherwise a new
    /// promise resolved with it.
    ///
    /// Plain values fulfill immediately; foreign thenables are adopted.
    pub fn resolve(scheduler: &SchedulerRef, value: Value) -> Promise {
        if let Some(promise) = Promise::from_value(&value) {
            return promise;
        }
        let promise = Promise::pending(scheduler);
        resolve_promise(&promise, value);
        promise
    }

    /// Returns a new promise rejected with `reason`. The reason is never unwrapped.
    pub fn reject(scheduler: &SchedulerRef, reason: Value) -> Promise {
        let promise = Promise::pending(scheduler);
        promise.reject_internal(reason);
        promise
    }

    /// Waits for every item and fulfills with their values in input order.
    ///
    /// Items that are not promises are passed through [`Promise::resolve`]
    /// first. The result rejects with the reason of the first item to reject,
    /// without waiting for the others. An empty input fulfills immediately
    /// with an empty array.
    ///
    /// # Examples
    ///
    /// ```
    /// use async_runtime::{EventLoop, Promise};
    /// use core_types::Value;
    ///
    /// let event_loop = EventLoop::new();
    /// let scheduler = event_loop.scheduler();
    /// let all = Promise::all(
    ///     &scheduler,
    ///     vec![
    ///         Value::from(1),
    ///         Promise::resolve(&scheduler, Value::from(2)).into_value(),
    ///         Value::from(3),
    ///     ],
    /// );
    ///
    /// event_loop.run_until_done().unwrap();
    /// assert_eq!(
    ///     all.value(),
    ///     Some(Value::Array(vec![Value::from(1), Value::from(2), Value::from(3)]))
    /// );
    /// ```
    pub fn all<I>(scheduler: &SchedulerRef, items: I) -> Promise
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        let capability = Promise::with_resolvers(scheduler);
        if items.is_empty() {
            capability.fulfill.call(Value::Array(Vec::new()));
            return capability.promise;
        }

        let results = Rc::new(RefCell::new(vec![Value::Undefined; items.len()]));
        let remaining = Rc::new(Cell::new(items.len()));

        for (index, item) in items.into_iter().enumerate() {
            let results = results.clone();
            let remaining = remaining.clone();
            let fulfill = capability.fulfill.clone();
            let reject = capability.reject.clone();

            let on_fulfilled = Handler::new(move |value| {
                results.borrow_mut()[index] = value;
                remaining.set(remaining.get() - 1);
                if remaining.get() == 0 {
                    let values = std::mem::take(&mut *results.borrow_mut());
                    fulfill.call(Value::Array(values));
                }
                Ok(Value::Undefined)
            });
            let on_rejected = Handler::new(move |reason| {
                reject.call(reason);
                Ok(Value::Undefined)
            });

            Promise::resolve(scheduler, item).then(Some(on_fulfilled), Some(on_rejected));
        }

        capability.promise
    }
}

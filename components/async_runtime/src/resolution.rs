//! The promise resolution procedure.
//!
//! Every value a reaction produces, and every value given to
//! [`Promise::resolve`], passes through [`resolve_promise`] before it settles
//! a promise. This is where thenables (including promises from this crate)
//! are adopted and where a promise resolved with itself is rejected.

use crate::promise::Promise;
use core_types::{JsError, SettleFn, Value};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, trace};

/// Message of the `TypeError` a promise is rejected with when resolved with itself.
pub const CHAINING_CYCLE_MESSAGE: &str = "Chaining cycle detected for promise";

/// Settles `downstream` from `result`.
///
/// - `result` is `downstream` itself: reject with a chaining-cycle `TypeError`.
/// - `result` is an object with a callable `then`: adopt it. The first call of
///   either callback wins; the fulfillment value is resolved again, so nested
///   thenables unwrap all the way down.
/// - Reading or calling `then` throws before either callback ran: reject with
///   the thrown value.
/// - Anything else fulfills `downstream` directly.
pub(crate) fn resolve_promise(downstream: &Promise, result: Value) {
    let Some(object) = result.as_object().cloned() else {
        return downstream.fulfill_internal(result);
    };

    if downstream.is_same_object(&object) {
        debug!(promise = downstream.id(), "chaining cycle detected");
        let error = JsError::type_error(CHAINING_CYCLE_MESSAGE);
        return downstream.reject_internal(Value::Error(error));
    }

    let then = match object.get_then() {
        Ok(Some(then)) => then,
        Ok(None) => return downstream.fulfill_internal(result),
        Err(thrown) => return downstream.reject_internal(thrown),
    };

    trace!(
        promise = downstream.id(),
        thenable = object.class_name(),
        "adopting thenable"
    );

    let called = Rc::new(Cell::new(false));
    let on_fulfilled: SettleFn = {
        let called = called.clone();
        let downstream = downstream.clone();
        Rc::new(move |value: Value| {
            if called.replace(true) {
                return;
            }
            resolve_promise(&downstream, value);
        })
    };
    let on_rejected: SettleFn = {
        let called = called.clone();
        let downstream = downstream.clone();
        Rc::new(move |reason: Value| {
            if called.replace(true) {
                return;
            }
            downstream.reject_internal(reason);
        })
    };

    if let Err(thrown) = then(on_fulfilled, on_rejected) {
        if !called.replace(true) {
            downstream.reject_internal(thrown);
        }
    }
}

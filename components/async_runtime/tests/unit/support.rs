//! Shared fixtures: foreign thenables and small recording helpers.

#![allow(dead_code)]

use async_runtime::Handler;
use core_types::{JsObject, SettleFn, ThenFn, Value};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// A non-promise object whose `then` member runs a scripted closure.
pub struct ScriptedThenable {
    then: Option<ThenFn>,
    read_error: Option<Value>,
}

impl JsObject for ScriptedThenable {
    fn get_then(&self) -> Result<Option<ThenFn>, Value> {
        if let Some(thrown) = &self.read_error {
            return Err(thrown.clone());
        }
        Ok(self.then.clone())
    }

    fn class_name(&self) -> &str {
        "ScriptedThenable"
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Builds a thenable whose `then` runs `script`.
pub fn thenable<F>(script: F) -> Value
where
    F: Fn(SettleFn, SettleFn) -> Result<(), Value> + 'static,
{
    let then: ThenFn = Rc::new(script);
    Value::Object(Rc::new(ScriptedThenable {
        then: Some(then),
        read_error: None,
    }))
}

/// Builds an object whose `then` member throws `thrown` when read.
pub fn throwing_then_getter(thrown: Value) -> Value {
    Value::Object(Rc::new(ScriptedThenable {
        then: None,
        read_error: Some(thrown),
    }))
}

/// Builds an object without a `then` member.
pub fn plain_object() -> Value {
    Value::Object(Rc::new(ScriptedThenable {
        then: None,
        read_error: None,
    }))
}

/// A shared log that handlers push labels into.
pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// A handler that records `label` and passes its argument through.
pub fn record(log: &Log, label: &str) -> Handler {
    let log = log.clone();
    let label = label.to_string();
    Handler::new(move |value| {
        log.borrow_mut().push(label);
        Ok(value)
    })
}

pub fn text(s: &str) -> Value {
    Value::from(s)
}

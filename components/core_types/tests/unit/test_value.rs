//! Unit tests for Value and the JsObject capability trait

use core_types::{JsObject, SettleFn, ThenFn, Value};
use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

struct Plain;

impl JsObject for Plain {
    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// An object whose `then` member fulfills with a fixed value.
struct FixedThenable {
    calls: Rc<Cell<usize>>,
}

impl JsObject for FixedThenable {
    fn get_then(&self) -> Result<Option<ThenFn>, Value> {
        let calls = self.calls.clone();
        let then: ThenFn = Rc::new(
            move |on_fulfilled: SettleFn, _on_rejected: SettleFn| -> Result<(), Value> {
                calls.set(calls.get() + 1);
                on_fulfilled(Value::from(7));
                Ok(())
            },
        );
        Ok(Some(then))
    }

    fn class_name(&self) -> &str {
        "FixedThenable"
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

#[test]
fn test_from_conversions() {
    assert_eq!(Value::from(true), Value::Boolean(true));
    assert_eq!(Value::from(3), Value::Smi(3));
    assert_eq!(Value::from(2.5), Value::Double(2.5));
    assert_eq!(Value::from("a"), Value::String("a".to_string()));
    assert_eq!(Value::from(String::from("b")), Value::String("b".to_string()));
}

#[test]
fn test_primitive_equality() {
    assert_eq!(Value::Undefined, Value::Undefined);
    assert_ne!(Value::Undefined, Value::Null);
    assert_ne!(Value::Smi(1), Value::Double(1.0));
}

#[test]
fn test_array_equality_is_structural() {
    let a = Value::from(vec![Value::from(1), Value::from(2)]);
    let b = Value::from(vec![Value::from(1), Value::from(2)]);
    assert_eq!(a, b);
    assert_eq!(a.as_array().map(|items| items.len()), Some(2));
}

#[test]
fn test_object_identity() {
    let obj: Rc<dyn JsObject> = Rc::new(Plain);
    let same = Value::Object(obj.clone());
    assert_eq!(Value::Object(obj), same);
    assert_ne!(same, Value::Object(Rc::new(Plain)));
}

#[test]
fn test_object_downcast() {
    let obj: Rc<dyn JsObject> = Rc::new(Plain);
    assert!(obj.clone().into_any().downcast::<Plain>().is_ok());
    assert!(obj.into_any().downcast::<FixedThenable>().is_err());
}

#[test]
fn test_thenable_then_member_is_callable() {
    let calls = Rc::new(Cell::new(0));
    let thenable = FixedThenable {
        calls: calls.clone(),
    };
    let seen = Rc::new(Cell::new(0));

    let then = thenable.get_then().unwrap().unwrap();
    let s = seen.clone();
    let on_fulfilled: SettleFn = Rc::new(move |v: Value| {
        if let Value::Smi(n) = v {
            s.set(n);
        }
    });
    let on_rejected: SettleFn = Rc::new(|_: Value| {});
    then(on_fulfilled, on_rejected).unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(seen.get(), 7);
}

#[test]
fn test_object_display_uses_class_name() {
    let calls = Rc::new(Cell::new(0));
    let value = Value::Object(Rc::new(FixedThenable { calls }));
    assert_eq!(value.to_string(), "[object FixedThenable]");
    assert_eq!(format!("{:?}", value), "Object(FixedThenable)");
}

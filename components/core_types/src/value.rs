//! Type-erased JavaScript value representation.
//!
//! This module provides the `Value` enum carried by promise settlements and
//! handler results, together with the [`JsObject`] capability trait used to
//! detect thenables.

use crate::JsError;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// The outcome of calling a JavaScript callable.
///
/// `Ok` carries the returned value, `Err` carries the thrown value.
pub type Completion = Result<Value, Value>;

/// A one-argument callback handed to a thenable's `then` member.
pub type SettleFn = Rc<dyn Fn(Value)>;

/// A callable `then` member read off a thenable.
///
/// It receives the fulfill and reject callbacks; `Err` means the call threw.
pub type ThenFn = Rc<dyn Fn(SettleFn, SettleFn) -> Result<(), Value>>;

/// A native object that can be stored in a [`Value`].
///
/// Objects expose their `then` member through [`JsObject::get_then`], which is
/// the only way the runtime decides whether a value is a thenable.
pub trait JsObject: Any {
    /// Reads the `then` member of this object.
    ///
    /// Returns `Ok(None)` when the member is missing or not callable, and
    /// `Err(thrown)` when reading it throws.
    fn get_then(&self) -> Result<Option<ThenFn>, Value> {
        Ok(None)
    }

    /// The class name shown when the value is printed.
    fn class_name(&self) -> &str {
        "Object"
    }

    /// Converts the shared object into `Rc<dyn Any>` for downcasting.
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

/// Represents any JavaScript value.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let number = Value::from(42);
/// let text = Value::from("data");
///
/// assert_eq!(number, Value::Smi(42));
/// assert_eq!(text.to_string(), "data");
/// assert!(!Value::Undefined.is_object());
/// ```
#[derive(Clone)]
pub enum Value {
    /// JavaScript undefined value
    Undefined,
    /// JavaScript null value
    Null,
    /// JavaScript boolean (true or false)
    Boolean(bool),
    /// Small integer
    Smi(i32),
    /// IEEE 754 double-precision floating point
    Double(f64),
    /// JavaScript string value
    String(String),
    /// Ordered sequence of values
    Array(Vec<Value>),
    /// Error object
    Error(JsError),
    /// Native object, compared by identity
    Object(Rc<dyn JsObject>),
}

impl Value {
    /// Returns true if this value is an object (and may be a thenable).
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns the object if this value is one.
    pub fn as_object(&self) -> Option<&Rc<dyn JsObject>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Returns the elements if this value is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the error if this value is an error object.
    pub fn as_error(&self) -> Option<&JsError> {
        match self {
            Value::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the JavaScript typeof result for this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object", // JavaScript quirk
            Value::Boolean(_) => "boolean",
            Value::Smi(_) | Value::Double(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) | Value::Error(_) | Value::Object(_) => "object",
        }
    }
}

fn object_addr(obj: &Rc<dyn JsObject>) -> *const () {
    Rc::as_ptr(obj) as *const ()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Smi(a), Value::Smi(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => object_addr(a) == object_addr(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Smi(n) => f.debug_tuple("Smi").field(n).finish(),
            Value::Double(n) => f.debug_tuple("Double").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Value::Object(obj) => write!(f, "Object({})", obj.class_name()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Smi(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Error(err) => write!(f, "{}", err),
            Value::Object(obj) => write!(f, "[object {}]", obj.class_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Smi(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<JsError> for Value {
    fn from(err: JsError) -> Self {
        Value::Error(err)
    }
}

//! Core JavaScript value types and error handling.
//!
//! This crate provides the foundational types shared by the promise runtime:
//! the type-erased value carried by settlements, the error type used for
//! engine-generated rejection reasons, and the object capability trait that
//! decides whether a value is a thenable.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of JavaScript values
//! - [`Completion`] - Normal or throw completion of a callable
//! - [`JsObject`] - Native objects, including thenables
//! - [`JsError`] - JavaScript errors
//! - [`ErrorKind`] - Types of JavaScript errors
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, Value};
//!
//! let reason = Value::from(JsError::type_error("not a function"));
//! assert_eq!(reason.as_error().map(|e| e.kind), Some(ErrorKind::TypeError));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod value;

pub use error::{ErrorKind, JsError};
pub use value::{Completion, JsObject, SettleFn, ThenFn, Value};

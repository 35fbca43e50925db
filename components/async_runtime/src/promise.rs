//! Promise implementation following the Promise/A+ specification.
//!
//! A [`Promise`] starts pending and is settled at most once, either fulfilled
//! with a value or rejected with a reason. Reactions registered through
//! [`Promise::then`] are never run synchronously: each one becomes a
//! [`MicroTask`] on the promise's [`Scheduler`], queued in registration order
//! once the promise settles (or immediately, if it already has).

use crate::resolution::resolve_promise;
use crate::scheduler::{RejectionOperation, SchedulerRef};
use crate::task_queue::MicroTask;
use core_types::{Completion, JsObject, SettleFn, ThenFn, Value};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

static NEXT_PROMISE_ID: AtomicU64 = AtomicU64::new(1);

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseState {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been fulfilled with a value.
    Fulfilled,
    /// The promise has been rejected with a reason.
    Rejected,
}

/// A reaction callback passed to `then`.
///
/// Returning `Err` is the equivalent of the callback throwing: the derived
/// promise is rejected with the carried value.
pub struct Handler {
    callback: Box<dyn FnOnce(Value) -> Completion>,
}

impl Handler {
    /// Creates a new Handler from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Value) -> Completion + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Calls the handler with the settled value.
    pub fn call(self, argument: Value) -> Completion {
        (self.callback)(argument)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler {{ ... }}")
    }
}

/// A reaction to be triggered when a Promise settles.
///
/// Each reaction belongs to exactly one derived promise, the one returned by
/// the `then` call that registered it.
#[derive(Debug)]
pub struct PromiseReaction {
    /// Handler for fulfilled state
    pub on_fulfilled: Option<Handler>,
    /// Handler for rejected state
    pub on_rejected: Option<Handler>,
    /// The promise settled from this reaction's outcome
    pub downstream: Promise,
}

impl PromiseReaction {
    fn run(self, state: PromiseState, argument: Value) {
        let PromiseReaction {
            on_fulfilled,
            on_rejected,
            downstream,
        } = self;
        let handler = match state {
            PromiseState::Fulfilled => on_fulfilled,
            _ => on_rejected,
        };
        match handler {
            Some(handler) => match handler.call(argument) {
                Ok(result) => resolve_promise(&downstream, result),
                Err(thrown) => downstream.reject_internal(thrown),
            },
            None if state == PromiseState::Fulfilled => resolve_promise(&downstream, argument),
            None => downstream.reject_internal(argument),
        }
    }
}

#[derive(Debug)]
struct PromiseSlot {
    state: PromiseState,
    value: Option<Value>,
    reactions: Vec<PromiseReaction>,
    handled: bool,
}

struct PromiseInner {
    id: u64,
    scheduler: SchedulerRef,
    this: Weak<PromiseInner>,
    slot: RefCell<PromiseSlot>,
}

impl JsObject for PromiseInner {
    fn get_then(&self) -> Result<Option<ThenFn>, Value> {
        let Some(inner) = self.this.upgrade() else {
            return Ok(None);
        };
        let promise = Promise { inner };
        let then: ThenFn = Rc::new(
            move |on_fulfilled: SettleFn, on_rejected: SettleFn| -> Result<(), Value> {
                promise.then(
                    Some(Handler::new(move |value| {
                        on_fulfilled(value);
                        Ok(Value::Undefined)
                    })),
                    Some(Handler::new(move |reason| {
                        on_rejected(reason);
                        Ok(Value::Undefined)
                    })),
                );
                Ok(())
            },
        );
        Ok(Some(then))
    }

    fn class_name(&self) -> &str {
        "Promise"
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A JavaScript Promise.
///
/// `Promise` is a handle: clones refer to the same instance, and
/// [`Promise::ptr_eq`] compares identity.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Handler, Promise, PromiseState};
/// use core_types::Value;
///
/// let event_loop = EventLoop::new();
/// let promise = Promise::new(&event_loop.scheduler(), |fulfill, reject| {
///     fulfill.call(Value::from("first"));
///     reject.call(Value::from("x"));
///     Ok(())
/// });
/// assert_eq!(promise.state(), PromiseState::Fulfilled);
///
/// let chained = promise.then(
///     Some(Handler::new(|v| Ok(Value::from(format!("{}-modified", v))))),
///     None,
/// );
/// assert_eq!(chained.state(), PromiseState::Pending);
///
/// event_loop.run_until_done().unwrap();
/// assert_eq!(chained.value(), Some(Value::from("first-modified")));
/// ```
#[derive(Clone)]
pub struct Promise {
    inner: Rc<PromiseInner>,
}

/// One of the two settle functions of a promise.
///
/// Calling it any number of times is allowed; only the first call of either
/// function of a pair has an effect.
#[derive(Clone)]
pub struct ResolvingFunction {
    promise: Promise,
    outcome: PromiseState,
}

impl ResolvingFunction {
    /// Settles the owning promise, unless it is already settled.
    pub fn call(&self, value: Value) {
        self.promise.settle(self.outcome, value);
    }

    /// Wraps this function as a plain callback.
    pub fn into_settle_fn(self) -> SettleFn {
        Rc::new(move |value: Value| self.call(value))
    }
}

impl fmt::Debug for ResolvingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvingFunction")
            .field("promise", &self.promise.id())
            .field("outcome", &self.outcome)
            .finish()
    }
}

/// A pending promise together with its settle functions.
#[derive(Debug, Clone)]
pub struct PromiseCapability {
    /// The promise
    pub promise: Promise,
    /// Fulfills `promise`
    pub fulfill: ResolvingFunction,
    /// Rejects `promise`
    pub reject: ResolvingFunction,
}

type FinallyCallback = Rc<Cell<Option<Box<dyn FnOnce() -> Completion>>>>;

impl Promise {
    /// Creates a promise and runs `executor` synchronously with its fulfill and
    /// reject functions.
    ///
    /// If the executor returns `Err`, the promise is rejected with the carried
    /// value, exactly as if it had called `reject`.
    pub fn new<F>(scheduler: &SchedulerRef, executor: F) -> Promise
    where
        F: FnOnce(ResolvingFunction, ResolvingFunction) -> Result<(), Value>,
    {
        let PromiseCapability {
            promise,
            fulfill,
            reject,
        } = Promise::with_resolvers(scheduler);
        if let Err(thrown) = executor(fulfill, reject.clone()) {
            debug!(promise = promise.id(), "executor threw");
            reject.call(thrown);
        }
        promise
    }

    /// Creates a pending promise and hands out its settle functions, for hosts
    /// that settle it later.
    pub fn with_resolvers(scheduler: &SchedulerRef) -> PromiseCapability {
        let promise = Promise::pending(scheduler);
        PromiseCapability {
            fulfill: ResolvingFunction {
                promise: promise.clone(),
                outcome: PromiseState::Fulfilled,
            },
            reject: ResolvingFunction {
                promise: promise.clone(),
                outcome: PromiseState::Rejected,
            },
            promise,
        }
    }

    pub(crate) fn pending(scheduler: &SchedulerRef) -> Promise {
        let id = NEXT_PROMISE_ID.fetch_add(1, Ordering::Relaxed);
        let inner = Rc::new_cyclic(|this| PromiseInner {
            id,
            scheduler: scheduler.clone(),
            this: this.clone(),
            slot: RefCell::new(PromiseSlot {
                state: PromiseState::Pending,
                value: None,
                reactions: Vec::new(),
                handled: false,
            }),
        });
        trace!(promise = id, "promise created");
        Promise { inner }
    }

    /// Process-unique identifier, used in log output.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The current state of the promise.
    pub fn state(&self) -> PromiseState {
        self.inner.slot.borrow().state
    }

    /// The fulfillment value or rejection reason, once settled.
    pub fn value(&self) -> Option<Value> {
        self.inner.slot.borrow().value.clone()
    }

    /// The settlement as a completion: `Ok` if fulfilled, `Err` if rejected,
    /// `None` while pending.
    pub fn result(&self) -> Option<Completion> {
        let slot = self.inner.slot.borrow();
        match (slot.state, &slot.value) {
            (PromiseState::Fulfilled, Some(value)) => Some(Ok(value.clone())),
            (PromiseState::Rejected, Some(reason)) => Some(Err(reason.clone())),
            _ => None,
        }
    }

    /// Number of reactions waiting for this promise to settle.
    pub fn reaction_count(&self) -> usize {
        self.inner.slot.borrow().reactions.len()
    }

    /// The scheduler this promise queues its reactions on.
    pub fn scheduler(&self) -> &SchedulerRef {
        &self.inner.scheduler
    }

    /// Returns true if both handles refer to the same promise.
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Converts the promise into a value, e.g. to return it from a handler.
    pub fn into_value(self) -> Value {
        let object: Rc<dyn JsObject> = self.inner;
        Value::Object(object)
    }

    /// Recovers the promise from a value holding one.
    pub fn from_value(value: &Value) -> Option<Promise> {
        match value {
            Value::Object(object) => object
                .clone()
                .into_any()
                .downcast::<PromiseInner>()
                .ok()
                .map(|inner| Promise { inner }),
            _ => None,
        }
    }

    pub(crate) fn is_same_object(&self, object: &Rc<dyn JsObject>) -> bool {
        Rc::as_ptr(object) as *const () == Rc::as_ptr(&self.inner) as *const ()
    }

    /// Registers fulfillment and rejection handlers.
    ///
    /// Always returns a new promise. It is settled from whatever the matching
    /// handler returns (adopting thenables), or rejected if the handler
    /// returns `Err`. A missing handler passes the settlement through.
    pub fn then(&self, on_fulfilled: Option<Handler>, on_rejected: Option<Handler>) -> Promise {
        let derived = Promise::pending(&self.inner.scheduler);
        self.add_reaction(PromiseReaction {
            on_fulfilled,
            on_rejected,
            downstream: derived.clone(),
        });
        derived
    }

    /// Registers a rejection handler; equivalent to `then(None, Some(..))`.
    pub fn catch<F>(&self, on_rejected: F) -> Promise
    where
        F: FnOnce(Value) -> Completion + 'static,
    {
        self.then(None, Some(Handler::new(on_rejected)))
    }

    /// Runs `on_finally` once this promise settles, whatever the outcome.
    ///
    /// The derived promise settles like this one, after any thenable returned
    /// by `on_finally` has settled. If `on_finally` returns `Err`, or returns
    /// a thenable that rejects, that failure is propagated instead.
    pub fn finally<F>(&self, on_finally: F) -> Promise
    where
        F: FnOnce() -> Completion + 'static,
    {
        let boxed: Box<dyn FnOnce() -> Completion> = Box::new(on_finally);
        let callback: FinallyCallback = Rc::new(Cell::new(Some(boxed)));
        let on_rejected_callback = callback.clone();
        let scheduler = self.inner.scheduler.clone();
        let on_rejected_scheduler = scheduler.clone();

        self.then(
            Some(Handler::new(move |value| {
                run_finally(&scheduler, &callback, Ok(value))
            })),
            Some(Handler::new(move |reason| {
                run_finally(&on_rejected_scheduler, &on_rejected_callback, Err(reason))
            })),
        )
    }

    fn add_reaction(&self, reaction: PromiseReaction) {
        let (state, value, first_observer) = {
            let mut slot = self.inner.slot.borrow_mut();
            let first_observer = !slot.handled;
            slot.handled = true;
            if slot.state == PromiseState::Pending {
                slot.reactions.push(reaction);
                return;
            }
            (
                slot.state,
                slot.value.clone().unwrap_or(Value::Undefined),
                first_observer,
            )
        };
        if state == PromiseState::Rejected && first_observer {
            self.inner
                .scheduler
                .promise_rejection_tracker(self, RejectionOperation::Handle);
        }
        self.enqueue_reaction_job(reaction, state, value);
    }

    fn enqueue_reaction_job(&self, reaction: PromiseReaction, state: PromiseState, value: Value) {
        trace!(
            promise = self.id(),
            downstream = reaction.downstream.id(),
            "reaction job queued"
        );
        self.inner
            .scheduler
            .enqueue_microtask(MicroTask::new(move || reaction.run(state, value)));
    }

    fn settle(&self, state: PromiseState, value: Value) {
        let (reactions, handled) = {
            let mut slot = self.inner.slot.borrow_mut();
            if slot.state != PromiseState::Pending {
                trace!(promise = self.id(), "ignoring settlement of settled promise");
                return;
            }
            slot.state = state;
            slot.value = Some(value.clone());
            (std::mem::take(&mut slot.reactions), slot.handled)
        };
        trace!(
            promise = self.id(),
            ?state,
            reactions = reactions.len(),
            "promise settled"
        );
        if state == PromiseState::Rejected && !handled {
            self.inner
                .scheduler
                .promise_rejection_tracker(self, RejectionOperation::Reject);
        }
        for reaction in reactions {
            self.enqueue_reaction_job(reaction, state, value.clone());
        }
    }

    pub(crate) fn fulfill_internal(&self, value: Value) {
        self.settle(PromiseState::Fulfilled, value);
    }

    pub(crate) fn reject_internal(&self, reason: Value) {
        self.settle(PromiseState::Rejected, reason);
    }
}

fn run_finally(
    scheduler: &SchedulerRef,
    callback: &FinallyCallback,
    outcome: Completion,
) -> Completion {
    let returned = match callback.take() {
        Some(on_finally) => on_finally()?,
        None => Value::Undefined,
    };
    let restore = Handler::new(move |_| outcome);
    Ok(Promise::resolve(scheduler, returned)
        .then(Some(restore), None)
        .into_value())
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("id", &self.id())
            .field("state", &self.state())
            .finish()
    }
}

//! Core hook types
//!
//! Payload and argument types shared by both dispatch modes, the tagged
//! [`Callable`] shapes callbacks are registered as, and the action-mode
//! [`CallOutcome`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Dynamic payload threaded through filters and passed to actions
pub type HookValue = serde_json::Value;

/// Ordering key for registrations; lower values execute earlier
pub type Priority = i32;

/// Priority used when callers do not care about ordering
pub const DEFAULT_PRIORITY: Priority = 10;

/// Reserved hook name whose registrations observe every dispatch
///
/// Callbacks registered under this name run before the target hook's own
/// chain on every `apply` and `call`, receiving the full argument list with
/// the target hook's name prepended. Their return values are discarded.
pub const ALL_HOOK: &str = "all";

/// Signature shared by every callback
///
/// Filter callbacks return the replacement value for the chain; action
/// callbacks' return values are discarded.
pub type HookFn = Arc<dyn Fn(&[HookArg]) -> HookValue + Send + Sync>;

/// Shared mutable context handed to action callbacks
///
/// The one intentional mutation back-channel in the system: every callback
/// invoked with a context sees the same value, may mutate it, and the caller
/// observes the final state after `call` returns.
#[derive(Clone, Default)]
pub struct HookContext {
    inner: Arc<Mutex<HookValue>>,
}

impl HookContext {
    /// Create a new context holding the given value
    pub fn new(value: HookValue) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Clone of the current value
    pub fn get(&self) -> HookValue {
        self.inner.lock().clone()
    }

    /// Replace the current value
    pub fn set(&self, value: HookValue) {
        *self.inner.lock() = value;
    }

    /// Run `f` with exclusive access to the value
    pub fn update<R>(&self, f: impl FnOnce(&mut HookValue) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl fmt::Debug for HookContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HookContext").field(&self.get()).finish()
    }
}

/// A positional argument handed to a callback
#[derive(Debug, Clone)]
pub enum HookArg {
    /// Plain by-value argument
    Value(HookValue),
    /// Shared mutable context
    Context(HookContext),
}

impl HookArg {
    /// The empty argument, used when a caller has nothing to pass
    pub fn none() -> Self {
        HookArg::Value(HookValue::Null)
    }

    /// Current payload regardless of variant; contexts are read out
    pub fn value(&self) -> HookValue {
        match self {
            HookArg::Value(value) => value.clone(),
            HookArg::Context(context) => context.get(),
        }
    }

    /// The by-value payload, if this is not a context
    pub fn as_value(&self) -> Option<&HookValue> {
        match self {
            HookArg::Value(value) => Some(value),
            HookArg::Context(_) => None,
        }
    }

    /// The shared context, if any
    pub fn as_context(&self) -> Option<&HookContext> {
        match self {
            HookArg::Value(_) => None,
            HookArg::Context(context) => Some(context),
        }
    }
}

impl Default for HookArg {
    fn default() -> Self {
        Self::none()
    }
}

impl From<HookValue> for HookArg {
    fn from(value: HookValue) -> Self {
        HookArg::Value(value)
    }
}

impl From<HookContext> for HookArg {
    fn from(context: HookContext) -> Self {
        HookArg::Context(context)
    }
}

/// What a callable is bound to; identity derivation matches on this tag
#[derive(Clone)]
pub(crate) enum CallTarget {
    /// Plain named function
    Function { name: String },
    /// Method bound to an object instance
    Method {
        receiver: Arc<dyn Any + Send + Sync>,
        method: String,
    },
    /// Static class method, both parts given as names
    Static { class: String, method: String },
    /// Anonymous closure
    Closure,
}

/// A registerable callback
///
/// Carries the function itself plus the target shape its identity is derived
/// from. Construct with [`Callable::function`], [`Callable::method`],
/// [`Callable::static_method`], or [`Callable::closure`].
#[derive(Clone)]
pub struct Callable {
    pub(crate) target: CallTarget,
    pub(crate) func: HookFn,
}

impl Callable {
    /// A plain named function; the name is the callback's identity
    pub fn function<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[HookArg]) -> HookValue + Send + Sync + 'static,
    {
        Self {
            target: CallTarget::Function { name: name.into() },
            func: Arc::new(func),
        }
    }

    /// A method bound to an object instance
    ///
    /// Identity combines the receiver's reference identity with the method
    /// name, so two distinct instances never collide even when they expose
    /// identically named methods, and re-registering the same instance and
    /// method overwrites rather than duplicates.
    pub fn method<T, F>(receiver: &Arc<T>, method: impl Into<String>, func: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&[HookArg]) -> HookValue + Send + Sync + 'static,
    {
        Self {
            target: CallTarget::Method {
                receiver: Arc::clone(receiver) as Arc<dyn Any + Send + Sync>,
                method: method.into(),
            },
            func: Arc::new(func),
        }
    }

    /// A static class method, identified as `Class::method`
    pub fn static_method<F>(
        class: impl Into<String>,
        method: impl Into<String>,
        func: F,
    ) -> Self
    where
        F: Fn(&[HookArg]) -> HookValue + Send + Sync + 'static,
    {
        Self {
            target: CallTarget::Static {
                class: class.into(),
                method: method.into(),
            },
            func: Arc::new(func),
        }
    }

    /// An anonymous closure
    ///
    /// Identity is assigned from the closure allocation itself: clones of
    /// this `Callable` resolve to the same identity and can be removed by
    /// value, but an independently constructed closure cannot name this one
    /// for removal.
    pub fn closure<F>(func: F) -> Self
    where
        F: Fn(&[HookArg]) -> HookValue + Send + Sync + 'static,
    {
        Self {
            target: CallTarget::Closure,
            func: Arc::new(func),
        }
    }

    pub(crate) fn invoke(&self, args: &[HookArg]) -> HookValue {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callable").field(&self.to_string()).finish()
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            CallTarget::Function { name } => write!(f, "{}", name),
            CallTarget::Method { method, .. } => write!(f, "<instance>::{}", method),
            CallTarget::Static { class, method } => write!(f, "{}::{}", class, method),
            CallTarget::Closure => write!(f, "<closure>"),
        }
    }
}

/// A stored registration: the callable plus how many positional arguments it
/// receives on invocation
#[derive(Debug, Clone)]
pub struct Registration {
    pub(crate) callable: Callable,
    pub(crate) accepted_args: usize,
}

impl Registration {
    pub(crate) fn new(callable: Callable, accepted_args: usize) -> Self {
        Self {
            callable,
            accepted_args,
        }
    }
}

/// Result of an action-mode dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    /// The hook's counter ticked and every registered callback ran
    Succeeded,
    /// The hook name was valid but holds no registrations; the counter
    /// still ticked
    NoSuchHook,
    /// The hook name failed sanitization; nothing happened
    Rejected,
}

impl CallOutcome {
    /// Whether the dispatch ran a callback chain
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Succeeded)
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallOutcome::Succeeded => write!(f, "succeeded"),
            CallOutcome::NoSuchHook => write!(f, "no such hook"),
            CallOutcome::Rejected => write!(f, "rejected"),
        }
    }
}

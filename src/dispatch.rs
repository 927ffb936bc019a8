//! Filter and action dispatch
//!
//! Both modes share one ordering algorithm: on the first dispatch to a hook
//! since its last mutation the priority buckets are sorted ascending and the
//! order cached; traversal then runs over an ordered snapshot captured once
//! per dispatch. Locks are never held while a callback runs, so callbacks may
//! reenter the registry freely; mutations they make land in the store but do
//! not alter the snapshot already being traversed.
//!
//! Callback panics are not caught. They propagate to the dispatch caller and
//! leave the execution-stack entry for the aborted dispatch in place.

use tracing::{debug, trace};

use crate::registry::{HookRegistry, sanitize};
use crate::types::{CallOutcome, HookArg, HookValue, Registration};

impl HookRegistry {
    /// Thread a value through the hook's callback chain and return the result
    ///
    /// Callbacks run in priority order (ascending, insertion order within a
    /// bucket); each receives `(value, extra...)` truncated or `Null`-padded
    /// to its registered argument count, and its return value becomes the
    /// input of the next callback. An invalid hook name or a hook with no
    /// registrations returns `value` unchanged.
    pub fn apply(&self, hook: &str, value: HookValue, extra: &[HookValue]) -> HookValue {
        let Some(hook) = sanitize(hook) else {
            return value;
        };

        let (target, all, pushed) = self.begin_dispatch(hook);

        if let Some(all) = &all {
            self.call_all(all, hook, &HookArg::Value(value.clone()), extra);
        }

        let Some(registrations) = target else {
            if pushed {
                self.end_dispatch();
            }
            return value;
        };

        debug!("Applying {} callback(s) on hook {}", registrations.len(), hook);

        let mut args: Vec<HookArg> = Vec::with_capacity(extra.len() + 1);
        args.push(HookArg::Value(value));
        args.extend(extra.iter().cloned().map(HookArg::Value));

        for registration in &registrations {
            trace!("Invoking {} on hook {}", registration.callable, hook);
            let sliced = slice_args(&args, registration.accepted_args);
            args[0] = HookArg::Value(registration.callable.invoke(&sliced));
        }

        self.end_dispatch();
        args.swap_remove(0).value()
    }

    /// Broadcast a notification to the hook's callbacks for side effects
    ///
    /// The invocation counter ticks unconditionally, even when nothing is
    /// registered. Callbacks receive `(arg, extra...)` truncated or
    /// `Null`-padded to their registered argument count; return values are
    /// discarded. Pass [`HookArg::Context`] as `arg` to give every callback
    /// shared mutable access to one value.
    pub fn call(&self, hook: &str, arg: HookArg, extra: &[HookValue]) -> CallOutcome {
        let Some(hook) = sanitize(hook) else {
            return CallOutcome::Rejected;
        };

        self.record_call(hook);

        let (target, all, pushed) = self.begin_dispatch(hook);

        if let Some(all) = &all {
            self.call_all(all, hook, &arg, extra);
        }

        let Some(registrations) = target else {
            if pushed {
                self.end_dispatch();
            }
            return CallOutcome::NoSuchHook;
        };

        debug!("Calling {} callback(s) on hook {}", registrations.len(), hook);

        let mut args: Vec<HookArg> = Vec::with_capacity(extra.len() + 1);
        args.push(arg);
        args.extend(extra.iter().cloned().map(HookArg::Value));

        for registration in &registrations {
            trace!("Invoking {} on hook {}", registration.callable, hook);
            let sliced = slice_args(&args, registration.accepted_args);
            registration.callable.invoke(&sliced);
        }

        self.end_dispatch();
        CallOutcome::Succeeded
    }

    /// Run the "all" meta-hook pass
    ///
    /// Every callback registered under "all" is invoked once, in priority
    /// order, with the full argument list led by the target hook's name.
    /// Registered argument counts are ignored and return values discarded.
    fn call_all(&self, registrations: &[Registration], hook: &str, arg: &HookArg, extra: &[HookValue]) {
        let mut args: Vec<HookArg> = Vec::with_capacity(extra.len() + 2);
        args.push(HookArg::Value(HookValue::String(hook.to_string())));
        args.push(arg.clone());
        args.extend(extra.iter().cloned().map(HookArg::Value));

        for registration in registrations {
            trace!("Invoking {} on the all meta-hook for {}", registration.callable, hook);
            registration.callable.invoke(&args);
        }
    }
}

/// Truncate or `Null`-pad the argument list to exactly `accepted` entries
fn slice_args(args: &[HookArg], accepted: usize) -> Vec<HookArg> {
    let mut sliced: Vec<HookArg> = args.iter().take(accepted).cloned().collect();
    sliced.resize_with(accepted, HookArg::none);
    sliced
}

//! Hook registry
//!
//! Owns all registration state: the per-hook priority buckets, the ordering
//! cache validated lazily at dispatch time, the execution stack tracking
//! (possibly reentrant) in-flight dispatches, and the action invocation
//! counters. Dispatch itself lives in [`crate::dispatch`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use crate::error::{HookError, HookResult};
use crate::identity::CallbackId;
use crate::types::{Callable, Priority, Registration};

/// Trim a hook name, rejecting names that are empty after trimming
pub(crate) fn sanitize(name: &str) -> Option<&str> {
    let name = name.trim();
    if name.is_empty() { None } else { Some(name) }
}

/// Registrations for a single hook name
#[derive(Default)]
pub(crate) struct HookEntry {
    /// Priority buckets. Within a bucket insertion order is preserved, and
    /// overwriting an existing identity keeps its position.
    buckets: HashMap<Priority, Vec<(CallbackId, Registration)>>,
    /// Sorted priority list; `None` after any structural mutation.
    sorted: Option<Vec<Priority>>,
}

impl HookEntry {
    /// Whether any bucket holds a live registration
    fn has_live(&self) -> bool {
        self.buckets.values().any(|bucket| !bucket.is_empty())
    }

    /// Invalidate the ordering cache
    fn touch(&mut self) {
        self.sorted = None;
    }

    /// Validate the ordering cache and return the priorities ascending
    fn sorted_priorities(&mut self) -> Vec<Priority> {
        if self.sorted.is_none() {
            let mut priorities: Vec<Priority> = self.buckets.keys().copied().collect();
            priorities.sort_unstable();
            self.sorted = Some(priorities);
        }
        self.sorted.clone().unwrap_or_default()
    }

    /// Registrations in dispatch order: buckets ascending by priority, each
    /// bucket in stored order
    pub(crate) fn ordered_registrations(&mut self) -> Vec<Registration> {
        let mut ordered = Vec::new();
        for priority in self.sorted_priorities() {
            if let Some(bucket) = self.buckets.get(&priority) {
                ordered.extend(bucket.iter().map(|(_, registration)| registration.clone()));
            }
        }
        ordered
    }

    /// Lowest priority at which the identity is registered
    fn find(&self, id: &CallbackId) -> Option<Priority> {
        let mut priorities: Vec<Priority> = self.buckets.keys().copied().collect();
        priorities.sort_unstable();
        priorities.into_iter().find(|priority| {
            self.buckets[priority]
                .iter()
                .any(|(existing, _)| existing == id)
        })
    }
}

#[derive(Default)]
pub(crate) struct RegistryInner {
    /// Hook name -> entry. A name that has ever held a registration keeps its
    /// key even after every registration is removed, so introspection can
    /// tell "registered then cleared" from "never registered".
    hooks: HashMap<String, HookEntry>,
    /// Hook names currently mid-dispatch, innermost last
    stack: Vec<String>,
    /// Action-mode invocation counts
    calls: HashMap<String, u64>,
}

/// Named, priority-ordered callback registry with filter and action dispatch
///
/// Cloning is cheap and clones share state, so a host can hand one registry
/// to every participant. Locks are never held while a callback runs, which
/// makes it safe for callbacks to reenter any registry operation.
#[derive(Clone, Default)]
pub struct HookRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl HookRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback, overwriting any registration with the same
    /// identity at the same hook and priority
    ///
    /// Overwriting keeps the original insertion position within the bucket.
    /// Returns `Ok(true)` on success; fails on an empty hook name or a
    /// callable no identity can be derived for.
    pub fn add(
        &self,
        hook: &str,
        callable: Callable,
        priority: Priority,
        accepted_args: usize,
    ) -> HookResult<bool> {
        self.insert(hook, callable, priority, accepted_args, true)
    }

    /// Register a callback unless its identity is already present under the
    /// hook at any priority
    ///
    /// Returns `Ok(false)`, with no changes, when the callback is already
    /// registered.
    pub fn add_unique(
        &self,
        hook: &str,
        callable: Callable,
        priority: Priority,
        accepted_args: usize,
    ) -> HookResult<bool> {
        self.insert(hook, callable, priority, accepted_args, false)
    }

    /// Append a callback, optionally only when it is not yet registered
    ///
    /// With `create` true this is [`HookRegistry::add`]; with `create` false
    /// it returns `Ok(false)` without side effects when a registration with
    /// the same identity already exists under the hook.
    pub fn append(
        &self,
        hook: &str,
        callable: Callable,
        priority: Priority,
        accepted_args: usize,
        create: bool,
    ) -> HookResult<bool> {
        self.insert(hook, callable, priority, accepted_args, create)
    }

    /// Swap one callback for another under a hook
    ///
    /// If the hook has any live registration, the old callback is removed at
    /// the given priority (best effort; absence is not an error) and the new
    /// one added. If the hook has none and `create` is true the new callback
    /// is simply added; otherwise nothing happens and `Ok(false)` is
    /// returned.
    pub fn replace(
        &self,
        hook: &str,
        old: &Callable,
        new: Callable,
        priority: Priority,
        accepted_args: usize,
        create: bool,
    ) -> HookResult<bool> {
        let name = sanitize(hook).ok_or(HookError::InvalidHookName)?;
        if self.has(name) {
            self.remove(name, old, priority);
            return self.insert(name, new, priority, accepted_args, true);
        }
        if create {
            return self.insert(name, new, priority, accepted_args, true);
        }
        Ok(false)
    }

    fn insert(
        &self,
        hook: &str,
        callable: Callable,
        priority: Priority,
        accepted_args: usize,
        append: bool,
    ) -> HookResult<bool> {
        let hook = sanitize(hook).ok_or(HookError::InvalidHookName)?;
        let id = CallbackId::resolve(&callable);

        let mut inner = self.inner.write();
        if !append {
            if let Some(id) = &id {
                let already = inner
                    .hooks
                    .get(hook)
                    .is_some_and(|entry| entry.find(id).is_some());
                if already {
                    return Ok(false);
                }
            }
        }

        let id = id.ok_or_else(|| HookError::invalid_callable(hook))?;
        let entry = inner.hooks.entry(hook.to_string()).or_default();
        let bucket = entry.buckets.entry(priority).or_default();
        let registration = Registration::new(callable, accepted_args);
        match bucket.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = registration,
            None => bucket.push((id.clone(), registration)),
        }
        entry.touch();
        debug!("Registered callback {} on hook {} (priority {})", id, hook, priority);
        Ok(true)
    }

    /// Remove the registration matching the callable at the given priority
    ///
    /// Returns whether a deletion occurred. Invalid hook names and callables
    /// whose identity cannot be derived are treated as "not found". The hook
    /// name itself stays known to the registry even when its last
    /// registration goes away.
    pub fn remove(&self, hook: &str, callable: &Callable, priority: Priority) -> bool {
        let Some(hook) = sanitize(hook) else {
            return false;
        };
        let Some(id) = CallbackId::resolve(callable) else {
            return false;
        };

        let mut inner = self.inner.write();
        let Some(entry) = inner.hooks.get_mut(hook) else {
            return false;
        };
        let Some(bucket) = entry.buckets.get_mut(&priority) else {
            return false;
        };
        let Some(position) = bucket.iter().position(|(existing, _)| *existing == id) else {
            return false;
        };

        bucket.remove(position);
        if bucket.is_empty() {
            entry.buckets.remove(&priority);
        }
        entry.touch();
        debug!("Removed callback {} from hook {} (priority {})", id, hook, priority);
        true
    }

    /// Remove every registration under a hook, or only one priority bucket
    ///
    /// `None` clears all priorities. `Some(priority)` empties only that
    /// bucket; the emptied bucket stays visible to [`HookRegistry::count`].
    /// Always returns `true`, including for names never registered.
    pub fn remove_all(&self, hook: &str, priority: Option<Priority>) -> bool {
        if let Some(name) = sanitize(hook) {
            let mut inner = self.inner.write();
            if let Some(entry) = inner.hooks.get_mut(name) {
                match priority {
                    None => entry.buckets.clear(),
                    Some(priority) => {
                        if let Some(bucket) = entry.buckets.get_mut(&priority) {
                            bucket.clear();
                        }
                    }
                }
                entry.touch();
                debug!("Removed callbacks from hook {} (priority {:?})", name, priority);
            }
        }
        true
    }

    /// Whether the hook has at least one live registration
    pub fn has(&self, hook: &str) -> bool {
        let Some(hook) = sanitize(hook) else {
            return false;
        };
        self.inner
            .read()
            .hooks
            .get(hook)
            .is_some_and(HookEntry::has_live)
    }

    /// The priority at which the callable is registered under the hook
    ///
    /// Returns the lowest matching priority when the identity appears in
    /// several buckets, `None` when it is absent or no identity can be
    /// derived.
    pub fn find(&self, hook: &str, callable: &Callable) -> Option<Priority> {
        let hook = sanitize(hook)?;
        let id = CallbackId::resolve(callable)?;
        let inner = self.inner.read();
        let entry = inner.hooks.get(hook)?;
        if !entry.has_live() {
            return None;
        }
        entry.find(&id)
    }

    /// Number of priority buckets registered for the hook
    ///
    /// `None` for invalid or never-registered names. A hook whose
    /// registrations were all removed reports `Some(0)`, and a bucket
    /// emptied by [`HookRegistry::remove_all`] still counts.
    pub fn count(&self, hook: &str) -> Option<usize> {
        let hook = sanitize(hook)?;
        let inner = self.inner.read();
        inner.hooks.get(hook).map(|entry| entry.buckets.len())
    }

    /// Hook names with at least one live registration, sorted
    pub fn hook_names(&self) -> Vec<String> {
        let inner = self.inner.read();
        let mut names: Vec<String> = inner
            .hooks
            .iter()
            .filter(|(_, entry)| entry.has_live())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Drop every registration and invocation counter
    ///
    /// The execution stack is left alone so a clear issued from inside a
    /// callback cannot unbalance the dispatch currently unwinding.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.hooks.clear();
        inner.calls.clear();
        debug!("Cleared all hook registrations");
    }

    /// The innermost hook currently being dispatched
    pub fn current(&self) -> Option<String> {
        self.inner.read().stack.last().cloned()
    }

    /// Whether any dispatch is in progress
    pub fn is_dispatching(&self) -> bool {
        !self.inner.read().stack.is_empty()
    }

    /// Whether the given hook appears anywhere on the execution stack
    ///
    /// Detects nested and reentrant dispatch of the same hook, not just the
    /// innermost one.
    pub fn is_dispatching_hook(&self, hook: &str) -> bool {
        let Some(hook) = sanitize(hook) else {
            return false;
        };
        self.inner.read().stack.iter().any(|active| active == hook)
    }

    /// How many times `call` has been invoked for the hook
    ///
    /// Counts every `call`, including those that found no registrations.
    /// Filter-mode `apply` never increments this.
    pub fn call_count(&self, hook: &str) -> u64 {
        let Some(hook) = sanitize(hook) else {
            return 0;
        };
        self.inner.read().calls.get(hook).copied().unwrap_or(0)
    }

    /// Serializable per-hook report for debugging and audit surfaces
    pub fn summary(&self) -> Vec<HookSummary> {
        let inner = self.inner.read();
        let mut rows: Vec<HookSummary> = inner
            .hooks
            .iter()
            .map(|(name, entry)| {
                let mut priorities: Vec<Priority> = entry.buckets.keys().copied().collect();
                priorities.sort_unstable();
                HookSummary {
                    name: name.clone(),
                    priorities,
                    callbacks: entry.buckets.values().map(Vec::len).sum(),
                    calls: inner.calls.get(name).copied().unwrap_or(0),
                }
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    // ===== dispatch support (see crate::dispatch) =====

    /// Snapshot the hook's registrations in dispatch order, validating the
    /// ordering cache, and push the hook onto the execution stack when either
    /// the hook itself or the "all" meta-hook is registered.
    ///
    /// Returns `(target snapshot, "all" snapshot, pushed)`. `None` snapshots
    /// mean the hook name has never been registered.
    pub(crate) fn begin_dispatch(
        &self,
        hook: &str,
    ) -> (Option<Vec<Registration>>, Option<Vec<Registration>>, bool) {
        let mut inner = self.inner.write();
        let all = inner
            .hooks
            .get_mut(crate::types::ALL_HOOK)
            .map(HookEntry::ordered_registrations);
        let target = inner
            .hooks
            .get_mut(hook)
            .map(HookEntry::ordered_registrations);
        let pushed = all.is_some() || target.is_some();
        if pushed {
            inner.stack.push(hook.to_string());
        }
        (target, all, pushed)
    }

    /// Pop the execution stack at dispatch exit
    pub(crate) fn end_dispatch(&self) {
        self.inner.write().stack.pop();
    }

    /// Increment the action counter for the hook
    pub(crate) fn record_call(&self, hook: &str) {
        let mut inner = self.inner.write();
        *inner.calls.entry(hook.to_string()).or_insert(0) += 1;
    }
}

/// Snapshot of one hook's registration state
#[derive(Debug, Clone, Serialize)]
pub struct HookSummary {
    /// Hook name
    pub name: String,
    /// Registered priority buckets, ascending
    pub priorities: Vec<Priority>,
    /// Total registered callbacks across all buckets
    pub callbacks: usize,
    /// Action-mode invocation count
    pub calls: u64,
}

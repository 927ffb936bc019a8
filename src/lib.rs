//! Named, priority-ordered hook registry
//!
//! This crate provides a [`HookRegistry`]: a registry of callbacks attached
//! to symbolic hook names, dispatched in two modes. Filter mode
//! ([`HookRegistry::apply`]) threads a value through the registered chain and
//! returns the final result; action mode ([`HookRegistry::call`]) broadcasts
//! a notification for side effects and returns a status. Producers and
//! consumers of extension points stay decoupled: they only share hook names
//! and a registry instance.
//!
//! # Examples
//!
//! ```rust
//! use hookable::{Callable, HookArg, HookRegistry};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let hooks = HookRegistry::new();
//!
//! // Lower priorities run first.
//! hooks.add(
//!     "greet",
//!     Callable::function("upper", |args| {
//!         json!(args[0].value().as_str().unwrap_or_default().to_uppercase())
//!     }),
//!     10,
//!     1,
//! )?;
//! hooks.add(
//!     "greet",
//!     Callable::function("bang", |args| {
//!         json!(format!("{}!", args[0].value().as_str().unwrap_or_default()))
//!     }),
//!     20,
//!     1,
//! )?;
//!
//! assert_eq!(hooks.apply("greet", json!("hi"), &[]), json!("HI!"));
//!
//! // Actions broadcast and count, even with nothing registered.
//! hooks.call("saved", HookArg::none(), &[]);
//! assert_eq!(hooks.call_count("saved"), 1);
//! # Ok(())
//! # }
//! ```
//!
//! A host needing a shared registry clones one instance (clones share state)
//! and hands it to every participant; there is no hidden global.

pub mod dispatch;
pub mod error;
pub mod identity;
pub mod registry;
pub mod types;

// Re-export the public surface
pub use error::{HookError, HookResult};
pub use identity::CallbackId;
pub use registry::{HookRegistry, HookSummary};
pub use types::{
    ALL_HOOK, CallOutcome, Callable, DEFAULT_PRIORITY, HookArg, HookContext, HookFn, HookValue,
    Priority, Registration,
};

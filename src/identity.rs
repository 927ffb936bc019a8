//! Callback identity derivation
//!
//! Every registration is keyed by a [`CallbackId`] within its (hook,
//! priority) bucket, so re-adding the same logical callback overwrites
//! instead of duplicating, and removal can name its target. Derivation is
//! directed by the callable's target tag rather than runtime shape
//! inspection.

use std::fmt;
use std::sync::Arc;

use crate::types::{CallTarget, Callable};

/// Stable, comparable identity of a registered callback
///
/// - named functions resolve to their (trimmed) name;
/// - bound methods combine the receiver's reference identity with the method
///   name, so the same instance and method always resolve identically while
///   distinct instances never collide;
/// - static methods resolve to `Class::method`;
/// - closures resolve from their own allocation, which stays consistent for
///   clones of the same [`Callable`] but cannot be reproduced by an
///   independently constructed closure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(String);

impl CallbackId {
    /// Derive an identity from a callable
    ///
    /// Returns `None` when the shape carries no usable name: an empty
    /// function name, an empty method name, or an empty class or method on a
    /// static target. Registration paths surface that as an error; read-only
    /// probes treat it as "not found".
    pub fn resolve(callable: &Callable) -> Option<Self> {
        match &callable.target {
            CallTarget::Function { name } => {
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(Self(name.to_string()))
            }
            CallTarget::Method { receiver, method } => {
                let method = method.trim();
                if method.is_empty() {
                    return None;
                }
                let token = Arc::as_ptr(receiver) as *const () as usize;
                Some(Self(format!("{:#x}::{}", token, method)))
            }
            CallTarget::Static { class, method } => {
                let class = class.trim();
                let method = method.trim();
                if class.is_empty() || method.is_empty() {
                    return None;
                }
                Some(Self(format!("{}::{}", class, method)))
            }
            CallTarget::Closure => {
                let token = Arc::as_ptr(&callable.func) as *const () as usize;
                Some(Self(format!("{:#x}", token)))
            }
        }
    }

    /// The identity as a displayable token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HookArg, HookValue};

    fn noop(_: &[HookArg]) -> HookValue {
        HookValue::Null
    }

    #[test]
    fn test_function_identity_is_its_name() {
        let a = Callable::function("render_title", noop);
        let b = Callable::function("render_title", |_| HookValue::Bool(true));

        // Same name, different bodies: one logical callback.
        assert_eq!(CallbackId::resolve(&a), CallbackId::resolve(&b));
        assert_eq!(CallbackId::resolve(&a).unwrap().as_str(), "render_title");
    }

    #[test]
    fn test_function_name_is_trimmed() {
        let a = Callable::function("  spaced  ", noop);
        assert_eq!(CallbackId::resolve(&a).unwrap().as_str(), "spaced");
    }

    #[test]
    fn test_method_identity_tracks_the_instance() {
        let first = Arc::new("listener one".to_string());
        let second = Arc::new("listener two".to_string());

        let on_first = Callable::method(&first, "on_save", noop);
        let again_on_first = Callable::method(&first, "on_save", noop);
        let on_second = Callable::method(&second, "on_save", noop);
        let other_method = Callable::method(&first, "on_delete", noop);

        // Same instance + method resolves identically across constructions.
        assert_eq!(
            CallbackId::resolve(&on_first),
            CallbackId::resolve(&again_on_first)
        );
        // Distinct instances never collide, same-named method or not.
        assert_ne!(
            CallbackId::resolve(&on_first),
            CallbackId::resolve(&on_second)
        );
        assert_ne!(
            CallbackId::resolve(&on_first),
            CallbackId::resolve(&other_method)
        );
    }

    #[test]
    fn test_static_identity_format() {
        let callable = Callable::static_method("Mailer", "send", noop);
        assert_eq!(CallbackId::resolve(&callable).unwrap().as_str(), "Mailer::send");
    }

    #[test]
    fn test_closure_identity_follows_clones_only() {
        let original = Callable::closure(noop);
        let clone = original.clone();
        let lookalike = Callable::closure(noop);

        assert_eq!(CallbackId::resolve(&original), CallbackId::resolve(&clone));
        assert_ne!(
            CallbackId::resolve(&original),
            CallbackId::resolve(&lookalike)
        );
    }

    #[test]
    fn test_empty_names_do_not_resolve() {
        assert!(CallbackId::resolve(&Callable::function("", noop)).is_none());
        assert!(CallbackId::resolve(&Callable::function("   ", noop)).is_none());

        let receiver = Arc::new(());
        assert!(CallbackId::resolve(&Callable::method(&receiver, "", noop)).is_none());

        assert!(CallbackId::resolve(&Callable::static_method("", "send", noop)).is_none());
        assert!(CallbackId::resolve(&Callable::static_method("Mailer", "", noop)).is_none());
    }
}

//! Error types for the hook registry

use thiserror::Error;

/// Result type alias for registry operations
pub type HookResult<T> = Result<T, HookError>;

/// Errors raised by registration-time validation
///
/// Only the `add` family of operations (`add`, `add_unique`, `append`,
/// `replace`) raises these. Every other operation treats the same conditions
/// as a silent no-op and returns an empty or falsy result instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// Hook name is empty after trimming surrounding whitespace
    #[error("Invalid hook name: must be non-empty after trimming")]
    InvalidHookName,

    /// The callable's shape cannot be resolved to a stable identity
    #[error("Invalid callable on hook `{hook}`: no identity can be derived")]
    InvalidCallable { hook: String },
}

impl HookError {
    /// Create a new invalid-callable error for the given hook
    pub fn invalid_callable(hook: impl Into<String>) -> Self {
        Self::InvalidCallable { hook: hook.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HookError::InvalidHookName;
        assert!(err.to_string().contains("Invalid hook name"));

        let err = HookError::invalid_callable("save_post");
        assert!(err.to_string().contains("save_post"));
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(HookError::InvalidHookName, HookError::InvalidHookName);
        assert_ne!(
            HookError::InvalidHookName,
            HookError::invalid_callable("x")
        );
    }
}

//! Error types for the platform-access crate.
//!
//! Errors are designed for layered context using rootcause. A caller that
//! lacks a permission is not an error: the `Authorizer` reports that as a
//! denial decision. Only failures to reach a decision surface here.

use std::fmt;

/// Errors from authorization operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// The session or permission store failed; no decision was reached.
    StoreFailed,
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreFailed => write!(f, "authorization check failed: store error"),
        }
    }
}

impl std::error::Error for AuthorizationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failed_display() {
        let err = AuthorizationError::StoreFailed;
        assert!(err.to_string().contains("authorization check failed"));
    }
}

//! Error handling foundation for the Nexus access platform.
//!
//! This module provides the `Result` type alias using rootcause and the
//! storage error shared by every store contract. Each crate defines its own
//! domain-specific error types in its own error module, using rootcause's
//! `.context()` to add layer-appropriate context as errors propagate.

use rootcause::Report;
use std::fmt;

/// A Result type alias using rootcause's Report for error handling.
///
/// Each layer adds its own context via `.context()` as errors propagate.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

/// Errors raised by a credential, session, or permission store.
///
/// Store implementations (Postgres, in-memory) report through this type so
/// the decision logic never depends on a particular driver's error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or the statement failed.
    Unavailable { details: String },
    /// A row was read but could not be decoded into a domain value.
    Corrupt { details: String },
}

impl StoreError {
    /// Creates an `Unavailable` error from any displayable cause.
    #[must_use]
    pub fn unavailable(details: impl fmt::Display) -> Self {
        Self::Unavailable {
            details: details.to_string(),
        }
    }

    /// Creates a `Corrupt` error from any displayable cause.
    #[must_use]
    pub fn corrupt(details: impl fmt::Display) -> Self {
        Self::Corrupt {
            details: details.to_string(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { details } => write!(f, "store unavailable: {details}"),
            Self::Corrupt { details } => write!(f, "corrupt store data: {details}"),
        }
    }
}

impl std::error::Error for StoreError {}

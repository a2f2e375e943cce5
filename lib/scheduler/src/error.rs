//! Error types for the scheduler crate.

use std::fmt;

/// Errors from a sweep run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    /// The session store could not be swept.
    StoreFailed,
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreFailed => write!(f, "session sweep failed: store error"),
        }
    }
}

impl std::error::Error for SweepError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_error_display() {
        assert!(SweepError::StoreFailed.to_string().contains("sweep failed"));
    }
}

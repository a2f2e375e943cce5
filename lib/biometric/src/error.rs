//! Error types for the biometric crate.

use std::fmt;

/// Errors from template extraction and construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiometricError {
    /// The payload could not be parsed into a minutiae template.
    InvalidBiometricData { reason: String },
}

impl BiometricError {
    /// Creates an `InvalidBiometricData` error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidBiometricData {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for BiometricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBiometricData { reason } => {
                write!(f, "invalid biometric data: {reason}")
            }
        }
    }
}

impl std::error::Error for BiometricError {}

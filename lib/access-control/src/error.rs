//! Error types for the access-control crate.
//!
//! Errors are designed for layered context using rootcause:
//! - client errors (`MalformedAttempt`, `RoomNotFound`, `InvalidBiometricData`)
//!   short-circuit before any access log is written
//! - `StoreFailed` wraps the underlying `StoreError` report
//! - `MatchingFailed` means the fingerprint scan task did not complete
//!
//! An unrecognized credential or a missing room grant is not an error; the
//! evaluator reports those as an [`AccessOutcome`](crate::AccessOutcome).

use nexus_core::RoomId;
use std::fmt;

/// Errors from access attempt evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Required attempt fields are missing or inconsistent.
    MalformedAttempt { reason: String },
    /// The attempt names a room that does not exist.
    RoomNotFound { room_id: RoomId },
    /// The presented fingerprint payload could not be parsed.
    InvalidBiometricData,
    /// The credential store failed mid-evaluation.
    StoreFailed,
    /// The fingerprint scan panicked or was cancelled.
    MatchingFailed,
}

impl AccessError {
    /// Returns true for errors caused by the request rather than the system.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::StoreFailed | Self::MatchingFailed)
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedAttempt { reason } => write!(f, "malformed access attempt: {reason}"),
            Self::RoomNotFound { room_id } => write!(f, "room not found: {room_id}"),
            Self::InvalidBiometricData => write!(f, "invalid biometric data"),
            Self::StoreFailed => write!(f, "access evaluation failed: store error"),
            Self::MatchingFailed => write!(f, "access evaluation failed: fingerprint scan aborted"),
        }
    }
}

impl std::error::Error for AccessError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_display() {
        let err = AccessError::MalformedAttempt {
            reason: "no credential supplied".to_string(),
        };
        assert!(err.to_string().contains("malformed"));
        assert!(err.to_string().contains("no credential"));
    }

    #[test]
    fn room_not_found_display() {
        let err = AccessError::RoomNotFound {
            room_id: RoomId::new(999),
        };
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn client_error_classification() {
        assert!(AccessError::InvalidBiometricData.is_client_error());
        assert!(
            AccessError::RoomNotFound {
                room_id: RoomId::new(1)
            }
            .is_client_error()
        );
        assert!(!AccessError::StoreFailed.is_client_error());
        assert!(!AccessError::MatchingFailed.is_client_error());
    }
}

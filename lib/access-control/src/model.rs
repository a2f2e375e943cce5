//! Domain records for door access.

use crate::error::AccessError;
use chrono::{DateTime, Utc};
use nexus_core::{AccessLogId, EmployeeId, RoomId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An employee as stored by the admin panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    /// Short numeric PIN. Uniqueness is expected but not enforced.
    pub pin_code: Option<String>,
    /// Enrolled fingerprint template, as raw record bytes.
    pub fingerprint_template: Option<Vec<u8>>,
}

/// A bookable room behind an access-controlled door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    pub occupied: bool,
    pub occupant: Option<EmployeeId>,
}

/// An enrolled template to compare presented fingerprints against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrolledFingerprint {
    pub employee_id: EmployeeId,
    pub template: Vec<u8>,
}

/// Which credential an attempt presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttemptKind {
    PinCode,
    Fingerprint,
}

impl AttemptKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PinCode => "PinCode",
            Self::Fingerprint => "Fingerprint",
        }
    }
}

impl fmt::Display for AttemptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttemptKind {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PinCode" => Ok(Self::PinCode),
            "Fingerprint" => Ok(Self::Fingerprint),
            other => Err(AccessError::MalformedAttempt {
                reason: format!("unknown attempt type '{other}'"),
            }),
        }
    }
}

/// A credential presentation at a door.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessAttempt {
    pub room_id: RoomId,
    pub kind: AttemptKind,
    pub pin_code: Option<String>,
    pub raw_fingerprint: Option<Vec<u8>>,
}

/// The credential selected by an attempt's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Credential<'a> {
    Pin(&'a str),
    Fingerprint(&'a [u8]),
}

impl AccessAttempt {
    /// Creates a PIN attempt.
    #[must_use]
    pub fn pin(room_id: RoomId, pin_code: impl Into<String>) -> Self {
        Self {
            room_id,
            kind: AttemptKind::PinCode,
            pin_code: Some(pin_code.into()),
            raw_fingerprint: None,
        }
    }

    /// Creates a fingerprint attempt.
    #[must_use]
    pub fn fingerprint(room_id: RoomId, raw: Vec<u8>) -> Self {
        Self {
            room_id,
            kind: AttemptKind::Fingerprint,
            pin_code: None,
            raw_fingerprint: Some(raw),
        }
    }

    /// Validates the attempt and returns the credential its kind selects.
    pub(crate) fn credential(&self) -> Result<Credential<'_>, AccessError> {
        if self.pin_code.is_none() && self.raw_fingerprint.is_none() {
            return Err(AccessError::MalformedAttempt {
                reason: "no credential supplied".to_string(),
            });
        }
        match self.kind {
            AttemptKind::PinCode => self
                .pin_code
                .as_deref()
                .map(Credential::Pin)
                .ok_or_else(|| AccessError::MalformedAttempt {
                    reason: "PinCode attempt without a PIN code".to_string(),
                }),
            AttemptKind::Fingerprint => self
                .raw_fingerprint
                .as_deref()
                .map(Credential::Fingerprint)
                .ok_or_else(|| AccessError::MalformedAttempt {
                    reason: "Fingerprint attempt without fingerprint data".to_string(),
                }),
        }
    }
}

/// Result of an evaluated attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
    /// Identity resolved and the employee holds a grant for the room.
    Granted,
    /// Identity resolved but the employee has no grant for the room.
    Forbidden,
    /// No single employee matches the credential.
    Unrecognized,
}

/// What the door is told, plus who was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub outcome: AccessOutcome,
    pub employee_id: Option<EmployeeId>,
}

impl AccessDecision {
    /// Returns true if the door should open.
    #[must_use]
    pub fn granted(&self) -> bool {
        self.outcome == AccessOutcome::Granted
    }
}

/// One access attempt, as appended to the access log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    /// None when no employee could be identified.
    pub employee_id: Option<EmployeeId>,
    pub room_id: RoomId,
    pub access_time: DateTime<Utc>,
    pub access_granted: bool,
}

/// A persisted access log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogRecord {
    pub id: AccessLogId,
    #[serde(flatten)]
    pub entry: AccessLogEntry,
}

/// A 1-based page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// One page of results with the total row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
}

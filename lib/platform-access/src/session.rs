//! Server-side sessions backing bearer tokens.
//!
//! A session is created by the login flow and lives until it expires, the
//! employee logs out, or the sweeper removes it.

use chrono::{DateTime, Duration, Utc};
use nexus_core::EmployeeId;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Opaque bearer token identifying a session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Creates a token from its string form.
    #[must_use]
    pub fn new(token: String) -> Self {
        Self(token)
    }

    /// Generates a fresh, unique token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of debug output.
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An active or expired session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: SessionToken,
    employee_id: EmployeeId,
    expiration: DateTime<Utc>,
}

impl Session {
    /// Reconstitutes a session from storage.
    #[must_use]
    pub fn new(token: SessionToken, employee_id: EmployeeId, expiration: DateTime<Utc>) -> Self {
        Self {
            token,
            employee_id,
            expiration,
        }
    }

    /// Issues a new session with a generated token, valid for `lifetime`
    /// from `now`.
    #[must_use]
    pub fn issue(employee_id: EmployeeId, lifetime: Duration, now: DateTime<Utc>) -> Self {
        Self::new(SessionToken::generate(), employee_id, now + lifetime)
    }

    /// Returns the bearer token.
    #[must_use]
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Returns the employee the session belongs to.
    #[must_use]
    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns when the session stops being valid.
    #[must_use]
    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    /// Returns true if the session is no longer valid at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }
}

//! Session and permission authorization for the Nexus access platform.
//!
//! This crate provides:
//! - Session records backing bearer tokens (`Session`, `SessionToken`)
//! - The closed permission registry (`Permission`, `PermissionSet`)
//! - Store contracts for sessions and permission resolution
//! - The `Authorizer`, which decides whether a session holds a permission
//!
//! # Access Control Model
//!
//! An employee has zero or more roles; a role links to zero or more
//! permissions. A permission is held if any role links to it. There is no
//! hierarchy between permissions: `AdminAccess` does not imply
//! `ViewAccessLogs`.
//!
//! # Example
//!
//! ```
//! use nexus_platform_access::{Permission, PermissionSet, Session};
//! use nexus_core::EmployeeId;
//! use chrono::{Duration, Utc};
//!
//! let now = Utc::now();
//! let session = Session::issue(EmployeeId::new(1), Duration::minutes(60), now);
//! assert!(!session.is_expired_at(now));
//! assert!(session.is_expired_at(now + Duration::minutes(60)));
//!
//! let held = PermissionSet::from_keys(["AdminAccess", "NoSuchKey"]);
//! assert!(held.contains(Permission::AdminAccess));
//! assert!(!held.contains(Permission::ViewAccessLogs));
//! ```

pub mod authorizer;
pub mod error;
pub mod permission;
pub mod session;
pub mod store;

// Re-export main types at crate root
pub use authorizer::{AuthorizationDecision, Authorizer, DenialReason, SessionStatus};
pub use error::AuthorizationError;
pub use permission::{Permission, PermissionSet};
pub use session::{Session, SessionToken};
pub use store::{PermissionResolver, SessionStore};

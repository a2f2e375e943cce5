//! Permission registry.
//!
//! Permission keys are persisted as strings in the `permissions` table. The
//! set of keys the server checks is closed: a typo in a handler is a compile
//! error, and keys in storage that nothing checks are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A permission an API operation can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Administrative access to the management panel.
    AdminAccess,
    /// Read access to the door access log.
    ViewAccessLogs,
}

impl Permission {
    /// Every registered permission.
    pub const ALL: [Permission; 2] = [Permission::AdminAccess, Permission::ViewAccessLogs];

    /// Returns the key stored in the `permissions` table.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::AdminAccess => "AdminAccess",
            Self::ViewAccessLogs => "ViewAccessLogs",
        }
    }

    /// Looks up a permission by its stored key. Exact, case-sensitive match.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The permissions reachable from one employee through their roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    permissions: HashSet<Permission>,
}

impl PermissionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a set from stored keys, skipping keys outside the registry.
    /// Duplicate keys collapse.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter()
            .filter_map(|key| {
                let key = key.as_ref();
                let permission = Permission::from_key(key);
                if permission.is_none() {
                    tracing::debug!(permission_key = key, "Ignoring unregistered permission key");
                }
                permission
            })
            .collect()
    }

    /// Returns true if `permission` is held.
    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Returns the number of distinct permissions held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns true if no permission is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}

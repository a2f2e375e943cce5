//! Postgres repositories implementing the store traits.
//!
//! This module provides data access for:
//! - Employees, rooms, grants, and the access log
//! - Bearer sessions and role-derived permissions
//!
//! The schema is owned by the admin application; nothing here migrates it.

pub mod access;
pub mod session;

pub use access::PgAccessRepository;
pub use session::PgSessionRepository;

use nexus_core::StoreError;
use rootcause::Report;

fn store_error(err: sqlx::Error) -> Report<StoreError> {
    StoreError::unavailable(err).into()
}

//! Core domain types and utilities for the Nexus access platform.
//!
//! This crate provides the foundational identifiers, the injectable clock,
//! and the shared storage error used by every other crate in the workspace.

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, StoreError};
pub use id::{AccessLogId, EmployeeId, ParseIdError, RoomId};

//! Door access decisions for the Nexus access platform.
//!
//! An access attempt names a room and presents a PIN code or a fingerprint.
//! The `AccessEvaluator` validates the attempt, resolves the presenting
//! employee, checks the employee's grant for the room, and appends exactly
//! one access log entry for every attempt that reaches identity resolution.
//!
//! # Example
//!
//! ```
//! use nexus_access_control::{AccessAttempt, AccessEvaluator, AccessConfig, AccessOutcome};
//! use nexus_access_control::memory::InMemoryStore;
//! use nexus_biometric::{MatcherConfig, MinutiaeRecordExtractor};
//! use nexus_core::{EmployeeId, RoomId, SystemClock};
//! use std::sync::Arc;
//!
//! # tokio_test_block_on(async {
//! let store = Arc::new(InMemoryStore::new());
//! store.add_employee(EmployeeId::new(1), "Ada", Some("1234"), None);
//! store.add_room(RoomId::new(10), "Lab", "Clean room");
//! store.grant_room_access(EmployeeId::new(1), RoomId::new(10));
//!
//! let evaluator = AccessEvaluator::new(
//!     store.clone(),
//!     Arc::new(MinutiaeRecordExtractor),
//!     MatcherConfig::default(),
//!     Arc::new(SystemClock),
//!     AccessConfig::default(),
//! );
//!
//! let decision = evaluator
//!     .evaluate(AccessAttempt::pin(RoomId::new(10), "1234"))
//!     .await
//!     .expect("evaluated");
//! assert_eq!(decision.outcome, AccessOutcome::Granted);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod error;
pub mod evaluator;
pub mod memory;
pub mod model;
pub mod store;

pub use error::AccessError;
pub use evaluator::{AccessConfig, AccessEvaluator};
pub use model::{
    AccessAttempt, AccessDecision, AccessLogEntry, AccessLogRecord, AccessOutcome, AttemptKind,
    Employee, EnrolledFingerprint, Page, PageRequest, Room,
};
pub use store::{AccessLogQuery, CredentialStore, GrantStore};

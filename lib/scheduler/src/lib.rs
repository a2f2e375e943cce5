//! Background maintenance for the Nexus access platform.
//!
//! This crate provides:
//!
//! - **Session Sweeper**: Periodic deletion of expired sessions, stopped
//!   through a cancellation token

pub mod error;
pub mod sweeper;

pub use error::SweepError;
pub use sweeper::SessionSweeper;

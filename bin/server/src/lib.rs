//! Nexus access platform HTTP API.
//!
//! This crate wires the access evaluator, the session authorizer, and the
//! Postgres repositories into an Axum router.

pub mod access;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logs;
pub mod rooms;

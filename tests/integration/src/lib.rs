//! Integration test utilities for the push gateway
//!
//! This crate provides helpers for running end-to-end tests against the
//! publish endpoint and the SSE and WebSocket subscription endpoints.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

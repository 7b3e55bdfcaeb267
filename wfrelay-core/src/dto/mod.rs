//! Data Transfer Objects
//!
//! Payloads exchanged between the HTTP server and its callers.

pub mod health;
pub mod workflow;

//! Core domain types
//!
//! These types describe what a caller asks for (a parameter bag) and what the
//! relay observed while driving the workflow tool (identities, per-step
//! summaries and the final outcome). They are shared between the engine that
//! produces them, the HTTP server that serializes them and the client that
//! reads them back.

pub mod parameters;
pub mod step;
pub mod workflow;

//! Wfrelay Core
//!
//! Core types shared by the workflow relay services.
//!
//! This crate contains:
//! - Domain types: parameter bags, workflow identities, step summaries and outcomes
//! - DTOs: request and response payloads exchanged over HTTP

pub mod domain;
pub mod dto;

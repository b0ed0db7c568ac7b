//! Shared domain types for AstroDesk: error taxonomy, configuration,
//! birth facts, conversation state, and the order model.
//!
//! This crate has no I/O; every type here is plain data plus the
//! invariants the rest of the workspace relies on.

pub mod birth;
pub mod config;
pub mod conversation;
pub mod error;
pub mod order;

pub use error::{Error, Result};

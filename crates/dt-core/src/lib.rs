//! # dt-core
//!
//! Core types shared across the devtrack crates:
//! - Audit log entry structs (stored row and append request)
//! - Entity types and the closed set of undoable action tags
//! - Snapshot (`old_data`) parsing
//! - CLI response types for undo, history, and validation

pub mod entities;
pub mod enums;
pub mod responses;
pub mod snapshot;

//! Entity structs persisted by devtrack.
//!
//! Phases, decisions, and features are owned by the mutation commands; the
//! undo core only needs the audit log rows.

mod audit;

pub use audit::{AuditLogEntry, NewAuditEntry};

//! Repository modules over the devtrack store.
//!
//! Each module adds methods to `DevDb` via `impl DevDb` blocks.

pub mod audit;

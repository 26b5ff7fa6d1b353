//! Composition helpers for piping `dtk` output into other commands.

pub mod stdin;

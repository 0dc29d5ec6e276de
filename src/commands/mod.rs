//! Command implementations
//!
//! Every command is an `impl Repository` block under `porcelain`, writing its human-readable
//! output to the repository writer and returning a typed result.

pub mod porcelain;

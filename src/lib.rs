//! A small content-addressed version control system with branches and three-way merges
//!
//! - `areas`: on-disk state (object store, references, staging area, working tree) and the
//!   [`Repository`] handle tying them together
//! - `artifacts`: the values those areas hold and the algorithms over them
//! - `commands`: user-facing operations, implemented on [`Repository`]

pub mod areas;
pub mod artifacts;
pub mod commands;

pub use areas::repository::Repository;
pub use artifacts::core::error::{GraftError, Result};
pub use artifacts::merge::MergeOutcome;

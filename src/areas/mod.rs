//! Core repository components
//!
//! - `database`: object store for blobs and commits
//! - `refs`: HEAD, branch pointers and the pending merge
//! - `repository`: the handle tying the other areas together
//! - `staging`: pending additions and removals for the next commit
//! - `workspace`: working tree file system operations

pub(crate) mod database;
pub(crate) mod refs;
pub mod repository;
pub(crate) mod staging;
pub(crate) mod workspace;

//! Working tree status inspection
//!
//! Compares the working tree against the staging area and the HEAD commit.
//!
//! ## Components
//!
//! - `file_change`: kinds of unstaged changes and their labels
//! - `status_info`: status collection and the resulting report

pub mod file_change;
pub mod status_info;

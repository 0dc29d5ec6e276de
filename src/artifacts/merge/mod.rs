//! Three-way merge building blocks
//!
//! - `split_point`: common-ancestor discovery over the commit graph
//! - `resolution`: per-path decision from the split point, current and other versions
//! - `conflict`: the marker block written for conflicted paths

pub mod conflict;
pub mod resolution;
pub mod split_point;

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;

/// Result of a merge that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The other branch is already contained in the current one
    AlreadyAncestor,
    /// The current branch was moved forward to the other tip
    FastForwarded(ObjectId),
    /// A merge commit was created
    Merged { oid: ObjectId, message: String },
    /// Resolutions were applied and staged but some paths need manual resolution
    Conflicted(Vec<PathBuf>),
}

impl MergeOutcome {
    pub fn message(&self) -> &str {
        match self {
            MergeOutcome::AlreadyAncestor => "Given branch is an ancestor of the current branch.",
            MergeOutcome::FastForwarded(_) => "Current branch fast-forwarded.",
            MergeOutcome::Merged { message, .. } => message,
            MergeOutcome::Conflicted(_) => "Encountered a merge conflict.",
        }
    }

    pub fn is_conflicted(&self) -> bool {
        matches!(self, MergeOutcome::Conflicted(_))
    }
}

/// Message of the commit created by a clean merge
pub fn merge_message(other: &BranchName, current: &BranchName) -> String {
    format!("Merged {other} into {current}.")
}

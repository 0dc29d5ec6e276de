//! Typed command outcomes
//!
//! Every repository operation returns [`Result`]. The variants mirror the situations a user can run
//! into at the command boundary; anything else (I/O failures, corrupt objects) is carried as
//! [`GraftError::Internal`] with its `anyhow` context chain intact.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

/// Kind of thing an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Object,
    Commit,
    Branch,
    File,
    Repository,
}

impl Subject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Object => "object",
            Subject::Commit => "commit",
            Subject::Branch => "branch",
            Subject::File => "file",
            Subject::Repository => "repository",
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum GraftError {
    #[error("{subject} '{name}' not found")]
    NotFound { subject: Subject, name: String },

    #[error("{subject} '{name}' already exists")]
    AlreadyExists { subject: Subject, name: String },

    #[error("short object id {prefix} is ambiguous ({} candidates)", .candidates.len())]
    AmbiguousPrefix {
        prefix: String,
        candidates: Vec<ObjectId>,
    },

    #[error("{0}")]
    InvalidOperand(String),

    #[error("no changes added to the commit")]
    NothingToCommit,

    #[error("you have uncommitted changes")]
    UncommittedChanges,

    #[error("untracked working tree files would be overwritten: {}", display_paths(.0))]
    UntrackedFileConflict(Vec<PathBuf>),

    #[error("branch '{0}' does not exist")]
    NoSuchBranch(String),

    #[error("cannot merge a branch with itself")]
    SelfMerge,

    #[error("cannot remove the current branch '{0}'")]
    CannotRemoveCurrent(String),

    #[error("not in an initialized graft directory: {}", .0.display())]
    NotInitialized(PathBuf),

    #[error("repository at {} is locked by another process", .0.display())]
    RepositoryLocked(PathBuf),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GraftError {
    pub fn not_found(subject: Subject, name: impl std::fmt::Display) -> Self {
        GraftError::NotFound {
            subject,
            name: name.to_string(),
        }
    }

    pub fn already_exists(subject: Subject, name: impl std::fmt::Display) -> Self {
        GraftError::AlreadyExists {
            subject,
            name: name.to_string(),
        }
    }
}

impl From<std::io::Error> for GraftError {
    fn from(error: std::io::Error) -> Self {
        GraftError::Internal(error.into())
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, GraftError>;

use crate::areas::refs::HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{ANCESTOR_REGEX, PARENT_REGEX, REF_ALIASES};
use crate::artifacts::core::error::{GraftError, Result, Subject};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;

/// A commit reference as typed by the user
///
/// Supports:
/// - `HEAD` and its alias `@`
/// - branch names: `main`, `feature/login`
/// - full or abbreviated (at least 4 hex characters) commit ids
/// - parent notation: `<revision>^`
/// - ancestor notation: `<revision>~<n>` (n-th first-parent ancestor)
///
/// Hex-looking names are parsed as `Ref` and only fall back to id-prefix resolution when no
/// branch of that name exists.
#[derive(Debug, Clone)]
pub enum Revision {
    /// HEAD, a branch, or an id prefix
    Ref(BranchName),
    /// The Nth first-parent ancestor of a revision (e.g. HEAD~3)
    Ancestor(Box<Revision>, usize),
    /// The first parent of a revision (e.g. HEAD^)
    Parent(Box<Revision>),
}

impl Revision {
    pub fn resolve(&self, repository: &Repository) -> Result<ObjectId> {
        match self {
            Revision::Ref(name) if name.as_ref() == HEAD_REF_NAME => repository.refs().read_head(),
            Revision::Ref(name) => match repository.refs().branch_tip(name) {
                Ok(oid) => Ok(oid),
                Err(GraftError::NotFound { .. }) if ObjectId::is_valid_prefix(name.as_ref()) => {
                    let oid = repository.database().resolve_prefix(name.as_ref())?;
                    // only commits can be checked out
                    repository.database().get_commit(&oid)?;
                    Ok(oid)
                }
                Err(GraftError::NotFound { .. }) => {
                    Err(GraftError::not_found(Subject::Commit, name))
                }
                Err(error) => Err(error),
            },
            Revision::Parent(base) => Self::first_parent(base.resolve(repository)?, repository),
            Revision::Ancestor(base, generations) => {
                let mut oid = base.resolve(repository)?;
                for _ in 0..*generations {
                    oid = Self::first_parent(oid, repository)?;
                }

                Ok(oid)
            }
        }
    }

    fn first_parent(oid: ObjectId, repository: &Repository) -> Result<ObjectId> {
        let commit = repository.database().get_commit(&oid)?;

        commit
            .parent()
            .cloned()
            .ok_or_else(|| GraftError::not_found(Subject::Commit, format!("{oid}^")))
    }

    pub fn try_parse(revision: &str) -> Result<Revision> {
        let parent_re = regex::Regex::new(PARENT_REGEX)
            .with_context(|| format!("invalid parent regex: {PARENT_REGEX}"))?;
        let ancestor_re = regex::Regex::new(ANCESTOR_REGEX)
            .with_context(|| format!("invalid ancestor regex: {ANCESTOR_REGEX}"))?;

        if let Some(caps) = parent_re.captures(revision) {
            let base_revision = Self::try_parse(&caps[1])?;

            Ok(Revision::Parent(Box::new(base_revision)))
        } else if let Some(caps) = ancestor_re.captures(revision) {
            let generations: usize = caps[2].parse().map_err(|_| {
                GraftError::InvalidOperand(format!("invalid ancestor count in '{revision}'"))
            })?;
            let base_revision = Self::try_parse(&caps[1])?;

            Ok(Revision::Ancestor(Box::new(base_revision), generations))
        } else {
            let resolved_name = *REF_ALIASES.get(revision).unwrap_or(&revision);
            Ok(Revision::Ref(BranchName::try_parse(resolved_name)?))
        }
    }
}

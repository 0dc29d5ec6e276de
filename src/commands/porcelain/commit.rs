use crate::areas::repository::Repository;
use crate::artifacts::core::error::{GraftError, Result};
use crate::artifacts::objects::commit::{Commit, Timestamp};
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Record the staged changes as a new commit on the current branch
    ///
    /// A pending merge (left by a conflicted `merge`) becomes the second parent and allows
    /// committing with an empty staging area.
    pub fn commit(&mut self, message: &str) -> Result<ObjectId> {
        // stored verbatim; `find` compares the exact text
        if message.trim().is_empty() {
            return Err(GraftError::InvalidOperand(
                "Please enter a commit message.".to_string(),
            ));
        }

        let merge_head = self.refs().read_merge_head()?;
        if merge_head.is_none() && self.staging().is_empty() {
            return Err(GraftError::NothingToCommit);
        }

        let (commit_oid, commit) = self.write_commit(message.to_string(), merge_head)?;
        self.refs().clear_merge_head()?;

        writeln!(
            self.writer(),
            "[{} {}] {}",
            self.refs().current_branch()?,
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(commit_oid)
    }

    /// Build, store and check in a commit from HEAD plus the staging area
    pub(crate) fn write_commit(
        &self,
        message: String,
        second_parent: Option<ObjectId>,
    ) -> Result<(ObjectId, Commit)> {
        let (head_oid, head) = self.head_commit()?;
        let mut staging = self.staging();

        let blobs = staging.apply_to(head.blobs());
        let commit = Commit::new(
            message,
            Timestamp::load_from_env(),
            blobs,
            Some(head_oid),
            second_parent,
        );

        let commit_oid = self.database().store(&commit)?;
        self.refs().update_head(commit_oid.clone())?;

        staging.clear();
        staging.write_updates()?;

        tracing::info!(
            oid = %commit_oid,
            files = commit.blobs().len(),
            merge = commit.is_merge(),
            "created commit"
        );

        Ok((commit_oid, commit))
    }
}

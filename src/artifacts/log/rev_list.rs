use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::error::Result;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

#[derive(Clone, new)]
pub struct RevList<'r> {
    repository: &'r Repository,
    start_revision: Revision,
}

impl<'r> RevList<'r> {
    pub fn into_iter(self) -> Result<RevListIntoIter<'r>> {
        Ok(RevListIntoIter {
            repository: self.repository,
            current_commit_oid: Some(self.start_revision.resolve(self.repository)?),
        })
    }
}

/// Commits along first-parent links, newest first; stops after the first load failure
#[derive(Clone)]
pub struct RevListIntoIter<'r> {
    repository: &'r Repository,
    current_commit_oid: Option<ObjectId>,
}

impl Iterator for RevListIntoIter<'_> {
    type Item = Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let commit_oid = self.current_commit_oid.take()?;

        match self.repository.database().get_commit(&commit_oid) {
            Ok(commit) => {
                self.current_commit_oid = commit.parent().cloned();
                Some(Ok((commit_oid, commit)))
            }
            Err(error) => Some(Err(error)),
        }
    }
}

use crate::areas::refs::HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::error::Result;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// First-parent history from HEAD back to the initial commit
    pub fn log(&self) -> Result<()> {
        let rev_list = RevList::new(self, Revision::try_parse(HEAD_REF_NAME)?);

        for entry in rev_list.into_iter()? {
            let (commit_oid, commit) = entry?;
            self.display_commit(&commit_oid, &commit)?;
        }

        Ok(())
    }

    /// Every commit ever made, in object id order
    pub fn global_log(&self) -> Result<()> {
        for (commit_oid, commit) in self.database().list_commits()? {
            self.display_commit(&commit_oid, &commit)?;
        }

        Ok(())
    }

    fn display_commit(&self, commit_oid: &ObjectId, commit: &Commit) -> Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "===")?;
        writeln!(writer, "commit {commit_oid}")?;
        if let (Some(first), Some(second)) = (commit.parent(), commit.second_parent()) {
            writeln!(
                writer,
                "Merge: {} {}",
                first.to_short_oid(),
                second.to_short_oid()
            )?;
        }
        writeln!(writer, "Date: {}", commit.timestamp().readable())?;
        writeln!(writer, "{}", commit.message())?;
        writeln!(writer)?;

        Ok(())
    }
}

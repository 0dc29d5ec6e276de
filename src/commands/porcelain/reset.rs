use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::error::Result;
use std::io::Write;

impl Repository {
    /// Check out any commit and move the current branch tip to it
    pub fn reset(&mut self, revision: &str) -> Result<()> {
        let target_oid = Revision::try_parse(revision)?.resolve(self)?;
        let target = self.database().get_commit(&target_oid)?;
        let (_, head) = self.head_commit()?;

        self.check_untracked_conflicts(&head, &target)?;
        self.checkout_commit(&head, &target)?;
        self.refs().update_head(target_oid.clone())?;
        self.refs().clear_merge_head()?;

        writeln!(
            self.writer(),
            "HEAD is now at {} {}",
            target_oid.to_short_oid(),
            target.short_message()
        )?;

        Ok(())
    }
}

use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::error::{GraftError, Result};
use std::io::Write;

impl Repository {
    /// Check out the tip of another branch and make it the current branch
    pub fn switch_branch(&mut self, name: &str) -> Result<()> {
        let branch_name = self.existing_branch(name)?;

        if self.refs().is_current_branch(&branch_name)? {
            return Err(GraftError::InvalidOperand(
                "No need to switch to the current branch.".to_string(),
            ));
        }

        let (_, head) = self.head_commit()?;
        let target = self
            .database()
            .get_commit(&self.refs().branch_tip(&branch_name)?)?;

        self.check_untracked_conflicts(&head, &target)?;
        self.checkout_commit(&head, &target)?;
        self.refs().set_current_branch(&branch_name)?;
        self.refs().clear_merge_head()?;

        writeln!(self.writer(), "Switched to branch '{branch_name}'")?;

        Ok(())
    }

    /// A branch that must exist; names that cannot be branches cannot exist either
    pub(crate) fn existing_branch(&self, name: &str) -> Result<BranchName> {
        BranchName::try_parse(name)
            .ok()
            .filter(|branch_name| self.refs().branch_exists(branch_name))
            .ok_or_else(|| GraftError::NoSuchBranch(name.to_string()))
    }
}

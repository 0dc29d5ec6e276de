use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::error::Result;

impl Repository {
    /// Create a branch pointing at HEAD; the current branch does not change
    pub fn branch(&mut self, name: &str) -> Result<()> {
        let branch_name = BranchName::try_parse(name)?;
        let head_oid = self.refs().read_head()?;

        self.refs().create_branch(&branch_name, head_oid)
    }

    /// Delete a branch pointer, keeping its commits
    pub fn remove_branch(&mut self, name: &str) -> Result<()> {
        let branch_name = BranchName::try_parse(name)?;
        self.refs().delete_branch(&branch_name)?;

        Ok(())
    }
}

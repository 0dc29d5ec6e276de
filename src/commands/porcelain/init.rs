use crate::areas::repository::{REPOSITORY_DIR, Repository};
use crate::artifacts::branch::DEFAULT_BRANCH;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::error::{GraftError, Result, Subject};
use crate::artifacts::objects::commit::Commit;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::Path;

pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

impl Repository {
    /// Create `.graft` under `path` with the default branch pointing at the initial commit
    pub fn init(path: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        fs::create_dir_all(path).context("Failed to create the repository root")?;
        let path = path.canonicalize()?;
        let git_path = path.join(REPOSITORY_DIR);

        if git_path.exists() {
            return Err(GraftError::already_exists(
                Subject::Repository,
                git_path.display(),
            ));
        }

        fs::create_dir_all(git_path.join("objects"))
            .context("Failed to create .graft/objects directory")?;
        fs::create_dir_all(git_path.join("refs").join("heads"))
            .context("Failed to create .graft/refs/heads directory")?;

        let repository = Repository::assemble(path, writer)?;

        let initial_commit = Commit::initial(INITIAL_COMMIT_MESSAGE);
        let initial_oid = repository.database().store(&initial_commit)?;

        let default_branch = BranchName::try_parse(DEFAULT_BRANCH)?;
        repository
            .refs()
            .create_branch(&default_branch, initial_oid)?;
        repository.refs().set_current_branch(&default_branch)?;
        repository.staging().write_updates()?;

        writeln!(
            repository.writer(),
            "Initialized empty Graft repository in {}",
            git_path.display()
        )?;

        Ok(repository)
    }
}

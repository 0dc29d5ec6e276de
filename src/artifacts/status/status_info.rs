use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::error::Result;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub type FileSet = BTreeSet<PathBuf>;
pub type ChangeSet = BTreeMap<PathBuf, WorkspaceChangeType>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub(crate) current_branch: BranchName,
    pub(crate) branches: Vec<BranchName>,
    pub(crate) staged_files: FileSet,
    pub(crate) removed_files: FileSet,
    pub(crate) workspace_changeset: ChangeSet,
    pub(crate) untracked_files: FileSet,
}

impl StatusInfo {
    pub fn current_branch(&self) -> &BranchName {
        &self.current_branch
    }

    pub fn branches(&self) -> &[BranchName] {
        &self.branches
    }

    pub fn staged_files(&self) -> &FileSet {
        &self.staged_files
    }

    pub fn removed_files(&self) -> &FileSet {
        &self.removed_files
    }

    pub fn workspace_changeset(&self) -> &ChangeSet {
        &self.workspace_changeset
    }

    pub fn untracked_files(&self) -> &FileSet {
        &self.untracked_files
    }
}

#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl<'r> Status<'r> {
    pub fn initialize(&self) -> Result<StatusInfo> {
        let (_, head) = self.repository.head_commit()?;
        let staging = self.repository.staging();

        let mut workspace_changeset = ChangeSet::new();

        // tracked files without a staged change
        for (path, oid) in head.blobs() {
            if staging.is_staged_for_removal(path) || staging.addition(path).is_some() {
                continue;
            }
            self.record_workspace_change(path, oid, &mut workspace_changeset)?;
        }

        // staged content that no longer matches the working file
        for (path, oid) in staging.additions() {
            self.record_workspace_change(path, oid, &mut workspace_changeset)?;
        }

        // present but unknown, or re-created after being staged for removal
        let untracked_files = self
            .repository
            .workspace()
            .list_files()?
            .into_iter()
            .filter(|path| {
                staging.is_staged_for_removal(path)
                    || (!head.tracks(path) && staging.addition(path).is_none())
            })
            .collect::<FileSet>();

        Ok(StatusInfo {
            current_branch: self.repository.refs().current_branch()?,
            branches: self.repository.refs().list_branches()?,
            staged_files: staging.additions().keys().cloned().collect(),
            removed_files: staging.removals().keys().cloned().collect(),
            workspace_changeset,
            untracked_files,
        })
    }

    fn record_workspace_change(
        &self,
        path: &Path,
        expected_oid: &ObjectId,
        changeset: &mut ChangeSet,
    ) -> Result<()> {
        match self.repository.hash_working_file(path)? {
            None => {
                changeset.insert(path.to_path_buf(), WorkspaceChangeType::Deleted);
            }
            Some(oid) if &oid != expected_oid => {
                changeset.insert(path.to_path_buf(), WorkspaceChangeType::Modified);
            }
            Some(_) => {}
        }

        Ok(())
    }
}

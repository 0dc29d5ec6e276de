use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::error::{GraftError, Result};
use crate::artifacts::merge::conflict::conflict_block;
use crate::artifacts::merge::resolution::{Resolution, classify};
use crate::artifacts::merge::split_point::SplitPointFinder;
use crate::artifacts::merge::{MergeOutcome, merge_message};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// What merging a given tip into HEAD amounts to, decided before anything is touched
enum MergePlan {
    UpToDate,
    FastForward(ObjectId, Commit),
    ThreeWay {
        other_oid: ObjectId,
        other: Commit,
        resolutions: Vec<(PathBuf, Resolution)>,
    },
}

impl Repository {
    /// Merge the tip of branch `name` into the current branch
    ///
    /// Preconditions are checked in order: untracked files in the way, uncommitted changes,
    /// unknown branch, merging a branch with itself. A fast-forward switches to `name`. A
    /// conflicted merge applies and stages every other resolution, writes marker blocks, records
    /// the pending merge and does not commit.
    pub fn merge(&mut self, name: &str) -> Result<MergeOutcome> {
        let (head_oid, head) = self.head_commit()?;

        let planned = match self.existing_branch(name).ok() {
            Some(branch_name) => {
                let plan = self.plan_merge(&head_oid, &head, &branch_name)?;
                self.check_plan_untracked(&head, &plan)?;
                Some((branch_name, plan))
            }
            None => None,
        };

        if !self.staging().is_empty() {
            return Err(GraftError::UncommittedChanges);
        }

        let (branch_name, plan) =
            planned.ok_or_else(|| GraftError::NoSuchBranch(name.to_string()))?;
        let current_branch = self.refs().current_branch()?;
        if branch_name == current_branch {
            return Err(GraftError::SelfMerge);
        }

        match plan {
            MergePlan::UpToDate => Ok(MergeOutcome::AlreadyAncestor),
            MergePlan::FastForward(other_oid, other) => {
                self.checkout_commit(&head, &other)?;
                self.refs().set_current_branch(&branch_name)?;
                self.refs().clear_merge_head()?;

                Ok(MergeOutcome::FastForwarded(other_oid))
            }
            MergePlan::ThreeWay {
                other_oid,
                other,
                resolutions,
            } => {
                let conflicts = self.apply_resolutions(&head, &other, resolutions)?;

                if !conflicts.is_empty() {
                    self.refs().write_merge_head(&other_oid)?;
                    return Ok(MergeOutcome::Conflicted(conflicts));
                }

                let message = merge_message(&branch_name, &current_branch);
                let (merge_oid, _) = self.write_commit(message.clone(), Some(other_oid))?;

                Ok(MergeOutcome::Merged {
                    oid: merge_oid,
                    message,
                })
            }
        }
    }

    fn plan_merge(
        &self,
        head_oid: &ObjectId,
        head: &Commit,
        branch_name: &BranchName,
    ) -> Result<MergePlan> {
        let other_oid = self.refs().branch_tip(branch_name)?;

        let split_oid = SplitPointFinder::new(|oid| self.database().get_slim_commit(oid))
            .find_split_point(head_oid, &other_oid)?
            .ok_or_else(|| {
                anyhow::anyhow!("{head_oid} and {other_oid} share no common ancestor")
            })?;

        tracing::debug!(
            head = %head_oid,
            other = %other_oid,
            split_point = %split_oid,
            "found split point"
        );

        if split_oid == other_oid {
            return Ok(MergePlan::UpToDate);
        }

        let other = self.database().get_commit(&other_oid)?;
        if &split_oid == head_oid {
            return Ok(MergePlan::FastForward(other_oid, other));
        }

        let split = self.database().get_commit(&split_oid)?;
        let resolutions = resolve_paths(&split, head, &other);

        Ok(MergePlan::ThreeWay {
            other_oid,
            other,
            resolutions,
        })
    }

    /// Fail if carrying out `plan` would overwrite an untracked working file
    fn check_plan_untracked(&self, head: &Commit, plan: &MergePlan) -> Result<()> {
        match plan {
            MergePlan::UpToDate => Ok(()),
            MergePlan::FastForward(_, other) => self.check_untracked_conflicts(head, other),
            MergePlan::ThreeWay { resolutions, .. } => {
                let written = resolutions
                    .iter()
                    .filter(|(_, resolution)| resolution.writes_working_file())
                    .map(|(path, _)| path)
                    .collect::<BTreeSet<_>>();

                let conflicts = self
                    .untracked_files(head)?
                    .into_iter()
                    .filter(|path| written.contains(path))
                    .collect::<Vec<_>>();

                if conflicts.is_empty() {
                    Ok(())
                } else {
                    Err(GraftError::UntrackedFileConflict(conflicts))
                }
            }
        }
    }

    /// Carry out the per-path resolutions against the working tree and staging area,
    /// returning conflicted paths
    fn apply_resolutions(
        &self,
        head: &Commit,
        other: &Commit,
        resolutions: Vec<(PathBuf, Resolution)>,
    ) -> Result<Vec<PathBuf>> {
        let mut conflicts = Vec::new();
        let mut staging = self.staging();

        for (path, resolution) in resolutions {
            match resolution {
                Resolution::Keep => {}
                Resolution::TakeOther(blob_id) => {
                    let blob = self.database().get_blob(&blob_id)?;
                    self.workspace().write_file(&path, blob.content())?;
                    let previous = head.blob(&path);
                    staging.stage_for_addition(path, blob_id, previous);
                }
                Resolution::Remove => {
                    if let Some(blob_id) = head.blob(&path) {
                        staging.stage_for_removal(path.clone(), blob_id.clone());
                    }
                    self.workspace().remove_file(&path)?;
                }
                Resolution::Conflict => {
                    let current = self.blob_content(head.blob(&path))?;
                    let incoming = self.blob_content(other.blob(&path))?;
                    let block = conflict_block(current.as_deref(), incoming.as_deref());

                    self.workspace().write_file(&path, &block)?;
                    let blob_id = self.database().store(&Blob::new(block.into()))?;
                    staging.stage_for_addition(path.clone(), blob_id, head.blob(&path));

                    tracing::warn!(path = %path.display(), "merge conflict");
                    conflicts.push(path);
                }
            }
        }

        staging.write_updates()?;

        Ok(conflicts)
    }

    fn blob_content(&self, blob_id: Option<&ObjectId>) -> Result<Option<Vec<u8>>> {
        blob_id
            .map(|blob_id| {
                self.database()
                    .get_blob(blob_id)
                    .map(|blob| blob.content().to_vec())
            })
            .transpose()
    }
}

/// Apply the decision table to every path of the three commits, in path order
fn resolve_paths(split: &Commit, head: &Commit, other: &Commit) -> Vec<(PathBuf, Resolution)> {
    split
        .blobs()
        .keys()
        .chain(head.blobs().keys())
        .chain(other.blobs().keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|path| {
            let resolution = classify(split.blob(path), head.blob(path), other.blob(path));
            tracing::debug!(path = %path.display(), ?resolution, "resolved path");
            (path.clone(), resolution)
        })
        .collect()
}

//! References (HEAD, branches, pending merge)
//!
//! References are human-readable names pointing to commits:
//! - HEAD: symbolic reference naming the current branch (`ref: refs/heads/main`)
//! - Branches: `refs/heads/*`, each holding the id of its tip commit
//! - MERGE_HEAD: tip of the branch being merged while a conflicted merge is unresolved
//!
//! ## File Format
//!
//! Branch files and MERGE_HEAD contain a 40-character SHA-1 hash, HEAD contains
//! `ref: <path>`. Every write happens under an exclusive file lock.

use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::core::error::{GraftError, Result, Subject};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Name of the pending merge reference
pub const MERGE_HEAD_REF_NAME: &str = "MERGE_HEAD";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory (typically `.graft`)
    path: Box<Path>,
}

impl Refs {
    /// Branch HEAD points at
    pub fn current_branch(&self) -> Result<BranchName> {
        let content = std::fs::read_to_string(self.head_path())
            .with_context(|| format!("failed to read {HEAD_REF_NAME}"))?;

        let symref_re = regex::Regex::new(SYMREF_REGEX)
            .with_context(|| format!("invalid symref regex: {SYMREF_REGEX}"))?;
        let sym_ref_name = symref_re
            .captures(content.trim())
            .map(|captures| captures[1].to_string())
            .with_context(|| format!("{HEAD_REF_NAME} is not a symbolic ref: {content}"))?;

        BranchName::try_parse_sym_ref_name(&SymRefName::try_parse(&sym_ref_name)?)
    }

    pub fn set_current_branch(&self, branch_name: &BranchName) -> Result<()> {
        let sym_ref_name = SymRefName::from(branch_name);
        self.update_ref_file(
            self.head_path(),
            format!("ref: {}", sym_ref_name.as_ref_path()),
        )?;

        tracing::info!(branch = %branch_name, "switched current branch");
        Ok(())
    }

    pub fn is_current_branch(&self, branch_name: &BranchName) -> Result<bool> {
        Ok(&self.current_branch()? == branch_name)
    }

    /// Tip of the current branch
    pub fn read_head(&self) -> Result<ObjectId> {
        self.branch_tip(&self.current_branch()?)
    }

    /// Move the current branch tip
    pub fn update_head(&self, oid: ObjectId) -> Result<()> {
        self.set_branch_tip(&self.current_branch()?, oid)
    }

    pub fn branch_exists(&self, branch_name: &BranchName) -> bool {
        self.branch_path(branch_name).is_file()
    }

    pub fn branch_tip(&self, branch_name: &BranchName) -> Result<ObjectId> {
        if !self.branch_exists(branch_name) {
            return Err(GraftError::not_found(Subject::Branch, branch_name));
        }

        self.read_ref_file(&self.branch_path(branch_name))?
            .ok_or_else(|| GraftError::not_found(Subject::Branch, branch_name))
    }

    pub fn set_branch_tip(&self, branch_name: &BranchName, oid: ObjectId) -> Result<()> {
        tracing::info!(branch = %branch_name, oid = %oid, "moved branch");
        self.update_ref_file(self.branch_path(branch_name), oid.as_ref().to_string())
    }

    pub fn create_branch(&self, branch_name: &BranchName, oid: ObjectId) -> Result<()> {
        if self.branch_exists(branch_name) {
            return Err(GraftError::already_exists(Subject::Branch, branch_name));
        }

        self.set_branch_tip(branch_name, oid)
    }

    /// Delete a branch pointer; the commits it pointed at are kept
    pub fn delete_branch(&self, branch_name: &BranchName) -> Result<ObjectId> {
        let oid = self.branch_tip(branch_name)?;

        if self.is_current_branch(branch_name)? {
            return Err(GraftError::CannotRemoveCurrent(branch_name.to_string()));
        }

        let branch_path = self.branch_path(branch_name);
        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;

        tracing::info!(branch = %branch_name, oid = %oid, "deleted branch");
        Ok(oid)
    }

    /// All branch names, sorted
    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        let heads_path = self.heads_path();

        let mut branches = WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&heads_path).ok()?;
                BranchName::try_parse(relative_path.to_string_lossy().to_string()).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    pub fn read_merge_head(&self) -> Result<Option<ObjectId>> {
        let merge_head_path = self.merge_head_path();
        if !merge_head_path.exists() {
            return Ok(None);
        }

        self.read_ref_file(&merge_head_path)
    }

    pub fn write_merge_head(&self, oid: &ObjectId) -> Result<()> {
        self.update_ref_file(self.merge_head_path(), oid.as_ref().to_string())
    }

    pub fn clear_merge_head(&self) -> Result<()> {
        let merge_head_path = self.merge_head_path();
        if merge_head_path.exists() {
            std::fs::remove_file(&merge_head_path)
                .with_context(|| format!("failed to remove {MERGE_HEAD_REF_NAME}"))?;
        }

        Ok(())
    }

    fn update_ref_file(&self, path: Box<Path>, raw_ref: String) -> Result<()> {
        // create all the parent directories if they don't exist
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;
        lock.deref_mut().sync_all()?;

        Ok(())
    }

    fn read_ref_file(&self, path: &Path) -> Result<Option<ObjectId>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        Ok(Some(ObjectId::try_parse(content.to_string())?))
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn branch_path(&self, branch_name: &BranchName) -> Box<Path> {
        self.path
            .join(SymRefName::from(branch_name).as_ref_path())
            .into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn merge_head_path(&self) -> Box<Path> {
        self.path.join(MERGE_HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn oid(c: char) -> ObjectId {
        ObjectId::try_parse(c.to_string().repeat(40)).unwrap()
    }

    fn branch(name: &str) -> BranchName {
        BranchName::try_parse(name).unwrap()
    }

    /// Refs with `main` at `1111…` checked out
    #[fixture]
    fn refs() -> (TempDir, Refs) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let refs = Refs::new(dir.path().to_path_buf().into_boxed_path());

        refs.create_branch(&branch("main"), oid('1')).unwrap();
        refs.set_current_branch(&branch("main")).unwrap();

        (dir, refs)
    }

    #[rstest]
    fn head_follows_the_current_branch(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;

        assert_eq!(refs.current_branch().unwrap(), branch("main"));
        assert_eq!(refs.read_head().unwrap(), oid('1'));

        refs.update_head(oid('2')).unwrap();
        assert_eq!(refs.branch_tip(&branch("main")).unwrap(), oid('2'));
    }

    #[rstest]
    fn creating_a_taken_name_fails(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;

        assert!(matches!(
            refs.create_branch(&branch("main"), oid('2')),
            Err(GraftError::AlreadyExists {
                subject: Subject::Branch,
                ..
            })
        ));
        assert_eq!(refs.read_head().unwrap(), oid('1'));
    }

    #[rstest]
    fn branches_are_listed_sorted(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        refs.create_branch(&branch("zeta"), oid('1')).unwrap();
        refs.create_branch(&branch("feature/alpha"), oid('1')).unwrap();

        assert_eq!(
            refs.list_branches().unwrap(),
            vec![branch("feature/alpha"), branch("main"), branch("zeta")]
        );
    }

    #[rstest]
    fn deleting_the_current_branch_is_refused(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;

        assert!(matches!(
            refs.delete_branch(&branch("main")),
            Err(GraftError::CannotRemoveCurrent(_))
        ));
        assert!(refs.branch_exists(&branch("main")));
    }

    #[rstest]
    fn deleting_prunes_empty_branch_directories(refs: (TempDir, Refs)) {
        let (dir, refs) = refs;
        refs.create_branch(&branch("feature/x"), oid('3')).unwrap();

        assert_eq!(refs.delete_branch(&branch("feature/x")).unwrap(), oid('3'));
        assert!(!dir.path().join("refs/heads/feature").exists());
        assert!(matches!(
            refs.delete_branch(&branch("feature/x")),
            Err(GraftError::NotFound { .. })
        ));
    }

    #[rstest]
    fn merge_head_is_optional(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        assert_eq!(refs.read_merge_head().unwrap(), None);

        refs.write_merge_head(&oid('4')).unwrap();
        assert_eq!(refs.read_merge_head().unwrap(), Some(oid('4')));

        refs.clear_merge_head().unwrap();
        assert_eq!(refs.read_merge_head().unwrap(), None);
    }
}

use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::areas::staging::StagingArea;
use crate::areas::workspace::Workspace;
use crate::artifacts::core::error::{GraftError, Result, Subject};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::status_info::Status;
use file_guard::{FileGuard, Lock};
use std::cell::{RefCell, RefMut};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Name of the repository directory inside the working tree
pub const REPOSITORY_DIR: &str = ".graft";

const LOCK_FILE: &str = "lock";
const STAGING_FILE: &str = "staging";
const OBJECTS_DIR: &str = "objects";

/// Handle on one repository: its object store, references, staging area and working tree
///
/// The handle holds an exclusive lock on `.graft/lock` for its whole lifetime, so two
/// processes never mutate the same repository concurrently.
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    staging: RefCell<StagingArea>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    _lock: FileGuard<Box<File>>,
}

impl Repository {
    /// Open an initialized repository rooted at `path`
    pub fn open(path: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        let path = path.canonicalize()?;

        if !path.join(REPOSITORY_DIR).is_dir() {
            return Err(GraftError::NotInitialized(path));
        }

        let repository = Self::assemble(path, writer)?;
        repository.staging().rehydrate()?;

        Ok(repository)
    }

    /// Wire up the handles of a repository whose `.graft` directory exists
    pub(crate) fn assemble(path: PathBuf, writer: Box<dyn std::io::Write>) -> Result<Self> {
        let git_path = path.join(REPOSITORY_DIR);
        let lock = Self::acquire_lock(&git_path)?;

        Ok(Repository {
            staging: RefCell::new(StagingArea::new(
                git_path.join(STAGING_FILE).into_boxed_path(),
            )),
            database: Database::new(git_path.join(OBJECTS_DIR).into_boxed_path()),
            workspace: Workspace::new(path.clone().into_boxed_path()),
            refs: Refs::new(git_path.into_boxed_path()),
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            _lock: lock,
        })
    }

    fn acquire_lock(git_path: &Path) -> Result<FileGuard<Box<File>>> {
        let lock_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(git_path.join(LOCK_FILE))?;

        file_guard::try_lock(Box::new(lock_file), Lock::Exclusive, 0, 1).map_err(|error| {
            if error.kind() == std::io::ErrorKind::WouldBlock {
                GraftError::RepositoryLocked(git_path.to_path_buf())
            } else {
                error.into()
            }
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_path(&self) -> PathBuf {
        self.path.join(REPOSITORY_DIR)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn staging(&'_ self) -> RefMut<'_, StagingArea> {
        self.staging.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn status(&'_ self) -> Status<'_> {
        Status::new(self)
    }

    /// Id and content of the commit at the tip of the current branch
    pub fn head_commit(&self) -> Result<(ObjectId, Commit)> {
        let head_oid = self.refs.read_head()?;
        let commit = self.database.get_commit(&head_oid)?;

        Ok((head_oid, commit))
    }

    /// Working files neither tracked by `head` nor staged for addition
    pub fn untracked_files(&self, head: &Commit) -> Result<Vec<PathBuf>> {
        let staging = self.staging();

        Ok(self
            .workspace
            .list_files()?
            .into_iter()
            .filter(|path| !head.tracks(path) && staging.addition(path).is_none())
            .collect())
    }

    /// Fail if checking out `target` would overwrite an untracked working file
    pub fn check_untracked_conflicts(&self, head: &Commit, target: &Commit) -> Result<()> {
        let conflicts = self
            .untracked_files(head)?
            .into_iter()
            .filter(|path| target.tracks(path))
            .collect::<Vec<_>>();

        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(GraftError::UntrackedFileConflict(conflicts))
        }
    }

    /// Make the working tree match `target`, starting from `current`, and clear the staging area
    ///
    /// Files tracked by `current` but not by `target` are deleted; every file of `target` is
    /// written. Untracked files are left alone.
    pub fn checkout_commit(&self, current: &Commit, target: &Commit) -> Result<()> {
        for path in current.blobs().keys() {
            if !target.tracks(path) {
                self.workspace.remove_file(path)?;
            }
        }

        for (path, blob_id) in target.blobs() {
            let blob = self.database.get_blob(blob_id)?;
            self.workspace.write_file(path, blob.content())?;
        }

        let mut staging = self.staging();
        staging.clear();
        staging.write_updates()?;

        tracing::debug!(files = target.blobs().len(), "checked out commit");
        Ok(())
    }

    /// Store the current content of a working file, returning its blob id
    pub fn store_working_file(&self, path: &Path) -> Result<ObjectId> {
        let blob = self.workspace.parse_blob(path)?;
        self.database.store(&blob)
    }

    /// Id of the working file's content, without storing it
    pub fn hash_working_file(&self, path: &Path) -> Result<Option<ObjectId>> {
        if !self.workspace.exists(path) {
            return Ok(None);
        }

        Ok(Some(self.workspace.parse_blob(path)?.object_id()?))
    }

    /// Blob of `path` in `commit`, reported as a missing file when absent
    pub fn committed_file(&self, commit: &Commit, path: &Path) -> Result<ObjectId> {
        commit
            .blob(path)
            .cloned()
            .ok_or_else(|| GraftError::not_found(Subject::File, path.display()))
    }
}

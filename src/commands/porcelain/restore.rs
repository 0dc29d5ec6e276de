use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::error::Result;
use std::path::Path;

impl Repository {
    /// Overwrite a working file with its content in `revision` (HEAD by default)
    ///
    /// Any staged change to the path is dropped; the current branch does not move.
    pub fn restore(&mut self, revision: Option<&str>, path: &Path) -> Result<()> {
        let commit_oid = match revision {
            Some(revision) => Revision::try_parse(revision)?.resolve(self)?,
            None => self.refs().read_head()?,
        };
        let commit = self.database().get_commit(&commit_oid)?;

        let path = self.workspace().relative_path(path)?;
        let blob_id = self.committed_file(&commit, &path)?;
        let blob = self.database().get_blob(&blob_id)?;

        self.workspace().write_file(&path, blob.content())?;

        let mut staging = self.staging();
        if staging.unstage(&path) {
            staging.write_updates()?;
        }

        tracing::debug!(path = %path.display(), commit = %commit_oid, "restored file");
        Ok(())
    }
}

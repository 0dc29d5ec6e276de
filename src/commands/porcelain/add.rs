use crate::areas::repository::Repository;
use crate::artifacts::core::error::Result;
use std::path::PathBuf;

impl Repository {
    /// Stage the current content of each path; directories expand to the files beneath them
    pub fn add(&mut self, paths: &[PathBuf]) -> Result<()> {
        let (_, head) = self.head_commit()?;

        // resolve everything first so a bad path stages nothing
        let files = paths
            .iter()
            .map(|path| {
                let path = self.workspace().relative_path(path)?;
                self.workspace().list_files_under(&path)
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten();

        let mut staging = self.staging();
        for file in files {
            let blob_id = self.store_working_file(&file)?;
            let tracked = head.blob(&file);

            if !staging.stage_for_addition(file.clone(), blob_id, tracked) {
                tracing::debug!(path = %file.display(), "content matches HEAD, nothing staged");
            }
        }

        staging.write_updates()?;

        Ok(())
    }
}

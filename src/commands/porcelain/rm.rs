use crate::areas::repository::Repository;
use crate::artifacts::core::error::{GraftError, Result};
use std::path::Path;

impl Repository {
    /// Unstage a pending addition, and stage the removal of a tracked file (deleting it)
    pub fn remove(&mut self, path: &Path) -> Result<()> {
        let path = self.workspace().relative_path(path)?;
        let (_, head) = self.head_commit()?;
        let mut staging = self.staging();

        let was_staged = staging.addition(&path).is_some();
        if was_staged {
            staging.unstage(&path);
        }

        match head.blob(&path) {
            Some(blob_id) => {
                staging.stage_for_removal(path.clone(), blob_id.clone());
                self.workspace().remove_file(&path)?;
            }
            None if !was_staged => {
                return Err(GraftError::InvalidOperand(
                    "No reason to remove the file.".to_string(),
                ));
            }
            None => {}
        }

        staging.write_updates()?;

        Ok(())
    }
}

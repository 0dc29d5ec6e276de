use crate::artifacts::core::error::{GraftError, Result, Subject};
use crate::artifacts::objects::blob::Blob;
use anyhow::Context;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names never considered part of the working tree
const IGNORED_PATHS: [&str; 1] = [".graft"];

/// Working tree rooted at the repository path; every path it hands out is relative to that root
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blob holding the current content of a working file
    pub fn parse_blob(&self, path: &Path) -> Result<Blob> {
        Ok(Blob::new(self.read_file(path)?.into()))
    }

    /// Every file of the working tree, sorted
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        self.list_files_under(Path::new(""))
    }

    /// Files at or below `path`, which may name a single file or a directory
    pub fn list_files_under(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let root = self.path.join(path);

        if !root.exists() || Self::is_ignored(path) {
            return Err(GraftError::not_found(Subject::File, path.display()));
        }

        let mut files = WalkDir::new(&root)
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored_name(entry.file_name().to_string_lossy().as_ref()))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(self.path.as_ref())
                    .ok()
                    .map(PathBuf::from)
            })
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    fn is_ignored_name(name: &str) -> bool {
        IGNORED_PATHS.contains(&name)
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| {
            if let std::path::Component::Normal(name) = component {
                Self::is_ignored_name(name.to_string_lossy().as_ref())
            } else {
                false
            }
        })
    }

    /// Normalize a user-supplied path into one relative to the workspace root
    pub fn relative_path(&self, path: &Path) -> Result<PathBuf> {
        let absolute_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.path.join(path)
        };

        let mut normalized = PathBuf::new();
        for component in absolute_path.components() {
            match component {
                std::path::Component::CurDir => {}
                std::path::Component::ParentDir => {
                    normalized.pop();
                }
                component => normalized.push(component),
            }
        }

        normalized
            .strip_prefix(self.path.as_ref())
            .map(PathBuf::from)
            .map_err(|_| {
                GraftError::InvalidOperand(format!(
                    "{} is outside the repository",
                    path.display()
                ))
            })
    }

    pub fn exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &Path) -> Result<Vec<u8>> {
        if !self.exists(file_path) {
            return Err(GraftError::not_found(Subject::File, file_path.display()));
        }

        let content = std::fs::read(self.path.join(file_path))
            .with_context(|| format!("Unable to read {}", file_path.display()))?;

        Ok(content)
    }

    /// Write a working file, creating missing parent directories
    pub fn write_file(&self, file_path: &Path, data: &[u8]) -> Result<()> {
        let absolute_path = self.path.join(file_path);

        if let Some(parent) = absolute_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create directory {}", parent.display())
            })?;
        }

        std::fs::write(&absolute_path, data)
            .with_context(|| format!("Unable to write {}", file_path.display()))?;

        Ok(())
    }

    /// Delete a working file if present, pruning directories it leaves empty
    pub fn remove_file(&self, file_path: &Path) -> Result<()> {
        let absolute_path = self.path.join(file_path);

        if absolute_path.is_file() {
            std::fs::remove_file(&absolute_path)
                .with_context(|| format!("Unable to remove {}", file_path.display()))?;
        }

        self.prune_empty_parent_dirs(&absolute_path)
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.is_dir()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("Unable to remove empty directory {}", parent.display())
            })?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}

use crate::areas::repository::Repository;
use crate::artifacts::core::error::Result;
use crate::artifacts::status::file_change::FileChangeType;
use crate::artifacts::status::status_info::StatusInfo;
use std::io::Write;
use std::path::PathBuf;

impl Repository {
    /// Print branches, staged changes, unstaged changes and untracked files
    pub fn print_status(&self, colorize: bool) -> Result<()> {
        let status = self.status().initialize()?;
        self.show_branches(&status)?;

        self.show_section(
            "Staged Files",
            status
                .staged_files()
                .iter()
                .map(|path| (path, FileChangeType::Staged)),
            colorize,
        )?;
        self.show_section(
            "Removed Files",
            status
                .removed_files()
                .iter()
                .map(|path| (path, FileChangeType::Removed)),
            colorize,
        )?;
        self.show_section(
            "Modifications Not Staged For Commit",
            status
                .workspace_changeset()
                .iter()
                .map(|(path, change)| (path, FileChangeType::Workspace(*change))),
            colorize,
        )?;
        self.show_section(
            "Untracked Files",
            status
                .untracked_files()
                .iter()
                .map(|path| (path, FileChangeType::Untracked)),
            colorize,
        )?;

        Ok(())
    }

    fn show_branches(&self, status: &StatusInfo) -> Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "=== Branches ===")?;
        for branch in status.branches() {
            let marker = if branch == status.current_branch() {
                "*"
            } else {
                ""
            };
            writeln!(writer, "{marker}{branch}")?;
        }
        writeln!(writer)?;

        Ok(())
    }

    fn show_section<'p>(
        &self,
        title: &str,
        entries: impl Iterator<Item = (&'p PathBuf, FileChangeType)>,
        colorize: bool,
    ) -> Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "=== {title} ===")?;
        for (path, change) in entries {
            writeln!(writer, "{}", change.render(&path.display().to_string(), colorize))?;
        }
        writeln!(writer)?;

        Ok(())
    }
}

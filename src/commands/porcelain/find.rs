use crate::areas::repository::Repository;
use crate::artifacts::core::error::{GraftError, Result, Subject};
use std::io::Write;

impl Repository {
    /// Print the ids of every commit whose message is exactly `message`
    pub fn find(&self, message: &str) -> Result<()> {
        let matches = self
            .database()
            .list_commits()?
            .into_iter()
            .filter(|(_, commit)| commit.message() == message)
            .map(|(commit_oid, _)| commit_oid)
            .collect::<Vec<_>>();

        if matches.is_empty() {
            return Err(GraftError::not_found(Subject::Commit, message));
        }

        for commit_oid in matches {
            writeln!(self.writer(), "{commit_oid}")?;
        }

        Ok(())
    }
}

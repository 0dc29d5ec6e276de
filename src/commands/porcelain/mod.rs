//! Porcelain commands (user-facing operations)
//!
//! ## Commands
//!
//! - `init`: Create a repository with its initial commit
//! - `add`: Stage files for the next commit
//! - `rm`: Unstage a file or stage its removal
//! - `commit`: Record the staged changes
//! - `log`: Show first-parent history, or every commit (`global_log`)
//! - `find`: Look commits up by message
//! - `status`: Show branches, staged changes and working tree changes
//! - `restore`: Bring a file back from a commit
//! - `branch`: Create or remove branches
//! - `switch`: Check out another branch
//! - `reset`: Move the current branch to a commit
//! - `merge`: Merge another branch into the current one

pub mod add;
pub mod branch;
pub mod commit;
pub mod find;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod restore;
pub mod rm;
pub mod status;
pub mod switch;

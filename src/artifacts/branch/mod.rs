//! Branch names and revision expressions
//!
//! - `branch_name`: validated branch names and the symbolic ref HEAD points at
//! - `revision`: commit references (`main`, `HEAD~2`, `3fa4`, `@^`) and their resolution

pub mod branch_name;
pub mod revision;

/// Name of the branch created by `init`
pub const DEFAULT_BRANCH: &str = "main";

pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
pub const PARENT_REGEX: &str = r"^(.+)\^$";
pub const ANCESTOR_REGEX: &str = r"^(.+)\~(\d+)$";
pub const REF_ALIASES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "@" => "HEAD",
};
